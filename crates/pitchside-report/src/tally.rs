//! Regional tallies.
//!
//! Required and supplied match counts are either a single total
//! (interregional play) or a per-region breakdown (regional play). Both
//! sides of a comparison always carry the same variant; the report
//! builder zero-fills missing regions before comparing.

use std::ops::AddAssign;

use pitchside_core::RegionId;
use serde::{Deserialize, Serialize};

/// A match count, totalled or broken down per region.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegionTally {
    Interregional(u64),
    Regional(Vec<(RegionId, u64)>),
}

impl RegionTally {
    /// The zero tally of the requested shape.
    #[must_use]
    pub const fn zero(interregional: bool) -> Self {
        if interregional {
            Self::Interregional(0)
        } else {
            Self::Regional(vec![])
        }
    }

    /// Folds `(region, count)` pairs, merging duplicate regions.
    #[must_use]
    pub fn fold_from(pairs: impl Iterator<Item = (RegionId, u64)>) -> Self {
        let mut merged: Vec<(RegionId, u64)> = vec![];

        'outer: for (region, count) in pairs {
            for (seen_region, seen_count) in &mut merged {
                if *seen_region == region {
                    *seen_count += count;
                    continue 'outer;
                }
            }
            merged.push((region, count));
        }

        Self::Regional(merged)
    }

    /// The grand total across regions (or the single total).
    #[must_use]
    pub fn sum_total(&self) -> u64 {
        match self {
            Self::Interregional(total) => *total,
            Self::Regional(counts) => counts.iter().map(|(_, c)| c).sum(),
        }
    }

    /// Multiplies every component in place.
    pub fn spread_mul(&mut self, rhs: u64) {
        match self {
            Self::Interregional(total) => *total *= rhs,
            Self::Regional(counts) => counts.iter_mut().for_each(|(_, c)| *c *= rhs),
        }
    }

    /// Maps every component to the same shape with the given value.
    #[must_use]
    pub fn zero_like(&self) -> Self {
        match self {
            Self::Interregional(_) => Self::Interregional(0),
            Self::Regional(counts) => {
                Self::Regional(counts.iter().map(|(region, _)| (*region, 0)).collect())
            }
        }
    }

    /// Component-wise `self >= predicate`. Regions absent from `self`
    /// count as zero.
    #[must_use]
    pub fn satisfies(&self, predicate: &Self) -> bool {
        match (self, predicate) {
            (Self::Interregional(have), Self::Interregional(need)) => have >= need,
            (Self::Regional(have), Self::Regional(need)) => need.iter().all(|(region, need)| {
                let have = have
                    .iter()
                    .find(|(r, _)| r == region)
                    .map_or(0, |(_, c)| *c);
                have >= *need
            }),
            (lhs, rhs) => panic!("tally shape mismatch: comparing {lhs:?} to {rhs:?}"),
        }
    }

    /// Subtracts `other` component-wise, saturating at zero. Returns the
    /// amount that could not be subtracted, if any; `None` means the full
    /// amount was drawn.
    pub fn reduce_by(&mut self, other: &Self) -> Option<Self> {
        match (self, other) {
            (Self::Interregional(have), Self::Interregional(draw)) => {
                if let Some(rest) = have.checked_sub(*draw) {
                    *have = rest;
                    None
                } else {
                    let overflow = *draw - *have;
                    *have = 0;
                    Some(Self::Interregional(overflow))
                }
            }
            (Self::Regional(have), Self::Regional(draw)) => {
                let mut overflow: Vec<(RegionId, u64)> = vec![];

                'outer: for (region, draw) in draw {
                    for (have_region, have_count) in have.iter_mut() {
                        if have_region == region {
                            if let Some(rest) = have_count.checked_sub(*draw) {
                                *have_count = rest;
                            } else {
                                overflow.push((*region, *draw - *have_count));
                                *have_count = 0;
                            }
                            continue 'outer;
                        }
                    }
                    // Nothing available in this region at all.
                    overflow.push((*region, *draw));
                }

                if overflow.is_empty() {
                    None
                } else {
                    Some(Self::Regional(overflow))
                }
            }
            (lhs, rhs) => panic!("tally shape mismatch: reducing {lhs:?} by {rhs:?}"),
        }
    }

    /// True if any component of an eligible-team tally can field a match.
    #[must_use]
    pub fn any_component_at_least(&self, threshold: u64) -> bool {
        match self {
            Self::Interregional(total) => *total >= threshold,
            Self::Regional(counts) => counts.iter().any(|(_, c)| *c >= threshold),
        }
    }
}

impl AddAssign for RegionTally {
    fn add_assign(&mut self, rhs: Self) {
        match (self, rhs) {
            (Self::Interregional(lhs), Self::Interregional(rhs)) => *lhs += rhs,
            (Self::Regional(lhs), Self::Regional(rhs)) => {
                'outer: for (region, count) in rhs {
                    for (seen_region, seen_count) in lhs.iter_mut() {
                        if *seen_region == region {
                            *seen_count += count;
                            continue 'outer;
                        }
                    }
                    lhs.push((region, count));
                }
            }
            (lhs, rhs) => panic!("tally shape mismatch: adding {rhs:?} to {lhs:?}"),
        }
    }
}

impl std::fmt::Display for RegionTally {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Interregional(total) => write!(f, "{total} matches"),
            Self::Regional(counts) => {
                let mut iter = counts.iter();
                let Some((first_region, first_count)) = iter.next() else {
                    return write!(f, "no regions");
                };

                write!(f, "region {first_region}: {first_count}")?;
                for (region, count) in iter {
                    write!(f, ", region {region}: {count}")?;
                }
                Ok(())
            }
        }
    }
}

/// Matches needed for every pair in a set of `n` teams to meet once.
#[must_use]
pub const fn choose_two(n: u64) -> u64 {
    n * n.saturating_sub(1) / 2
}
