//! Pair enumeration and deterministic shuffling.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::input::{ScheduleRequest, Team};

/// A pairing waiting for a lane.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pairing {
    Game { a: Team, b: Team },
    Practice { team: Team },
}

/// Derives the shuffle seed for a request.
///
/// The multiplier is the 64-bit golden-ratio constant; it spreads small
/// consecutive ids across the seed space while staying reproducible.
#[must_use]
pub fn seed_for(unique_id: u32) -> u64 {
    u64::from(unique_id).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Enumerates every pairing the request asks for, shuffled with a seed
/// derived from the request id.
///
/// Each pool occurrence contributes every unordered pair once (or, for
/// practice requests, each team once); repeating a pool is how callers
/// express match multiplicity. Shuffling spreads those repeats so the
/// same pair does not monopolise consecutive lanes.
#[must_use]
pub fn enumerate_pairings(request: &ScheduleRequest) -> Vec<Pairing> {
    let mut pairings = Vec::new();

    for pool in &request.pools {
        if request.is_practice {
            pairings.extend(pool.teams.iter().map(|&team| Pairing::Practice { team }));
        } else {
            for (i, &a) in pool.teams.iter().enumerate() {
                for &b in &pool.teams[i + 1..] {
                    pairings.push(Pairing::Game { a, b });
                }
            }
        }
    }

    let mut rng = SmallRng::seed_from_u64(seed_for(request.unique_id));
    pairings.shuffle(&mut rng);
    pairings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::TeamPool;

    fn request(pools: Vec<TeamPool>, is_practice: bool) -> ScheduleRequest {
        ScheduleRequest {
            unique_id: 7,
            pools,
            fields: vec![],
            conflicts: vec![],
            is_practice,
        }
    }

    #[test]
    fn four_teams_yield_six_pairs() {
        let pairings = enumerate_pairings(&request(vec![TeamPool::new([1, 2, 3, 4])], false));
        assert_eq!(pairings.len(), 6);

        // Every unordered pair appears exactly once.
        for a in 1..=4 {
            for b in (a + 1)..=4 {
                let count = pairings
                    .iter()
                    .filter(|p| match p {
                        Pairing::Game { a: x, b: y } => {
                            (x.id == a && y.id == b) || (x.id == b && y.id == a)
                        }
                        Pairing::Practice { .. } => false,
                    })
                    .count();
                assert_eq!(count, 1, "pair ({a},{b})");
            }
        }
    }

    #[test]
    fn repeated_pool_doubles_multiplicity() {
        let pool = TeamPool::new([1, 2, 3]);
        let pairings = enumerate_pairings(&request(vec![pool.clone(), pool], false));
        assert_eq!(pairings.len(), 6);
    }

    #[test]
    fn practice_enumerates_singletons() {
        let pool = TeamPool::new([1, 2, 3, 4, 5]);
        let pairings = enumerate_pairings(&request(vec![pool.clone(), pool.clone(), pool], true));
        assert_eq!(pairings.len(), 15);
        assert!(pairings
            .iter()
            .all(|p| matches!(p, Pairing::Practice { .. })));
    }

    #[test]
    fn shuffle_is_deterministic_per_id() {
        let make = |id: u32| {
            let mut r = request(vec![TeamPool::new([1, 2, 3, 4, 5, 6])], false);
            r.unique_id = id;
            enumerate_pairings(&r)
        };

        assert_eq!(make(3), make(3));

        // Different ids almost certainly order 15 pairs differently.
        assert_ne!(make(3), make(4));
    }
}
