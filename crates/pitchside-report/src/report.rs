//! The pre-schedule feasibility report.
//!
//! Communicates potential clashes and misuse, alongside the requirements
//! to proceed with schedule creation. Soft findings are data in the
//! report; only snapshot failures surface as errors.

use std::collections::{BTreeMap, BTreeSet};

use pitchside_core::{GroupId, TargetId};
use pitchside_store::EntityStore;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::AnalysisContext;
use crate::error::{ReportError, ReportResult};
use crate::tally::{choose_two, RegionTally};

/// Client-supplied knobs for one report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportInput {
    /// How many times each eligible pair should meet, `1..=7`.
    pub matches_to_play: u8,
    /// Whether matches may cross region boundaries.
    pub interregional: bool,
    /// Pre-computed supply total. The post-season report passes the
    /// normal season's leftovers here; `None` means count every slot.
    #[serde(skip)]
    pub total_matches_supplied: Option<u64>,
}

impl ReportInput {
    fn validate(&self) -> ReportResult<()> {
        if !(1..=7).contains(&self.matches_to_play) {
            return Err(ReportError::MatchesOutOfBounds(self.matches_to_play));
        }
        Ok(())
    }
}

/// Targets sharing one duplicate-identity tuple: the unordered group set
/// plus the practice character of the reservation-type filter.
///
/// Two targets with the same groups but filters differing in
/// `is_practice` land in separate entries and are therefore permitted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateEntry {
    pub group_ids: Vec<GroupId>,
    pub is_practice: Option<bool>,
    pub used_by: Vec<TargetId>,
    /// Teams whose group set covers `group_ids`, per region or total.
    pub eligible_teams: RegionTally,
}

impl DuplicateEntry {
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        self.used_by.len() > 1
    }
}

/// Required versus supplied matches for one target.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyRequireEntry {
    pub target: TargetId,
    pub required: RegionTally,
    pub supplied: RegionTally,
}

impl SupplyRequireEntry {
    /// Component-wise supplied >= required.
    #[must_use]
    pub fn is_accounted_for(&self) -> bool {
        self.supplied.satisfies(&self.required)
    }
}

/// The feasibility report shown before any schedule is generated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreScheduleReport {
    pub target_duplicates: Vec<DuplicateEntry>,
    /// Ids of targets that collide with another target.
    pub target_has_duplicates: Vec<TargetId>,
    pub target_match_count: Vec<SupplyRequireEntry>,
    /// Targets with an empty group set; reported and skipped.
    pub empty_targets: Vec<TargetId>,
    /// Targets that cannot field a single match anywhere.
    pub impossible_targets: Vec<TargetId>,
    pub total_matches_required: u64,
    pub total_matches_supplied: u64,
    pub interregional: bool,
}

impl PreScheduleReport {
    /// Builds a report from a store snapshot.
    pub fn new(ctx: &AnalysisContext, input: &ReportInput) -> ReportResult<Self> {
        input.validate()?;

        let empty_targets: Vec<TargetId> = ctx
            .targets
            .iter()
            .filter(|t| t.group_ids.is_empty())
            .map(|t| t.id)
            .collect();

        let active: Vec<_> = ctx
            .targets
            .iter()
            .filter(|t| !t.group_ids.is_empty())
            .collect();

        // Group targets by their duplicate identity.
        let mut collision_map: BTreeMap<(BTreeSet<GroupId>, Option<bool>), Vec<TargetId>> =
            BTreeMap::new();
        for target in &active {
            let key = (
                target.group_ids.iter().copied().collect(),
                ctx.practice_character(target),
            );
            collision_map.entry(key).or_default().push(target.id);
        }

        let mut target_duplicates = Vec::with_capacity(collision_map.len());
        for ((groups, is_practice), used_by) in collision_map {
            let group_ids: Vec<GroupId> = groups.into_iter().collect();
            let eligible = ctx.eligible_teams(&group_ids);

            let eligible_teams = if input.interregional {
                RegionTally::Interregional(eligible.len() as u64)
            } else {
                RegionTally::fold_from(eligible.iter().map(|team| (team.region_id, 1)))
            };

            target_duplicates.push(DuplicateEntry {
                group_ids,
                is_practice,
                used_by,
                eligible_teams,
            });
        }

        let target_has_duplicates: Vec<TargetId> = target_duplicates
            .iter()
            .filter(|entry| entry.has_duplicates())
            .flat_map(|entry| entry.used_by.iter().copied())
            .collect();

        // A target is impossible when no component of its eligible set
        // can field even one match.
        let impossible_targets: Vec<TargetId> = target_duplicates
            .iter()
            .filter(|entry| !entry.eligible_teams.any_component_at_least(2))
            .flat_map(|entry| entry.used_by.iter().copied())
            .collect();

        // Required matches: the choice formula per entry, credited to
        // every target using that identity, then scaled by the rounds.
        let mut target_required: BTreeMap<TargetId, RegionTally> = BTreeMap::new();
        let mut total_matches_required = 0u64;

        for entry in &target_duplicates {
            let choices = match &entry.eligible_teams {
                RegionTally::Interregional(count) => {
                    RegionTally::Interregional(choose_two(*count))
                }
                RegionTally::Regional(counts) => RegionTally::fold_from(
                    counts.iter().map(|(region, count)| (*region, choose_two(*count))),
                ),
            };

            total_matches_required += choices.sum_total();
            for target in &entry.used_by {
                let required = target_required
                    .entry(*target)
                    .or_insert_with(|| RegionTally::zero(input.interregional));
                *required += choices.clone();
            }
        }

        let rounds = u64::from(input.matches_to_play);
        for required in target_required.values_mut() {
            required.spread_mul(rounds);
        }
        total_matches_required *= rounds;

        // Supply pools per reservation type. Targets draw from a shared
        // pool so overlapping targets cannot double-count the same slots.
        let mut pools: BTreeMap<i32, RegionTally> = BTreeMap::new();
        for supply in &ctx.slots {
            let pool = pools
                .entry(supply.slot.reservation_type_id)
                .or_insert_with(|| RegionTally::zero(input.interregional));
            *pool += if input.interregional {
                RegionTally::Interregional(supply.matches_supplied())
            } else {
                RegionTally::Regional(vec![(supply.region_id, supply.matches_supplied())])
            };
        }

        let mut target_supplied: BTreeMap<TargetId, RegionTally> = BTreeMap::new();
        for supply in &ctx.slots {
            for target in &active {
                if !ctx.slot_matches_target(supply, target) {
                    continue;
                }

                let drawn = if input.interregional {
                    RegionTally::Interregional(supply.matches_supplied())
                } else {
                    RegionTally::Regional(vec![(supply.region_id, supply.matches_supplied())])
                };

                let pool = pools
                    .get_mut(&supply.slot.reservation_type_id)
                    .expect("pools were seeded from the same slot list");
                if pool.reduce_by(&drawn).is_some() {
                    // This slot's capacity is spoken for.
                    continue;
                }

                let supplied = target_supplied
                    .entry(target.id)
                    .or_insert_with(|| RegionTally::zero(input.interregional));
                *supplied += drawn;
            }
        }

        // Every active target has a required entry; give the ones no slot
        // reached a zero supply of the matching shape.
        let mut target_match_count = Vec::with_capacity(target_required.len());
        for (target, required) in target_required {
            let supplied = target_supplied
                .remove(&target)
                .unwrap_or_else(|| required.zero_like());
            target_match_count.push(SupplyRequireEntry {
                target,
                required,
                supplied,
            });
        }

        let total_matches_supplied = input
            .total_matches_supplied
            .unwrap_or_else(|| ctx.slots.iter().map(|s| s.matches_supplied()).sum());

        debug!(
            targets = target_match_count.len(),
            duplicates = target_has_duplicates.len(),
            impossible = impossible_targets.len(),
            total_matches_required,
            total_matches_supplied,
            "built pre-schedule report"
        );

        Ok(Self {
            target_duplicates,
            target_has_duplicates,
            target_match_count,
            empty_targets,
            impossible_targets,
            total_matches_required,
            total_matches_supplied,
            interregional: input.interregional,
        })
    }

    /// Builds a report from a live store.
    pub async fn create(store: &dyn EntityStore, input: &ReportInput) -> ReportResult<Self> {
        let ctx = AnalysisContext::gather(store).await?;
        Self::new(&ctx, input)
    }

    /// Targets whose supply does not cover their requirement.
    #[must_use]
    pub fn undersupplied_targets(&self) -> Vec<TargetId> {
        self.target_match_count
            .iter()
            .filter(|entry| !entry.is_accounted_for())
            .map(|entry| entry.target)
            .collect()
    }

    /// True when scheduling must not proceed: duplicate, impossible, or
    /// undersupplied targets exist. Empty targets alone do not block;
    /// they are skipped.
    #[must_use]
    pub fn has_blocking_findings(&self) -> bool {
        !self.target_has_duplicates.is_empty()
            || !self.impossible_targets.is_empty()
            || !self.undersupplied_targets().is_empty()
    }

    /// Targets that should be excluded from payload generation.
    #[must_use]
    pub fn skipped_targets(&self) -> BTreeSet<TargetId> {
        self.empty_targets
            .iter()
            .chain(&self.impossible_targets)
            .chain(&self.target_has_duplicates)
            .copied()
            .collect()
    }
}
