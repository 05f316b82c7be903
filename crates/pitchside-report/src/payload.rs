//! Payload generation.
//!
//! Converts a validated configuration into the wire inputs the
//! scheduling stream consumes: one [`ScheduledInput`] per surviving
//! target and season phase.
//!
//! The wire schema has no match-multiplicity field, so each team
//! collection is repeated once per requested round; the engine produces
//! every unordered pair once per occurrence. Slots handed to one phase
//! are claimed and withheld from later phases built by the same builder.

use std::collections::{BTreeMap, BTreeSet};

use itertools::Itertools;
use pitchside_core::{FieldId, SeasonPhase, SlotId, TargetId};
use pitchside_proto::scheduling as proto;
use tracing::debug;

use crate::context::AnalysisContext;
use crate::error::{ReportError, ReportResult};
use crate::report::PreScheduleReport;

/// One unit of work for the scheduling stream, traced back to the
/// target it was built from.
#[derive(Clone, Debug, PartialEq)]
pub struct Payload {
    pub target_id: TargetId,
    pub phase: SeasonPhase,
    pub input: proto::ScheduledInput,
}

impl Payload {
    /// How many reservations a complete schedule of this payload holds.
    /// Fewer in the stream response means unplaced pairings.
    #[must_use]
    pub fn expected_reservations(&self) -> usize {
        self.input
            .team_groups
            .iter()
            .map(|collection| {
                let teams = collection.teams.len();
                if self.input.is_practice {
                    teams
                } else {
                    teams * teams.saturating_sub(1) / 2
                }
            })
            .sum()
    }
}

/// Options for one phase of payload generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PayloadOptions {
    pub matches_to_play: u8,
    pub interregional: bool,
    pub phase: SeasonPhase,
}

/// Builds stream inputs across phases, tracking slot consumption so the
/// post season only sees slots the normal season left behind.
#[derive(Debug, Default)]
pub struct PayloadBuilder {
    claimed_slots: BTreeSet<SlotId>,
    next_unique_id: u32,
}

impl PayloadBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits one payload per target that survived analysis.
    ///
    /// Fails without claiming any slots if a store id cannot be
    /// represented on the wire.
    pub fn build(
        &mut self,
        ctx: &AnalysisContext,
        report: &PreScheduleReport,
        options: PayloadOptions,
    ) -> ReportResult<Vec<Payload>> {
        let skipped = report.skipped_targets();
        let mut payloads = Vec::new();
        let mut used_slots: BTreeSet<SlotId> = BTreeSet::new();

        for target in &ctx.targets {
            if target.group_ids.is_empty() || skipped.contains(&target.id) {
                continue;
            }

            let eligible = ctx.eligible_teams(&target.group_ids);
            if eligible.is_empty() {
                continue;
            }

            // Partition by region, or flatten for interregional play.
            let base_collections: Vec<Vec<i32>> = if options.interregional {
                vec![eligible.iter().map(|team| team.id).collect()]
            } else {
                let by_region = eligible
                    .iter()
                    .sorted_by_key(|team| team.region_id)
                    .chunk_by(|team| team.region_id);
                by_region
                    .into_iter()
                    .map(|(_, teams)| teams.map(|team| team.id).collect())
                    .collect()
            };

            let mut team_groups = Vec::new();
            for _ in 0..options.matches_to_play {
                for ids in &base_collections {
                    let teams = ids
                        .iter()
                        .map(|&id| wire_team(id))
                        .collect::<ReportResult<Vec<_>>>()?;
                    team_groups.push(proto::PlayableTeamCollection { teams });
                }
            }

            // Usable slots: matching the reservation-type filter and not
            // claimed by an earlier phase.
            let mut field_slots: BTreeMap<FieldId, Vec<proto::TimeSlot>> = BTreeMap::new();
            for supply in &ctx.slots {
                if !ctx.slot_matches_target(supply, target)
                    || self.claimed_slots.contains(&supply.slot.id)
                {
                    continue;
                }
                used_slots.insert(supply.slot.id);
                field_slots
                    .entry(supply.slot.field_id)
                    .or_default()
                    .push(proto::TimeSlot {
                        start: supply.slot.window.start_millis(),
                        end: supply.slot.window.end_millis(),
                        concurrency: u32::from(supply.capacity),
                    });
            }

            let mut fields = Vec::with_capacity(field_slots.len());
            for (field_id, time_slots) in field_slots {
                fields.push(proto::Field {
                    unique_id: wire_id(field_id)?,
                    time_slots,
                });
            }

            let eligible_ids: BTreeSet<i32> = eligible.iter().map(|team| team.id).collect();
            let mut coach_conflicts = Vec::new();
            for conflict in &ctx.coach_conflicts {
                if conflict.team_ids.len() < 2
                    || !conflict
                        .team_ids
                        .iter()
                        .all(|team| eligible_ids.contains(team))
                {
                    continue;
                }
                coach_conflicts.push(proto::CoachConflict {
                    unique_id: wire_id(conflict.id)?,
                    region_id: wire_id(conflict.region_id)?,
                    teams: conflict
                        .team_ids
                        .iter()
                        .map(|&id| wire_team(id))
                        .collect::<ReportResult<Vec<_>>>()?,
                });
            }

            let is_practice = ctx.practice_character(target).unwrap_or(false);

            self.next_unique_id += 1;
            payloads.push(Payload {
                target_id: target.id,
                phase: options.phase,
                input: proto::ScheduledInput {
                    unique_id: self.next_unique_id,
                    team_groups,
                    fields,
                    coach_conflicts,
                    is_practice,
                },
            });
        }

        debug!(
            phase = ?options.phase,
            payloads = payloads.len(),
            slots_claimed = used_slots.len(),
            "built schedule payloads"
        );

        self.claimed_slots.extend(used_slots);
        Ok(payloads)
    }
}

fn wire_id(id: i32) -> ReportResult<u32> {
    u32::try_from(id).map_err(|_| ReportError::IdOutOfRange(id))
}

fn wire_team(id: i32) -> ReportResult<proto::Team> {
    Ok(proto::Team {
        unique_id: wire_id(id)?,
    })
}
