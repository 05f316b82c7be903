//! Snapshot of the store for analysis and payload generation.

use std::collections::BTreeMap;

use pitchside_core::{
    CoachConflict, FieldId, GroupId, RegionId, ReservationType, ReservationTypeId, Target, Team,
    TimeSlot,
};
use pitchside_store::EntityStore;

use crate::error::ReportResult;

/// A time slot joined with everything the analyzer needs: its effective
/// capacity and the region its field belongs to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotSupply {
    pub slot: TimeSlot,
    pub capacity: u8,
    pub region_id: RegionId,
}

impl SlotSupply {
    /// Matches a slot's reservation type can host per occurrence.
    #[must_use]
    pub fn matches_supplied(&self) -> u64 {
        u64::from(self.capacity)
    }
}

/// An immutable snapshot of everything analysis reads.
///
/// Gathered once per request so the analyzer and the payload builder see
/// one consistent view regardless of concurrent edits.
#[derive(Clone, Debug, Default)]
pub struct AnalysisContext {
    pub targets: Vec<Target>,
    pub teams: Vec<Team>,
    pub reservation_types: BTreeMap<ReservationTypeId, ReservationType>,
    pub slots: Vec<SlotSupply>,
    pub field_regions: BTreeMap<FieldId, RegionId>,
    pub coach_conflicts: Vec<CoachConflict>,
}

impl AnalysisContext {
    /// Snapshots the store.
    pub async fn gather(store: &dyn EntityStore) -> ReportResult<Self> {
        let mut targets = store.list_targets().await?;
        targets.sort_by_key(|t| t.id);

        let teams = store.list_all_teams().await?;

        let reservation_types: BTreeMap<ReservationTypeId, ReservationType> = store
            .list_reservation_types()
            .await?
            .into_iter()
            .map(|rt| (rt.id, rt))
            .collect();

        let mut slots = Vec::new();
        let mut field_regions = BTreeMap::new();

        for region in store.list_regions().await? {
            for field in store.list_fields(region.id).await? {
                field_regions.insert(field.id, region.id);
                for slot in store.list_time_slots(field.id, None).await? {
                    let capacity = store
                        .capacity(field.id, slot.reservation_type_id)
                        .await?;
                    slots.push(SlotSupply {
                        slot,
                        capacity,
                        region_id: region.id,
                    });
                }
            }
        }

        let coach_conflicts = store.list_coach_conflicts(None).await?;

        Ok(Self {
            targets,
            teams,
            reservation_types,
            slots,
            field_regions,
            coach_conflicts,
        })
    }

    /// Teams whose group set is a superset of `group_ids`.
    pub fn eligible_teams(&self, group_ids: &[GroupId]) -> Vec<&Team> {
        self.teams
            .iter()
            .filter(|team| team.has_all_groups(group_ids))
            .collect()
    }

    /// The practice-vs-match character of a target's filter; `None` when
    /// the target accepts any reservation type.
    pub fn practice_character(&self, target: &Target) -> Option<bool> {
        target
            .reservation_type_id
            .and_then(|id| self.reservation_types.get(&id))
            .map(|rt| rt.is_practice)
    }

    /// True if the slot is usable under the target's reservation-type
    /// filter.
    pub fn slot_matches_target(&self, supply: &SlotSupply, target: &Target) -> bool {
        target
            .reservation_type_id
            .map_or(true, |filter| supply.slot.reservation_type_id == filter)
    }
}
