//! In-memory entity store.
//!
//! Backs tests and profile isolation. All state lives behind one
//! `RwLock`; mutations validate first and only then write, so an error
//! never leaves partial state behind.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use pitchside_core::{
    CoachConflict, ConcurrencyTable, Field, FieldCalendar, FieldId, GroupId, Region, RegionId,
    ReservationType, ReservationTypeId, Schedule, ScheduleGame, ScheduleId, SlotId, Target,
    TargetId, Team, TeamGroup, TeamId, TimeSlot, TimeWindow, MAX_GAMES_PER_FIELD_TYPE,
    MIN_GAMES_PER_FIELD_TYPE,
};
use rand::seq::SliceRandom;

use crate::error::{StoreError, StoreResult};
use crate::inputs::{
    CoachConflictTeamOp, CopyTimeSlots, CreateCoachConflict, CreateField, CreateRegion,
    CreateReservationType, CreateTeam, CreateTimeSlot, EditRegion, EditReservationType,
    EditSchedule, EditTeam, MembershipOp, MoveTimeSlot, NewScheduleGame, TargetGroupOp,
};
use crate::traits::{touch, EntityStore};

#[derive(Clone, Copy, Debug, Default)]
struct IdGen(i32);

impl IdGen {
    fn take(&mut self) -> i32 {
        self.0 += 1;
        self.0
    }
}

#[derive(Default)]
struct Inner {
    regions: BTreeMap<RegionId, Region>,
    fields: BTreeMap<FieldId, Field>,
    groups: BTreeMap<GroupId, TeamGroup>,
    teams: BTreeMap<TeamId, Team>,
    reservation_types: BTreeMap<ReservationTypeId, ReservationType>,
    concurrency: ConcurrencyTable,
    calendars: BTreeMap<FieldId, FieldCalendar>,
    /// Slot ids are global; this resolves a slot back to its field.
    slot_fields: BTreeMap<SlotId, FieldId>,
    targets: BTreeMap<TargetId, Target>,
    conflicts: BTreeMap<i32, CoachConflict>,
    schedules: BTreeMap<ScheduleId, Schedule>,
    schedule_games: BTreeMap<i32, ScheduleGame>,

    region_ids: IdGen,
    field_ids: IdGen,
    group_ids: IdGen,
    team_ids: IdGen,
    reservation_type_ids: IdGen,
    slot_ids: IdGen,
    target_ids: IdGen,
    conflict_ids: IdGen,
    schedule_ids: IdGen,
    game_ids: IdGen,
}

impl Inner {
    fn recount_group_usage(&mut self) {
        for group in self.groups.values_mut() {
            group.usage = 0;
        }
        for team in self.teams.values() {
            for group_id in &team.group_ids {
                if let Some(group) = self.groups.get_mut(group_id) {
                    group.usage += 1;
                }
            }
        }
    }

    fn calendar_mut(&mut self, field_id: FieldId) -> StoreResult<&mut FieldCalendar> {
        if !self.fields.contains_key(&field_id) {
            return Err(StoreError::FieldNotFound(field_id));
        }
        Ok(self
            .calendars
            .entry(field_id)
            .or_insert_with(|| FieldCalendar::new(field_id)))
    }

    fn field_of_slot(&self, id: SlotId) -> StoreResult<FieldId> {
        self.slot_fields
            .get(&id)
            .copied()
            .ok_or(StoreError::Calendar(
                pitchside_core::CalendarError::SlotNotFound(id),
            ))
    }

    fn remove_field(&mut self, id: FieldId) {
        self.fields.remove(&id);
        if let Some(calendar) = self.calendars.remove(&id) {
            for slot in calendar.slots() {
                self.slot_fields.remove(&slot.id);
            }
        }
    }

    fn slots_of(&self, field_id: FieldId) -> Vec<TimeSlot> {
        self.calendars
            .get(&field_id)
            .map(|calendar| {
                calendar
                    .slots()
                    .map(|slot| TimeSlot {
                        id: slot.id,
                        field_id,
                        reservation_type_id: slot.reservation_type_id,
                        window: slot.window,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Checks a game placement against the other games of its schedule on
    /// the same field.
    fn game_placement_conflicts(
        &self,
        schedule_id: ScheduleId,
        field_id: FieldId,
        window: &TimeWindow,
        exclude: &[i32],
    ) -> StoreResult<()> {
        for game in self.schedule_games.values() {
            if game.schedule_id != schedule_id
                || game.field_id != field_id
                || exclude.contains(&game.id)
            {
                continue;
            }
            if game.window.overlaps(window) {
                return Err(StoreError::Calendar(
                    pitchside_core::CalendarError::Overlap {
                        o_start: game.window.start(),
                        o_end: game.window.end(),
                    },
                ));
            }
        }
        Ok(())
    }
}

/// The in-memory store.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Generates the name a freshly saved schedule receives.
    #[must_use]
    pub fn generate_schedule_name() -> String {
        const ADJECTIVES: [&str; 12] = [
            "Funky",
            "Rambunctious",
            "Awesome",
            "Splendid",
            "Tubular",
            "Wonderful",
            "Radical",
            "Great",
            "Stupendous",
            "Remarkable",
            "Fashionable",
            "Elegant",
        ];

        let adjective = ADJECTIVES
            .choose(&mut rand::thread_rng())
            .unwrap_or(&ADJECTIVES[0]);
        format!("New {adjective} Schedule")
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn list_regions(&self) -> StoreResult<Vec<Region>> {
        Ok(self.inner.read().regions.values().cloned().collect())
    }

    async fn get_region(&self, id: RegionId) -> StoreResult<Region> {
        self.inner
            .read()
            .regions
            .get(&id)
            .cloned()
            .ok_or(StoreError::RegionNotFound(id))
    }

    async fn create_region(&self, input: CreateRegion) -> StoreResult<Region> {
        input.validate()?;

        let mut inner = self.inner.write();
        let id = inner.region_ids.take();
        let region = Region {
            id,
            title: input.title.trim().to_owned(),
        };
        inner.regions.insert(id, region.clone());
        Ok(region)
    }

    async fn edit_region(&self, input: EditRegion) -> StoreResult<Region> {
        input.validate()?;

        let mut inner = self.inner.write();
        let region = inner
            .regions
            .get_mut(&input.id)
            .ok_or(StoreError::RegionNotFound(input.id))?;

        if let Some(title) = input.title {
            region.title = title.trim().to_owned();
        }
        Ok(region.clone())
    }

    async fn delete_region(&self, id: RegionId) -> StoreResult<()> {
        let mut inner = self.inner.write();
        if inner.regions.remove(&id).is_none() {
            return Err(StoreError::RegionNotFound(id));
        }

        let doomed_fields: Vec<FieldId> = inner
            .fields
            .values()
            .filter(|f| f.region_id == id)
            .map(|f| f.id)
            .collect();
        for field_id in doomed_fields {
            inner.remove_field(field_id);
        }

        inner.teams.retain(|_, team| team.region_id != id);
        inner.conflicts.retain(|_, c| c.region_id != id);
        inner.recount_group_usage();
        Ok(())
    }

    async fn list_fields(&self, region_id: RegionId) -> StoreResult<Vec<Field>> {
        let inner = self.inner.read();
        if !inner.regions.contains_key(&region_id) {
            return Err(StoreError::RegionNotFound(region_id));
        }
        Ok(inner
            .fields
            .values()
            .filter(|f| f.region_id == region_id)
            .cloned()
            .collect())
    }

    async fn create_field(&self, input: CreateField) -> StoreResult<Field> {
        input.validate()?;

        let mut inner = self.inner.write();
        if !inner.regions.contains_key(&input.region_id) {
            return Err(StoreError::RegionNotFound(input.region_id));
        }

        let id = inner.field_ids.take();
        let field = Field {
            id,
            name: input.name.trim().to_owned(),
            region_id: input.region_id,
        };
        inner.fields.insert(id, field.clone());
        inner.calendars.insert(id, FieldCalendar::new(id));
        Ok(field)
    }

    async fn delete_field(&self, id: FieldId) -> StoreResult<()> {
        let mut inner = self.inner.write();
        if !inner.fields.contains_key(&id) {
            return Err(StoreError::FieldNotFound(id));
        }
        inner.remove_field(id);
        Ok(())
    }

    async fn list_groups(&self) -> StoreResult<Vec<TeamGroup>> {
        Ok(self.inner.read().groups.values().cloned().collect())
    }

    async fn create_group(&self, tag: String) -> StoreResult<TeamGroup> {
        let normalized = tag.trim().to_lowercase();
        pitchside_core::validate_name(&normalized)?;

        let mut inner = self.inner.write();
        if inner.groups.values().any(|g| g.name == normalized) {
            return Err(StoreError::DuplicateTag);
        }

        let id = inner.group_ids.take();
        let group = TeamGroup {
            id,
            name: normalized,
            usage: 0,
        };
        inner.groups.insert(id, group.clone());
        Ok(group)
    }

    async fn delete_group(&self, id: GroupId) -> StoreResult<()> {
        let mut inner = self.inner.write();
        if inner.groups.remove(&id).is_none() {
            return Err(StoreError::GroupNotFound(id));
        }
        for team in inner.teams.values_mut() {
            team.group_ids.retain(|&g| g != id);
        }
        for target in inner.targets.values_mut() {
            target.group_ids.retain(|&g| g != id);
        }
        Ok(())
    }

    async fn list_teams(&self, region_id: RegionId) -> StoreResult<Vec<Team>> {
        let inner = self.inner.read();
        if !inner.regions.contains_key(&region_id) {
            return Err(StoreError::RegionNotFound(region_id));
        }
        Ok(inner
            .teams
            .values()
            .filter(|t| t.region_id == region_id)
            .cloned()
            .collect())
    }

    async fn list_all_teams(&self) -> StoreResult<Vec<Team>> {
        Ok(self.inner.read().teams.values().cloned().collect())
    }

    async fn get_team(&self, id: TeamId) -> StoreResult<Team> {
        self.inner
            .read()
            .teams
            .get(&id)
            .cloned()
            .ok_or(StoreError::TeamNotFound(id))
    }

    async fn create_team(&self, input: CreateTeam) -> StoreResult<Team> {
        input.validate()?;

        let mut inner = self.inner.write();
        if !inner.regions.contains_key(&input.region_id) {
            return Err(StoreError::RegionNotFound(input.region_id));
        }

        let missing: Vec<GroupId> = input
            .group_ids
            .iter()
            .copied()
            .filter(|g| !inner.groups.contains_key(g))
            .collect();
        if !missing.is_empty() {
            return Err(StoreError::MissingGroups(missing));
        }

        let mut group_ids = input.group_ids;
        group_ids.sort_unstable();
        group_ids.dedup();

        let id = inner.team_ids.take();
        let team = Team {
            id,
            name: input.name.trim().to_owned(),
            region_id: input.region_id,
            group_ids,
        };
        inner.teams.insert(id, team.clone());
        inner.recount_group_usage();
        Ok(team)
    }

    async fn edit_team(&self, input: EditTeam) -> StoreResult<Team> {
        input.validate()?;

        let mut inner = self.inner.write();
        if let Some(group_ids) = &input.group_ids {
            let missing: Vec<GroupId> = group_ids
                .iter()
                .copied()
                .filter(|g| !inner.groups.contains_key(g))
                .collect();
            if !missing.is_empty() {
                return Err(StoreError::MissingGroups(missing));
            }
        }

        let team = inner
            .teams
            .get_mut(&input.id)
            .ok_or(StoreError::TeamNotFound(input.id))?;

        if let Some(name) = input.name {
            team.name = name.trim().to_owned();
        }
        if let Some(mut group_ids) = input.group_ids {
            group_ids.sort_unstable();
            group_ids.dedup();
            team.group_ids = group_ids;
        }
        let team = team.clone();
        inner.recount_group_usage();
        Ok(team)
    }

    async fn delete_team(&self, id: TeamId) -> StoreResult<()> {
        let mut inner = self.inner.write();
        if inner.teams.remove(&id).is_none() {
            return Err(StoreError::TeamNotFound(id));
        }
        for conflict in inner.conflicts.values_mut() {
            conflict.team_ids.retain(|&t| t != id);
        }
        inner.recount_group_usage();
        Ok(())
    }

    async fn list_reservation_types(&self) -> StoreResult<Vec<ReservationType>> {
        Ok(self
            .inner
            .read()
            .reservation_types
            .values()
            .cloned()
            .collect())
    }

    async fn get_reservation_type(&self, id: ReservationTypeId) -> StoreResult<ReservationType> {
        self.inner
            .read()
            .reservation_types
            .get(&id)
            .cloned()
            .ok_or(StoreError::ReservationTypeNotFound(id))
    }

    async fn create_reservation_type(
        &self,
        input: CreateReservationType,
    ) -> StoreResult<ReservationType> {
        input.validate()?;

        let mut inner = self.inner.write();
        let id = inner.reservation_type_ids.take();
        let reservation_type = ReservationType {
            id,
            name: input.name.trim().to_owned(),
            color: input.color,
            default_concurrency: input.default_concurrency,
            is_practice: input.is_practice,
            description: input.description,
        };
        inner
            .reservation_types
            .insert(id, reservation_type.clone());
        inner.concurrency.set_default(id, input.default_concurrency);
        Ok(reservation_type)
    }

    async fn edit_reservation_type(
        &self,
        input: EditReservationType,
    ) -> StoreResult<ReservationType> {
        input.validate()?;

        let mut inner = self.inner.write();
        let reservation_type = inner
            .reservation_types
            .get_mut(&input.id)
            .ok_or(StoreError::ReservationTypeNotFound(input.id))?;

        if let Some(name) = input.name {
            reservation_type.name = name.trim().to_owned();
        }
        if let Some(color) = input.color {
            reservation_type.color = color;
        }
        if let Some(description) = input.description {
            reservation_type.description = description;
        }
        if let Some(is_practice) = input.is_practice {
            reservation_type.is_practice = is_practice;
        }
        if let Some(concurrency) = input.default_concurrency {
            reservation_type.default_concurrency = concurrency;
        }
        let reservation_type = reservation_type.clone();

        if input.default_concurrency.is_some() {
            inner
                .concurrency
                .set_default(input.id, reservation_type.default_concurrency);
        }
        Ok(reservation_type)
    }

    async fn delete_reservation_type(&self, id: ReservationTypeId) -> StoreResult<()> {
        let mut inner = self.inner.write();
        if inner.reservation_types.remove(&id).is_none() {
            return Err(StoreError::ReservationTypeNotFound(id));
        }
        for target in inner.targets.values_mut() {
            if target.reservation_type_id == Some(id) {
                target.reservation_type_id = None;
            }
        }
        Ok(())
    }

    async fn capacity(
        &self,
        field_id: FieldId,
        reservation_type_id: ReservationTypeId,
    ) -> StoreResult<u8> {
        let inner = self.inner.read();
        if !inner.fields.contains_key(&field_id) {
            return Err(StoreError::FieldNotFound(field_id));
        }
        if !inner.reservation_types.contains_key(&reservation_type_id) {
            return Err(StoreError::ReservationTypeNotFound(reservation_type_id));
        }
        Ok(inner.concurrency.capacity(field_id, reservation_type_id))
    }

    async fn set_concurrency_override(
        &self,
        field_id: FieldId,
        reservation_type_id: ReservationTypeId,
        concurrency: Option<u8>,
    ) -> StoreResult<()> {
        let mut inner = self.inner.write();
        if !inner.fields.contains_key(&field_id) {
            return Err(StoreError::FieldNotFound(field_id));
        }
        if !inner.reservation_types.contains_key(&reservation_type_id) {
            return Err(StoreError::ReservationTypeNotFound(reservation_type_id));
        }

        match concurrency {
            Some(value) => {
                if !(MIN_GAMES_PER_FIELD_TYPE..=MAX_GAMES_PER_FIELD_TYPE).contains(&value) {
                    return Err(StoreError::ConcurrencyOutOfBounds(value));
                }
                inner
                    .concurrency
                    .set_override(field_id, reservation_type_id, value);
            }
            None => inner.concurrency.clear_override(field_id, reservation_type_id),
        }
        Ok(())
    }

    async fn list_concurrency_overrides(
        &self,
    ) -> StoreResult<Vec<(FieldId, ReservationTypeId, u8)>> {
        Ok(self.inner.read().concurrency.overrides().collect())
    }

    async fn list_time_slots(
        &self,
        field_id: FieldId,
        window: Option<TimeWindow>,
    ) -> StoreResult<Vec<TimeSlot>> {
        let inner = self.inner.read();
        if !inner.fields.contains_key(&field_id) {
            return Err(StoreError::FieldNotFound(field_id));
        }
        let mut slots = inner.slots_of(field_id);
        if let Some(window) = window {
            slots.retain(|slot| slot.window.overlaps(&window));
        }
        Ok(slots)
    }

    async fn list_time_slots_between(&self, window: TimeWindow) -> StoreResult<Vec<TimeSlot>> {
        let inner = self.inner.read();
        let mut result = Vec::new();
        for &field_id in inner.fields.keys() {
            result.extend(
                inner
                    .slots_of(field_id)
                    .into_iter()
                    .filter(|slot| slot.window.overlaps(&window)),
            );
        }
        Ok(result)
    }

    async fn create_time_slot(&self, input: CreateTimeSlot) -> StoreResult<TimeSlot> {
        let mut inner = self.inner.write();
        if !inner
            .reservation_types
            .contains_key(&input.reservation_type_id)
        {
            return Err(StoreError::ReservationTypeNotFound(
                input.reservation_type_id,
            ));
        }

        let id = inner.slot_ids.take();
        let calendar = inner.calendar_mut(input.field_id)?;
        calendar.insert_with_id(id, input.window, input.reservation_type_id)?;
        inner.slot_fields.insert(id, input.field_id);

        Ok(TimeSlot {
            id,
            field_id: input.field_id,
            reservation_type_id: input.reservation_type_id,
            window: input.window,
        })
    }

    async fn move_time_slot(&self, input: MoveTimeSlot) -> StoreResult<()> {
        let mut inner = self.inner.write();
        let field_id = inner.field_of_slot(input.id)?;
        let calendar = inner.calendar_mut(field_id)?;
        calendar.move_slot(input.id, input.window)?;
        Ok(())
    }

    async fn delete_time_slot(&self, id: SlotId) -> StoreResult<()> {
        let mut inner = self.inner.write();
        let field_id = inner.field_of_slot(id)?;
        let calendar = inner.calendar_mut(field_id)?;
        calendar.delete(id)?;
        inner.slot_fields.remove(&id);
        Ok(())
    }

    async fn copy_time_slots(&self, input: CopyTimeSlots) -> StoreResult<Vec<TimeSlot>> {
        let mut inner = self.inner.write();
        let first_field = inner.field_of_slot(input.first_id)?;
        let last_field = inner.field_of_slot(input.last_id)?;
        if first_field != last_field {
            return Err(StoreError::FieldMismatch(input.first_id, input.last_id));
        }

        // Pre-allocate ids outside the calendar borrow.
        let mut ids = inner.slot_ids;
        let created = {
            let calendar = inner.calendar_mut(first_field)?;
            calendar.batch_copy_with_ids(input.first_id, input.last_id, input.dst_start, || {
                ids.take()
            })?
        };
        inner.slot_ids = ids;

        for &id in &created {
            inner.slot_fields.insert(id, first_field);
        }

        let inner = &*inner;
        Ok(created
            .iter()
            .filter_map(|id| {
                inner.calendars.get(&first_field).and_then(|calendar| {
                    calendar.get(*id).map(|slot| TimeSlot {
                        id: slot.id,
                        field_id: first_field,
                        reservation_type_id: slot.reservation_type_id,
                        window: slot.window,
                    })
                })
            })
            .collect())
    }

    async fn delete_time_slots(&self, first_id: SlotId, last_id: SlotId) -> StoreResult<usize> {
        let mut inner = self.inner.write();
        let first_field = inner.field_of_slot(first_id)?;
        let last_field = inner.field_of_slot(last_id)?;
        if first_field != last_field {
            return Err(StoreError::FieldMismatch(first_id, last_id));
        }

        let calendar = inner.calendar_mut(first_field)?;
        let doomed: Vec<SlotId> = calendar
            .slots()
            .map(|slot| slot.id)
            .filter(|id| (first_id..=last_id).contains(id))
            .collect();
        let removed = calendar.batch_delete(first_id, last_id);
        for id in doomed {
            inner.slot_fields.remove(&id);
        }
        Ok(removed)
    }

    async fn list_targets(&self) -> StoreResult<Vec<Target>> {
        Ok(self.inner.read().targets.values().cloned().collect())
    }

    async fn create_target(&self) -> StoreResult<Target> {
        let mut inner = self.inner.write();
        let id = inner.target_ids.take();
        let target = Target {
            id,
            group_ids: vec![],
            reservation_type_id: None,
        };
        inner.targets.insert(id, target.clone());
        Ok(target)
    }

    async fn target_group_op(&self, input: TargetGroupOp) -> StoreResult<Target> {
        let mut inner = self.inner.write();
        if !inner.groups.contains_key(&input.group_id) {
            return Err(StoreError::GroupNotFound(input.group_id));
        }
        let target = inner
            .targets
            .get_mut(&input.target_id)
            .ok_or(StoreError::TargetNotFound(input.target_id))?;

        match input.op {
            MembershipOp::Add => {
                if !target.group_ids.contains(&input.group_id) {
                    target.group_ids.push(input.group_id);
                    target.group_ids.sort_unstable();
                }
            }
            MembershipOp::Remove => target.group_ids.retain(|&g| g != input.group_id),
        }
        Ok(target.clone())
    }

    async fn set_target_reservation_type(
        &self,
        target_id: TargetId,
        reservation_type_id: Option<ReservationTypeId>,
    ) -> StoreResult<Target> {
        let mut inner = self.inner.write();
        if let Some(id) = reservation_type_id {
            if !inner.reservation_types.contains_key(&id) {
                return Err(StoreError::ReservationTypeNotFound(id));
            }
        }
        let target = inner
            .targets
            .get_mut(&target_id)
            .ok_or(StoreError::TargetNotFound(target_id))?;
        target.reservation_type_id = reservation_type_id;
        Ok(target.clone())
    }

    async fn delete_target(&self, id: TargetId) -> StoreResult<()> {
        let mut inner = self.inner.write();
        inner
            .targets
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::TargetNotFound(id))
    }

    async fn list_coach_conflicts(
        &self,
        region_id: Option<RegionId>,
    ) -> StoreResult<Vec<CoachConflict>> {
        Ok(self
            .inner
            .read()
            .conflicts
            .values()
            .filter(|c| region_id.map_or(true, |r| c.region_id == r))
            .cloned()
            .collect())
    }

    async fn create_coach_conflict(
        &self,
        input: CreateCoachConflict,
    ) -> StoreResult<CoachConflict> {
        let mut inner = self.inner.write();
        if !inner.regions.contains_key(&input.region_id) {
            return Err(StoreError::RegionNotFound(input.region_id));
        }

        let id = inner.conflict_ids.take();
        let conflict = CoachConflict {
            id,
            region_id: input.region_id,
            coach_name: input.coach_name,
            team_ids: vec![],
        };
        inner.conflicts.insert(id, conflict.clone());
        Ok(conflict)
    }

    async fn rename_coach_conflict(&self, id: i32, coach_name: String) -> StoreResult<()> {
        let mut inner = self.inner.write();
        let conflict = inner
            .conflicts
            .get_mut(&id)
            .ok_or(StoreError::CoachConflictNotFound(id))?;
        conflict.coach_name = Some(coach_name);
        Ok(())
    }

    async fn coach_conflict_team_op(&self, input: CoachConflictTeamOp) -> StoreResult<()> {
        let mut inner = self.inner.write();
        let team_region = inner
            .teams
            .get(&input.team_id)
            .map(|t| t.region_id)
            .ok_or(StoreError::TeamNotFound(input.team_id))?;
        let conflict = inner
            .conflicts
            .get_mut(&input.coach_conflict_id)
            .ok_or(StoreError::CoachConflictNotFound(input.coach_conflict_id))?;

        if conflict.region_id != team_region {
            return Err(StoreError::RegionMismatch);
        }

        match input.op {
            MembershipOp::Add => {
                if !conflict.team_ids.contains(&input.team_id) {
                    conflict.team_ids.push(input.team_id);
                    conflict.team_ids.sort_unstable();
                }
            }
            MembershipOp::Remove => conflict.team_ids.retain(|&t| t != input.team_id),
        }
        Ok(())
    }

    async fn delete_coach_conflict(&self, id: i32) -> StoreResult<()> {
        let mut inner = self.inner.write();
        inner
            .conflicts
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::CoachConflictNotFound(id))
    }

    async fn save_schedule(&self, games: Vec<NewScheduleGame>) -> StoreResult<Schedule> {
        let mut inner = self.inner.write();
        for game in &games {
            if !inner.fields.contains_key(&game.field_id) {
                return Err(StoreError::FieldNotFound(game.field_id));
            }
        }

        let now = Utc::now();
        let id = inner.schedule_ids.take();
        let schedule = Schedule {
            id,
            name: Self::generate_schedule_name(),
            created: now,
            last_edit: now,
        };
        inner.schedules.insert(id, schedule.clone());

        for game in games {
            let game_id = inner.game_ids.take();
            inner.schedule_games.insert(
                game_id,
                ScheduleGame {
                    id: game_id,
                    schedule_id: id,
                    field_id: game.field_id,
                    window: game.window,
                    home_team: game.home_team,
                    away_team: game.away_team,
                },
            );
        }
        Ok(schedule)
    }

    async fn list_schedules(&self) -> StoreResult<Vec<Schedule>> {
        let mut schedules: Vec<Schedule> =
            self.inner.read().schedules.values().cloned().collect();
        schedules.sort_by(|a, b| b.last_edit.cmp(&a.last_edit));
        Ok(schedules)
    }

    async fn get_schedule(&self, id: ScheduleId) -> StoreResult<Schedule> {
        self.inner
            .read()
            .schedules
            .get(&id)
            .cloned()
            .ok_or(StoreError::ScheduleNotFound(id))
    }

    async fn edit_schedule(&self, input: EditSchedule) -> StoreResult<Schedule> {
        input.validate()?;

        let mut inner = self.inner.write();
        let schedule = inner
            .schedules
            .get_mut(&input.id)
            .ok_or(StoreError::ScheduleNotFound(input.id))?;

        if let Some(name) = input.name {
            schedule.name = name.trim().to_owned();
        }
        touch(schedule, Utc::now());
        Ok(schedule.clone())
    }

    async fn delete_schedule(&self, id: ScheduleId) -> StoreResult<()> {
        let mut inner = self.inner.write();
        if inner.schedules.remove(&id).is_none() {
            return Err(StoreError::ScheduleNotFound(id));
        }
        inner.schedule_games.retain(|_, game| game.schedule_id != id);
        Ok(())
    }

    async fn list_schedule_games(&self, schedule_id: ScheduleId) -> StoreResult<Vec<ScheduleGame>> {
        let inner = self.inner.read();
        if !inner.schedules.contains_key(&schedule_id) {
            return Err(StoreError::ScheduleNotFound(schedule_id));
        }
        Ok(inner
            .schedule_games
            .values()
            .filter(|g| g.schedule_id == schedule_id)
            .cloned()
            .collect())
    }

    async fn swap_schedule_games(&self, a: i32, b: i32) -> StoreResult<bool> {
        let mut inner = self.inner.write();
        let (Some(game_a), Some(game_b)) = (
            inner.schedule_games.get(&a).cloned(),
            inner.schedule_games.get(&b).cloned(),
        ) else {
            return Ok(false);
        };

        // Each game must fit the other's placement, ignoring both.
        inner.game_placement_conflicts(
            game_a.schedule_id,
            game_b.field_id,
            &game_b.window,
            &[a, b],
        )?;
        inner.game_placement_conflicts(
            game_b.schedule_id,
            game_a.field_id,
            &game_a.window,
            &[a, b],
        )?;

        if let Some(game) = inner.schedule_games.get_mut(&a) {
            game.field_id = game_b.field_id;
            game.window = game_b.window;
        }
        if let Some(game) = inner.schedule_games.get_mut(&b) {
            game.field_id = game_a.field_id;
            game.window = game_a.window;
        }

        let now = Utc::now();
        let schedule_id = game_a.schedule_id;
        if let Some(schedule) = inner.schedules.get_mut(&schedule_id) {
            touch(schedule, now);
        }
        Ok(true)
    }

    async fn move_schedule_game(&self, id: i32, window: TimeWindow) -> StoreResult<()> {
        let mut inner = self.inner.write();
        let game = inner
            .schedule_games
            .get(&id)
            .cloned()
            .ok_or(StoreError::GameNotFound(id))?;

        inner.game_placement_conflicts(game.schedule_id, game.field_id, &window, &[id])?;

        if let Some(game) = inner.schedule_games.get_mut(&id) {
            game.window = window;
        }
        let now = Utc::now();
        if let Some(schedule) = inner.schedules.get_mut(&game.schedule_id) {
            touch(schedule, now);
        }
        Ok(())
    }

    async fn delete_schedule_game(&self, id: i32) -> StoreResult<()> {
        let mut inner = self.inner.write();
        let game = inner
            .schedule_games
            .remove(&id)
            .ok_or(StoreError::GameNotFound(id))?;
        let now = Utc::now();
        if let Some(schedule) = inner.schedules.get_mut(&game.schedule_id) {
            touch(schedule, now);
        }
        Ok(())
    }

    async fn reset(&self) -> StoreResult<()> {
        *self.inner.write() = Inner::default();
        Ok(())
    }
}
