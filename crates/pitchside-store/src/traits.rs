//! The entity store facade.
//!
//! A narrow, testable contract over the persistence layer. The in-memory
//! implementation in this crate backs tests and profile isolation; a
//! SQL-backed implementation lives behind the same trait in the
//! deployment that owns the database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pitchside_core::{
    CoachConflict, Field, FieldId, GroupId, Region, RegionId, ReservationType, ReservationTypeId,
    Schedule, ScheduleGame, ScheduleId, SlotId, Target, TargetId, Team, TeamGroup, TeamId,
    TimeSlot, TimeWindow,
};

use crate::error::StoreResult;
use crate::inputs::{
    CoachConflictTeamOp, CopyTimeSlots, CreateCoachConflict, CreateField, CreateRegion,
    CreateReservationType, CreateTeam, CreateTimeSlot, EditRegion, EditReservationType,
    EditSchedule, EditTeam, MoveTimeSlot, NewScheduleGame, TargetGroupOp,
};

/// CRUD over the scheduling domain.
///
/// Mutations validate their inputs before writing and never leave partial
/// state behind on error.
#[async_trait]
pub trait EntityStore: Send + Sync {
    // Regions

    async fn list_regions(&self) -> StoreResult<Vec<Region>>;
    async fn get_region(&self, id: RegionId) -> StoreResult<Region>;
    async fn create_region(&self, input: CreateRegion) -> StoreResult<Region>;
    async fn edit_region(&self, input: EditRegion) -> StoreResult<Region>;
    /// Deleting a region cascades to its fields, slots, and teams.
    async fn delete_region(&self, id: RegionId) -> StoreResult<()>;

    // Fields

    async fn list_fields(&self, region_id: RegionId) -> StoreResult<Vec<Field>>;
    async fn create_field(&self, input: CreateField) -> StoreResult<Field>;
    async fn delete_field(&self, id: FieldId) -> StoreResult<()>;

    // Team groups

    async fn list_groups(&self) -> StoreResult<Vec<TeamGroup>>;
    /// Group names are lowercased; duplicates fail with `DuplicateTag`.
    async fn create_group(&self, tag: String) -> StoreResult<TeamGroup>;
    async fn delete_group(&self, id: GroupId) -> StoreResult<()>;

    // Teams

    async fn list_teams(&self, region_id: RegionId) -> StoreResult<Vec<Team>>;
    async fn list_all_teams(&self) -> StoreResult<Vec<Team>>;
    async fn get_team(&self, id: TeamId) -> StoreResult<Team>;
    async fn create_team(&self, input: CreateTeam) -> StoreResult<Team>;
    async fn edit_team(&self, input: EditTeam) -> StoreResult<Team>;
    async fn delete_team(&self, id: TeamId) -> StoreResult<()>;

    // Reservation types and concurrency

    async fn list_reservation_types(&self) -> StoreResult<Vec<ReservationType>>;
    async fn get_reservation_type(&self, id: ReservationTypeId) -> StoreResult<ReservationType>;
    async fn create_reservation_type(
        &self,
        input: CreateReservationType,
    ) -> StoreResult<ReservationType>;
    async fn edit_reservation_type(
        &self,
        input: EditReservationType,
    ) -> StoreResult<ReservationType>;
    async fn delete_reservation_type(&self, id: ReservationTypeId) -> StoreResult<()>;

    /// Effective concurrency for a (field, reservation type) pair:
    /// override if present, else the type's default.
    async fn capacity(
        &self,
        field_id: FieldId,
        reservation_type_id: ReservationTypeId,
    ) -> StoreResult<u8>;
    /// Sets or clears (with `None`) a per-field concurrency override.
    async fn set_concurrency_override(
        &self,
        field_id: FieldId,
        reservation_type_id: ReservationTypeId,
        concurrency: Option<u8>,
    ) -> StoreResult<()>;
    /// All overrides that differ from the type defaults.
    async fn list_concurrency_overrides(
        &self,
    ) -> StoreResult<Vec<(FieldId, ReservationTypeId, u8)>>;

    // Time slots

    /// Slots of a field, optionally restricted to those overlapping a
    /// window.
    async fn list_time_slots(
        &self,
        field_id: FieldId,
        window: Option<TimeWindow>,
    ) -> StoreResult<Vec<TimeSlot>>;
    /// Slots across all fields overlapping the window.
    async fn list_time_slots_between(&self, window: TimeWindow) -> StoreResult<Vec<TimeSlot>>;
    async fn create_time_slot(&self, input: CreateTimeSlot) -> StoreResult<TimeSlot>;
    async fn move_time_slot(&self, input: MoveTimeSlot) -> StoreResult<()>;
    async fn delete_time_slot(&self, id: SlotId) -> StoreResult<()>;
    /// Transactional batch copy; see the calendar algebra for semantics.
    async fn copy_time_slots(&self, input: CopyTimeSlots) -> StoreResult<Vec<TimeSlot>>;
    /// Deletes every slot of one field whose id lies in the inclusive
    /// range. Returns the number removed.
    async fn delete_time_slots(&self, first_id: SlotId, last_id: SlotId) -> StoreResult<usize>;

    // Targets

    async fn list_targets(&self) -> StoreResult<Vec<Target>>;
    async fn create_target(&self) -> StoreResult<Target>;
    async fn target_group_op(&self, input: TargetGroupOp) -> StoreResult<Target>;
    async fn set_target_reservation_type(
        &self,
        target_id: TargetId,
        reservation_type_id: Option<ReservationTypeId>,
    ) -> StoreResult<Target>;
    async fn delete_target(&self, id: TargetId) -> StoreResult<()>;

    // Coach conflicts

    /// Conflicts of one region, or all of them.
    async fn list_coach_conflicts(
        &self,
        region_id: Option<RegionId>,
    ) -> StoreResult<Vec<CoachConflict>>;
    async fn create_coach_conflict(
        &self,
        input: CreateCoachConflict,
    ) -> StoreResult<CoachConflict>;
    async fn rename_coach_conflict(&self, id: i32, coach_name: String) -> StoreResult<()>;
    /// Adding a team whose region differs from the conflict's fails with
    /// `RegionMismatch`; redundant adds and removes are no-ops.
    async fn coach_conflict_team_op(&self, input: CoachConflictTeamOp) -> StoreResult<()>;
    async fn delete_coach_conflict(&self, id: i32) -> StoreResult<()>;

    // Schedules

    /// Persists a generated schedule and its games atomically.
    async fn save_schedule(&self, games: Vec<NewScheduleGame>) -> StoreResult<Schedule>;
    async fn list_schedules(&self) -> StoreResult<Vec<Schedule>>;
    async fn get_schedule(&self, id: ScheduleId) -> StoreResult<Schedule>;
    async fn edit_schedule(&self, input: EditSchedule) -> StoreResult<Schedule>;
    async fn delete_schedule(&self, id: ScheduleId) -> StoreResult<()>;
    async fn list_schedule_games(&self, schedule_id: ScheduleId) -> StoreResult<Vec<ScheduleGame>>;
    /// Swaps the placements (field and window) of two games after
    /// checking both landing spots for conflicts.
    async fn swap_schedule_games(&self, a: i32, b: i32) -> StoreResult<bool>;
    async fn move_schedule_game(
        &self,
        id: i32,
        window: TimeWindow,
    ) -> StoreResult<()>;
    async fn delete_schedule_game(&self, id: i32) -> StoreResult<()>;

    /// Wipes every entity. Exposed only behind the dev-tools flag.
    async fn reset(&self) -> StoreResult<()>;
}

/// Helper for implementations: refresh a schedule's `last_edit` stamp.
pub(crate) fn touch(schedule: &mut Schedule, now: DateTime<Utc>) {
    schedule.last_edit = now;
}
