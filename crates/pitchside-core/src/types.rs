//! Domain entities.
//!
//! Plain data carried between the store facade, the analyzer, and the
//! orchestrator. Wire representations live in `pitchside-proto`; these
//! types use signed ids like the persisted records they mirror.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::window::TimeWindow;

pub type RegionId = i32;
pub type FieldId = i32;
pub type TeamId = i32;
pub type GroupId = i32;
pub type ReservationTypeId = i32;
pub type SlotId = i32;
pub type TargetId = i32;
pub type ScheduleId = i32;

/// A geographic region owning fields and teams.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub id: RegionId,
    pub title: String,
}

/// A playing field within a region.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub id: FieldId,
    pub name: String,
    pub region_id: RegionId,
}

/// A tag grouping teams (age bracket, division, ...).
///
/// Names are normalized to lowercase and unique case-insensitively.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TeamGroup {
    pub id: GroupId,
    pub name: String,
    /// Number of teams carrying this tag.
    pub usage: u32,
}

/// A team with its region and group memberships.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub region_id: RegionId,
    /// Sorted group ids; a team has zero or more groups.
    pub group_ids: Vec<GroupId>,
}

impl Team {
    /// True if this team carries every group in `required`.
    #[must_use]
    pub fn has_all_groups(&self, required: &[GroupId]) -> bool {
        required.iter().all(|g| self.group_ids.contains(g))
    }
}

/// A classification of field usage carrying scheduling defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationType {
    pub id: ReservationTypeId,
    pub name: String,
    pub color: String,
    /// Default concurrent reservations per slot, 1..=8.
    pub default_concurrency: u8,
    pub is_practice: bool,
    pub description: Option<String>,
}

/// A bookable interval on a field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: SlotId,
    pub field_id: FieldId,
    pub reservation_type_id: ReservationTypeId,
    pub window: TimeWindow,
}

/// A scheduling target: the subset of teams selected by a group set,
/// optionally restricted to one reservation type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub id: TargetId,
    /// Ordered set of required group ids; empty targets are reported and
    /// skipped by the analyzer.
    pub group_ids: Vec<GroupId>,
    /// `None` means any reservation type.
    pub reservation_type_id: Option<ReservationTypeId>,
}

/// Teams within one region that share a coach and must not play at
/// overlapping times.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoachConflict {
    pub id: i32,
    pub region_id: RegionId,
    pub coach_name: Option<String>,
    pub team_ids: Vec<TeamId>,
}

/// Season phase for payload generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeasonPhase {
    Normal,
    Post,
}

/// A saved schedule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: ScheduleId,
    pub name: String,
    pub created: DateTime<Utc>,
    pub last_edit: DateTime<Utc>,
}

/// One game row belonging to a saved schedule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleGame {
    pub id: i32,
    pub schedule_id: ScheduleId,
    pub field_id: FieldId,
    pub window: TimeWindow,
    pub home_team: Option<TeamId>,
    pub away_team: Option<TeamId>,
}
