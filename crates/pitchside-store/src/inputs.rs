//! Mutation input types.
//!
//! Each input validates itself before the store touches any state, so a
//! failed mutation never leaves partial writes behind.

use chrono::{DateTime, Utc};
use pitchside_core::{
    validate_name, FieldId, GroupId, RegionId, ReservationTypeId, SlotId, TargetId, TeamId,
    TimeWindow, MAX_GAMES_PER_FIELD_TYPE, MIN_GAMES_PER_FIELD_TYPE,
};
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

fn check_concurrency(value: u8) -> StoreResult<()> {
    if (MIN_GAMES_PER_FIELD_TYPE..=MAX_GAMES_PER_FIELD_TYPE).contains(&value) {
        Ok(())
    } else {
        Err(StoreError::ConcurrencyOutOfBounds(value))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRegion {
    pub title: String,
}

impl CreateRegion {
    pub fn validate(&self) -> StoreResult<()> {
        validate_name(&self.title)?;
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditRegion {
    pub id: RegionId,
    pub title: Option<String>,
}

impl EditRegion {
    pub fn validate(&self) -> StoreResult<()> {
        if let Some(title) = &self.title {
            validate_name(title)?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateField {
    pub name: String,
    pub region_id: RegionId,
}

impl CreateField {
    pub fn validate(&self) -> StoreResult<()> {
        validate_name(&self.name)?;
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTeam {
    pub name: String,
    pub region_id: RegionId,
    pub group_ids: Vec<GroupId>,
}

impl CreateTeam {
    pub fn validate(&self) -> StoreResult<()> {
        validate_name(&self.name)?;
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditTeam {
    pub id: TeamId,
    pub name: Option<String>,
    /// Full replacement of the team's group memberships.
    pub group_ids: Option<Vec<GroupId>>,
}

impl EditTeam {
    pub fn validate(&self) -> StoreResult<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateReservationType {
    pub name: String,
    pub color: String,
    pub description: Option<String>,
    pub default_concurrency: u8,
    pub is_practice: bool,
}

impl CreateReservationType {
    pub fn validate(&self) -> StoreResult<()> {
        validate_name(&self.name)?;
        check_concurrency(self.default_concurrency)?;
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditReservationType {
    pub id: ReservationTypeId,
    pub name: Option<String>,
    pub color: Option<String>,
    /// `Some(None)` clears the description.
    pub description: Option<Option<String>>,
    pub default_concurrency: Option<u8>,
    pub is_practice: Option<bool>,
}

impl EditReservationType {
    pub fn validate(&self) -> StoreResult<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(concurrency) = self.default_concurrency {
            check_concurrency(concurrency)?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTimeSlot {
    pub field_id: FieldId,
    pub reservation_type_id: ReservationTypeId,
    pub window: TimeWindow,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveTimeSlot {
    pub id: SlotId,
    pub window: TimeWindow,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyTimeSlots {
    pub first_id: SlotId,
    pub last_id: SlotId,
    pub dst_start: DateTime<Utc>,
}

/// Add or remove a membership association.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MembershipOp {
    Add,
    Remove,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetGroupOp {
    pub target_id: TargetId,
    pub group_id: GroupId,
    pub op: MembershipOp,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCoachConflict {
    pub region_id: RegionId,
    pub coach_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoachConflictTeamOp {
    pub coach_conflict_id: i32,
    pub team_id: TeamId,
    pub op: MembershipOp,
}

/// One game row to persist when saving a schedule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewScheduleGame {
    pub field_id: FieldId,
    pub window: TimeWindow,
    pub home_team: Option<TeamId>,
    pub away_team: Option<TeamId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditSchedule {
    pub id: i32,
    pub name: Option<String>,
}

impl EditSchedule {
    pub fn validate(&self) -> StoreResult<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitchside_core::NameError;

    #[test]
    fn region_title_is_validated() {
        assert!(CreateRegion {
            title: "North".into()
        }
        .validate()
        .is_ok());

        assert_eq!(
            CreateRegion { title: "  ".into() }.validate(),
            Err(StoreError::Name(NameError::EmptyName))
        );
    }

    #[test]
    fn concurrency_bounds_are_enforced() {
        let mut input = CreateReservationType {
            name: "u10".into(),
            color: "#aabbcc".into(),
            description: None,
            default_concurrency: 8,
            is_practice: false,
        };
        assert!(input.validate().is_ok());

        input.default_concurrency = 0;
        assert_eq!(
            input.validate(),
            Err(StoreError::ConcurrencyOutOfBounds(0))
        );

        input.default_concurrency = 9;
        assert_eq!(
            input.validate(),
            Err(StoreError::ConcurrencyOutOfBounds(9))
        );
    }
}
