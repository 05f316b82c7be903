//! Store error taxonomy.

use pitchside_core::{CalendarError, NameError, ProfileNameError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by the entity store facade.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreError {
    #[error(transparent)]
    Name(#[from] NameError),

    #[error(transparent)]
    Calendar(#[from] CalendarError),

    #[error(transparent)]
    ProfileName(#[from] ProfileNameError),

    #[error("a profile with this name already exists")]
    DuplicateProfile,

    #[error("profile `{0}` not found")]
    ProfileNotFound(String),

    #[error("the default profile cannot be renamed or deleted")]
    DefaultProfileImmutable,

    #[error("the active profile cannot be deleted")]
    ActiveProfileInUse,

    #[error("this tag already exists")]
    DuplicateTag,

    #[error("region with id {0} not found")]
    RegionNotFound(i32),

    #[error("field with id {0} not found")]
    FieldNotFound(i32),

    #[error("team with id {0} not found")]
    TeamNotFound(i32),

    #[error("the following groups do not exist: {0:?}")]
    MissingGroups(Vec<i32>),

    #[error("group with id {0} not found")]
    GroupNotFound(i32),

    #[error("target with id {0} not found")]
    TargetNotFound(i32),

    #[error("the supplied reservation type id ({0}) does not exist")]
    ReservationTypeNotFound(i32),

    #[error("concurrency {0} is out of bounds (1..=8)")]
    ConcurrencyOutOfBounds(u8),

    #[error("coach conflict with id {0} not found")]
    CoachConflictNotFound(i32),

    #[error("team and coach conflict belong to different regions")]
    RegionMismatch,

    #[error("schedule with id {0} not found")]
    ScheduleNotFound(i32),

    #[error("schedule game with id {0} not found")]
    GameNotFound(i32),

    #[error("slots {0} and {1} belong to different fields")]
    FieldMismatch(i32, i32),
}

pub type StoreResult<T> = Result<T, StoreError>;
