//! Error types shared across the workspace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::SlotId;

/// Errors building a time window.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowError {
    /// The interval has zero duration.
    #[error("time window has zero duration")]
    ZeroDuration,

    /// The end instant precedes the start instant.
    #[error("time window ends before it starts")]
    EndBeforeStart,
}

/// Errors from calendar operations on a field's slot set.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalendarError {
    /// The requested interval collides with an existing slot.
    #[error("this time slot is booked from {o_start} to {o_end}")]
    Overlap {
        o_start: DateTime<Utc>,
        o_end: DateTime<Utc>,
    },

    /// Invalid interval.
    #[error(transparent)]
    Window(#[from] WindowError),

    /// No slot with this id exists on the field.
    #[error("time slot {0} not found")]
    SlotNotFound(SlotId),

    /// A batch range's first slot starts after its last slot.
    #[error("range is out of order: first slot starts at {first_start}, last at {last_start}")]
    OutOfOrder {
        first_start: DateTime<Utc>,
        last_start: DateTime<Utc>,
    },
}

/// Name validation failures for entities with a 1-64 character name.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NameError {
    #[error("name cannot be empty")]
    EmptyName,
    #[error("name is {len} characters which is larger than the max, 64")]
    NameTooLong { len: usize },
}

/// Profile name validation failures.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProfileNameError {
    #[error("profile names are 1-64 characters of letters, digits, `_`, `-`, and spaces")]
    InvalidProfileName,
}
