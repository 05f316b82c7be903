//! Engine errors.

use thiserror::Error;

/// Fatal per-input failures. A malformed input aborts that input only;
/// the surrounding stream stays open.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A team id appears twice within one collection.
    #[error("malformed input: team {team} appears twice in collection {collection}")]
    DuplicateTeam { team: i32, collection: usize },

    /// A slot whose end does not come after its start.
    #[error("malformed input: slot on field {field} has end {end} <= start {start}")]
    InvalidSlot { field: i32, start: i64, end: i64 },
}

pub type Result<T> = std::result::Result<T, EngineError>;
