//! Report errors.

use pitchside_store::StoreError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    /// Reading the snapshot from the store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// `matches_to_play` outside `1..=7`.
    #[error("matches to play must be within 1..=7, got {0}")]
    MatchesOutOfBounds(u8),

    /// A store id that cannot be represented as an unsigned wire id.
    #[error("id {0} cannot be represented on the wire")]
    IdOutOfRange(i32),
}

pub type ReportResult<T> = Result<T, ReportError>;
