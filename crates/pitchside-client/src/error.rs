//! Client-side errors.

use pitchside_report::{PreScheduleReport, ReportError};
use pitchside_store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("missing required configuration: {0}")]
    MissingConfig(&'static str),

    #[error("could not establish a channel with the scheduler: {0}")]
    Connect(String),

    #[error("scheduling rpc failed: {0}")]
    Rpc(#[from] tonic::Status),

    #[error("could not probe: service not found or unavailable: {0}")]
    ProbeFail(String),
}

#[derive(Error, Debug)]
pub enum OrchestratorError {
    /// The client-side cooldown has not elapsed yet.
    #[error("a schedule was generated recently; retry in {remaining_ms} ms")]
    CooldownActive { remaining_ms: u64 },

    /// The analyzer found blocking misconfigurations; the report has the
    /// details.
    #[error("pre-schedule analysis found blocking problems")]
    Preflight(Box<PreScheduleReport>),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Client(#[from] ClientError),

    /// The stream returned a reservation the store cannot hold.
    #[error("malformed reservation in stream response: {0}")]
    MalformedReservation(String),
}
