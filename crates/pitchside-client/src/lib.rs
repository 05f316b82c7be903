//! Pitchside scheduling client.
//!
//! Everything the desktop shell calls to produce a schedule: the gRPC
//! stream client with its health probe, the environment-driven
//! configuration, and the orchestrator that chains analysis, payload
//! generation, the scheduling stream, and atomic persistence.

pub mod client;
pub mod config;
pub mod error;
pub mod orchestrator;

pub use client::{ScheduleClient, ScheduleTransport, ServerHealth};
pub use config::{ClientConfig, DEFAULT_SCHEDULE_CREATION_DELAY_MS};
pub use error::{ClientError, OrchestratorError};
pub use orchestrator::{Orchestrator, RunOptions, RunOutcome, UnplacedDiagnostic};
