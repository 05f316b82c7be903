//! Pitchside pre-schedule analysis and payload generation.
//!
//! Two pieces sit in this crate, sharing one store snapshot:
//!
//! - The **analyzer** builds a [`PreScheduleReport`]: supply versus
//!   demand per target, duplicate and empty and impossible targets, and
//!   the totals the client shows before committing to a schedule run.
//! - The **payload builder** converts the surviving targets into wire
//!   [`ScheduledInput`](pitchside_proto::ScheduledInput)s, one per
//!   target and season phase, with slot consumption tracked across
//!   phases.

pub mod context;
pub mod error;
pub mod payload;
pub mod report;
pub mod tally;

pub use context::{AnalysisContext, SlotSupply};
pub use error::{ReportError, ReportResult};
pub use payload::{Payload, PayloadBuilder, PayloadOptions};
pub use report::{DuplicateEntry, PreScheduleReport, ReportInput, SupplyRequireEntry};
pub use tally::{choose_two, RegionTally};
