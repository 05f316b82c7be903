//! Pitchside scheduling server.
//!
//! Serves the bidirectional `Schedule` stream over gRPC with TLS,
//! validating every call against the configured token issuer and
//! metering usage per authenticated subject. The engine runs inline on
//! each stream's task; the service layer only handles transport,
//! authentication, pacing, and conversion.

pub mod auth;
pub mod config;
pub mod convert;
pub mod service;
pub mod usage;

pub use auth::{Authenticator, Claims, TokenValidator};
pub use config::ServerConfig;
pub use service::SchedulerService;
pub use usage::{HttpUsageHook, NoopUsageHook, UsageHook};
