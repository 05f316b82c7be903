//! Usage metering hook.
//!
//! The counter sink is an external collaborator; the service issues one
//! best-effort increment per authenticated call, keyed by the token's
//! subject. Hook failures are logged and never fail the call.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum UsageError {
    #[error("usage endpoint request failed: {0}")]
    Request(String),
}

/// Aggregate usage as reported by the counter sink.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SchedulerUsage {
    pub runs: u32,
}

/// The counter sink contract.
#[async_trait]
pub trait UsageHook: Send + Sync {
    async fn record(&self, subject: &str) -> Result<SchedulerUsage, UsageError>;
}

/// HTTP counter sink.
pub struct HttpUsageHook {
    endpoint: String,
    http: reqwest::Client,
}

impl HttpUsageHook {
    #[must_use]
    pub fn new(endpoint: String) -> Self {
        Self {
            endpoint,
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl UsageHook for HttpUsageHook {
    async fn record(&self, subject: &str) -> Result<SchedulerUsage, UsageError> {
        let usage: SchedulerUsage = self
            .http
            .get(format!("{}?sub={subject}", self.endpoint))
            .send()
            .await
            .map_err(|e| UsageError::Request(e.to_string()))?
            .json()
            .await
            .map_err(|e| UsageError::Request(e.to_string()))?;

        info!(subject, runs = usage.runs, "recorded scheduler usage");
        Ok(usage)
    }
}

/// Disabled metering.
pub struct NoopUsageHook;

#[async_trait]
impl UsageHook for NoopUsageHook {
    async fn record(&self, _subject: &str) -> Result<SchedulerUsage, UsageError> {
        Ok(SchedulerUsage::default())
    }
}
