//! The scheduling stream client and health probe.

use std::time::Duration;

use async_trait::async_trait;
use pitchside_proto::scheduling::{ScheduledInput, ScheduledOutput};
use pitchside_proto::{SchedulerClient, SCHEDULER_SERVICE_NAME};
use serde::{Deserialize, Serialize};
use tokio_stream::StreamExt;
use tonic::transport::Channel;
use tracing::info;

use crate::error::ClientError;

/// Health probe deadline.
const HEALTH_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Scheduler health as reported by the application-layer health check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServerHealth {
    Unknown,
    Serving,
    NotServing,
}

/// Anything that can carry scheduling inputs to a scheduler and return
/// its outputs. Implemented by the gRPC client; tests substitute stubs.
#[async_trait]
pub trait ScheduleTransport: Send + Sync {
    async fn schedule(
        &self,
        inputs: Vec<ScheduledInput>,
        authorization_token: &str,
    ) -> Result<Vec<ScheduledOutput>, ClientError>;
}

/// gRPC client for the hosted scheduler.
#[derive(Clone, Debug)]
pub struct ScheduleClient {
    endpoint: String,
}

impl ScheduleClient {
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    async fn connect(&self) -> Result<Channel, ClientError> {
        Channel::from_shared(self.endpoint.clone())
            .map_err(|e| ClientError::Connect(e.to_string()))?
            .connect()
            .await
            .map_err(|e| ClientError::Connect(e.to_string()))
    }

    /// Probes the scheduler's health service, bounded by a two-second
    /// deadline.
    pub async fn health_probe(&self) -> Result<ServerHealth, ClientError> {
        let probe = async {
            let channel = self.connect().await?;
            let mut health = tonic_health::pb::health_client::HealthClient::new(channel);

            let response = health
                .check(tonic_health::pb::HealthCheckRequest {
                    service: SCHEDULER_SERVICE_NAME.to_owned(),
                })
                .await
                .map_err(|e| ClientError::ProbeFail(e.to_string()))?;

            Ok(match response.into_inner().status {
                1 => ServerHealth::Serving,
                2 => ServerHealth::NotServing,
                _ => ServerHealth::Unknown,
            })
        };

        match tokio::time::timeout(HEALTH_PROBE_TIMEOUT, probe).await {
            Ok(result) => result,
            Err(_) => Err(ClientError::ProbeFail("probe timed out".to_owned())),
        }
    }
}

#[async_trait]
impl ScheduleTransport for ScheduleClient {
    /// Sends every input over one stream and collects the outputs.
    async fn schedule(
        &self,
        inputs: Vec<ScheduledInput>,
        authorization_token: &str,
    ) -> Result<Vec<ScheduledOutput>, ClientError> {
        let channel = self.connect().await?;
        let mut client = SchedulerClient::new(channel);

        let expected = inputs.len();
        let outbound = async_stream::stream! {
            for input in inputs {
                yield input;
            }
        };

        let mut request = tonic::Request::new(outbound);
        request.metadata_mut().insert(
            "authorization",
            format!("Bearer {authorization_token}")
                .parse()
                .map_err(|_| ClientError::Connect("bearer token is not valid metadata".into()))?,
        );

        let mut inbound = client.schedule(request).await?.into_inner();

        let mut outputs = Vec::with_capacity(expected);
        while let Some(output) = inbound.next().await {
            outputs.push(output?);
        }

        info!(
            sent = expected,
            received = outputs.len(),
            "scheduling stream complete"
        );
        Ok(outputs)
    }
}
