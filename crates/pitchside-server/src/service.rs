//! The scheduling stream service.

use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use pitchside_proto::scheduling::{ScheduledInput, ScheduledOutput};
use pitchside_proto::Scheduler;
use tokio_stream::{Stream, StreamExt};
use tonic::{Request, Response, Status, Streaming};
use tracing::{info, warn};

use crate::auth::{bearer_token, Authenticator, Claims};
use crate::config::LimitsConfig;
use crate::convert;
use crate::usage::UsageHook;

/// The bidirectional scheduling service.
///
/// One task runs per active stream; the engine itself is synchronous, so
/// each input is scheduled inline between stream reads.
pub struct SchedulerService {
    authenticator: Arc<dyn Authenticator>,
    usage: Arc<dyn UsageHook>,
    limits: LimitsConfig,
    /// Last schedule call per subject, for the contractual cooldown.
    last_call: DashMap<String, Instant>,
}

impl SchedulerService {
    #[must_use]
    pub fn new(
        authenticator: Arc<dyn Authenticator>,
        usage: Arc<dyn UsageHook>,
        limits: LimitsConfig,
    ) -> Self {
        Self {
            authenticator,
            usage,
            limits,
            last_call: DashMap::new(),
        }
    }

    /// Enforces the minimum gap between schedule calls per subject.
    fn check_cooldown(&self, subject: &str) -> Result<(), Status> {
        let now = Instant::now();
        let cooldown = self.limits.cooldown();

        if let Some(last) = self.last_call.get(subject) {
            let elapsed = now.duration_since(*last);
            if elapsed < cooldown {
                let wait = cooldown - elapsed;
                return Err(Status::resource_exhausted(format!(
                    "schedule requests are limited to one per {}s; retry in {}s",
                    cooldown.as_secs(),
                    wait.as_secs().max(1),
                )));
            }
        }

        self.last_call.insert(subject.to_owned(), now);
        Ok(())
    }

    /// Authenticates a call: bearer token, claim validation, cooldown,
    /// and the best-effort usage increment.
    pub async fn authorize(
        &self,
        metadata: &tonic::metadata::MetadataMap,
    ) -> Result<Claims, Status> {
        let token = bearer_token(metadata)?;

        let claims = self
            .authenticator
            .authenticate(token)
            .await
            .map_err(|error| {
                warn!(%error, "rejected bearer token");
                Status::unauthenticated("invalid bearer token")
            })?;

        self.check_cooldown(&claims.sub)?;

        if let Err(error) = self.usage.record(&claims.sub).await {
            warn!(subject = %claims.sub, %error, "usage hook failed; continuing");
        }

        Ok(claims)
    }
}

type ResponseStream = Pin<Box<dyn Stream<Item = Result<ScheduledOutput, Status>> + Send + 'static>>;

#[tonic::async_trait]
impl Scheduler for SchedulerService {
    type ScheduleStream = ResponseStream;

    async fn schedule(
        &self,
        request: Request<Streaming<ScheduledInput>>,
    ) -> Result<Response<Self::ScheduleStream>, Status> {
        let claims = self.authorize(request.metadata()).await?;
        info!(subject = %claims.sub, "opened scheduling stream");

        let mut inbound = request.into_inner();
        let idle_timeout = self.limits.idle_timeout();
        let deadline = self.limits.deadline();

        let outbound = async_stream::try_stream! {
            let opened_at = Instant::now();

            loop {
                if opened_at.elapsed() >= deadline {
                    Err::<ScheduledOutput, Status>(Status::deadline_exceeded(
                        "stream deadline elapsed",
                    ))?;
                    break;
                }

                let item = match tokio::time::timeout(idle_timeout, inbound.next()).await {
                    Ok(item) => item,
                    Err(_) => {
                        Err::<ScheduledOutput, Status>(Status::deadline_exceeded(
                            "stream idle too long",
                        ))?;
                        break;
                    }
                };

                let Some(payload) = item else {
                    break;
                };
                let payload = payload?;
                let unique_id = payload.unique_id;

                let (schedule_request, field_index) = match convert::request_from_wire(&payload) {
                    Ok(converted) => converted,
                    Err(error) => {
                        // A malformed input aborts that input only; the
                        // stream stays open for the rest.
                        warn!(unique_id, %error, "rejecting malformed input");
                        continue;
                    }
                };

                info!(
                    unique_id,
                    fields = schedule_request.fields.len(),
                    teams = schedule_request.team_count(),
                    "received payload"
                );

                let started = Instant::now();
                match pitchside_engine::schedule(&schedule_request) {
                    Ok(result) => {
                        info!(
                            unique_id,
                            reservations = result.reservations.len(),
                            unplaced = result.unplaced_count(),
                            elapsed = ?started.elapsed(),
                            "scheduled payload"
                        );
                        yield convert::result_to_wire(result, &field_index);
                    }
                    Err(error) => {
                        warn!(unique_id, %error, "rejecting malformed input");
                    }
                }
            }
        };

        Ok(Response::new(Box::pin(outbound) as Self::ScheduleStream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthError;
    use crate::usage::{SchedulerUsage, UsageError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tonic::metadata::MetadataMap;

    /// Accepts `good-*` tokens, treating the rest of the token as the
    /// subject; everything else fails like an expired signature.
    struct StubAuth;

    #[async_trait]
    impl Authenticator for StubAuth {
        async fn authenticate(&self, token: &str) -> Result<Claims, AuthError> {
            match token.strip_prefix("good-") {
                Some(subject) => Ok(Claims {
                    sub: subject.to_owned(),
                    exp: u64::MAX,
                    iss: None,
                    aud: None,
                }),
                None => Err(AuthError::Jwt(
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature.into(),
                )),
            }
        }
    }

    #[derive(Default)]
    struct CountingUsage {
        calls: AtomicU32,
    }

    #[async_trait]
    impl UsageHook for CountingUsage {
        async fn record(&self, _subject: &str) -> Result<SchedulerUsage, UsageError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(SchedulerUsage::default())
        }
    }

    struct FailingUsage;

    #[async_trait]
    impl UsageHook for FailingUsage {
        async fn record(&self, _subject: &str) -> Result<SchedulerUsage, UsageError> {
            Err(UsageError::Request("sink offline".into()))
        }
    }

    fn service_with(usage: Arc<dyn UsageHook>, cooldown_ms: u64) -> SchedulerService {
        SchedulerService::new(
            Arc::new(StubAuth),
            usage,
            LimitsConfig {
                schedule_cooldown_ms: cooldown_ms,
                ..LimitsConfig::default()
            },
        )
    }

    fn metadata_with(token: &str) -> MetadataMap {
        let mut metadata = MetadataMap::new();
        metadata.insert(
            "authorization",
            format!("Bearer {token}").parse().unwrap(),
        );
        metadata
    }

    #[tokio::test]
    async fn expired_token_is_unauthenticated_and_unmetered() {
        let usage = Arc::new(CountingUsage::default());
        let service = service_with(usage.clone(), 0);

        let err = service
            .authorize(&metadata_with("expired"))
            .await
            .unwrap_err();

        assert_eq!(err.code(), tonic::Code::Unauthenticated);
        assert_eq!(usage.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn valid_token_is_metered_once() {
        let usage = Arc::new(CountingUsage::default());
        let service = service_with(usage.clone(), 0);

        let claims = service
            .authorize(&metadata_with("good-league-admin"))
            .await
            .unwrap();

        assert_eq!(claims.sub, "league-admin");
        assert_eq!(usage.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cooldown_rejects_rapid_repeat_calls() {
        let service = service_with(Arc::new(CountingUsage::default()), 60_000);

        service
            .authorize(&metadata_with("good-coach"))
            .await
            .unwrap();

        let err = service
            .authorize(&metadata_with("good-coach"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), tonic::Code::ResourceExhausted);

        // A different subject is unaffected.
        service
            .authorize(&metadata_with("good-other"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn usage_hook_failure_does_not_fail_the_call() {
        let service = service_with(Arc::new(FailingUsage), 0);

        let claims = service
            .authorize(&metadata_with("good-league-admin"))
            .await
            .unwrap();
        assert_eq!(claims.sub, "league-admin");
    }

    #[tokio::test]
    async fn missing_header_is_unauthenticated() {
        let service = service_with(Arc::new(CountingUsage::default()), 0);

        let err = service.authorize(&MetadataMap::new()).await.unwrap_err();
        assert_eq!(err.code(), tonic::Code::Unauthenticated);
    }
}
