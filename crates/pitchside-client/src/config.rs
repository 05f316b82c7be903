//! Client configuration from the environment.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::error::ClientError;

/// Default client-side gap between schedule runs, in milliseconds.
pub const DEFAULT_SCHEDULE_CREATION_DELAY_MS: u64 = 30_000;

/// Environment-driven client settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// `SCHEDULER_SERVER_URL`: the gRPC endpoint.
    pub scheduler_url: String,
    /// `AUTH_SERVER_URL`: issuer base URL for token acquisition.
    pub auth_server_url: Option<String>,
    /// `PUBLIC_<NAME>_CLIENT_ID` variables, keyed by `<NAME>`.
    pub client_ids: BTreeMap<String, String>,
    /// `HAS_DB_RESET_BUTTON`: expose the destructive dev-only reset.
    pub has_db_reset_button: bool,
    /// `SCHEDULE_CREATION_DELAY` in milliseconds.
    pub schedule_creation_delay: Duration,
}

impl ClientConfig {
    /// Reads the recognized environment variables.
    pub fn from_env() -> Result<Self, ClientError> {
        let scheduler_url = std::env::var("SCHEDULER_SERVER_URL")
            .map_err(|_| ClientError::MissingConfig("SCHEDULER_SERVER_URL"))?;

        let auth_server_url = std::env::var("AUTH_SERVER_URL").ok();

        let client_ids = std::env::vars()
            .filter_map(|(key, value)| {
                let name = key.strip_prefix("PUBLIC_")?.strip_suffix("_CLIENT_ID")?;
                if name.is_empty() {
                    None
                } else {
                    Some((name.to_owned(), value))
                }
            })
            .collect();

        let has_db_reset_button = std::env::var("HAS_DB_RESET_BUTTON")
            .map(|v| matches!(v.trim(), "1" | "true" | "TRUE" | "yes"))
            .unwrap_or(false);

        let delay_ms = std::env::var("SCHEDULE_CREATION_DELAY")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_SCHEDULE_CREATION_DELAY_MS);

        Ok(Self {
            scheduler_url,
            auth_server_url,
            client_ids,
            has_db_reset_button,
            schedule_creation_delay: Duration::from_millis(delay_ms),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_round_trip() {
        std::env::set_var("SCHEDULER_SERVER_URL", "https://sched.example:443");
        std::env::set_var("AUTH_SERVER_URL", "https://auth.example");
        std::env::set_var("PUBLIC_DESKTOP_CLIENT_ID", "desktop-123");
        std::env::set_var("HAS_DB_RESET_BUTTON", "true");
        std::env::set_var("SCHEDULE_CREATION_DELAY", "45000");

        let config = ClientConfig::from_env().unwrap();
        assert_eq!(config.scheduler_url, "https://sched.example:443");
        assert_eq!(
            config.auth_server_url.as_deref(),
            Some("https://auth.example")
        );
        assert_eq!(
            config.client_ids.get("DESKTOP").map(String::as_str),
            Some("desktop-123")
        );
        assert!(config.has_db_reset_button);
        assert_eq!(config.schedule_creation_delay, Duration::from_millis(45_000));

        std::env::remove_var("SCHEDULE_CREATION_DELAY");
        let config = ClientConfig::from_env().unwrap();
        assert_eq!(
            config.schedule_creation_delay,
            Duration::from_millis(DEFAULT_SCHEDULE_CREATION_DELAY_MS)
        );
    }
}
