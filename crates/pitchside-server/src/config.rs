//! Server configuration.

use std::net::{IpAddr, Ipv6Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::Deserialize;

/// Upper bound on how long JWKS keys may be cached.
pub const MAX_KEY_CACHE_TTL_SECS: u64 = 3600;

/// Top-level server configuration.
///
/// Loaded from `pitchside.toml` merged with `PITCHSIDE_*` environment
/// variables (nested fields use a double underscore, e.g.
/// `PITCHSIDE_AUTH__ISSUER`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: ListenConfig,
    pub tls: TlsConfig,
    pub auth: AuthConfig,
    pub usage: UsageConfig,
    pub limits: LimitsConfig,
}

impl ServerConfig {
    /// Loads configuration from an optional TOML file and the
    /// environment.
    pub fn load(path: Option<&str>) -> Result<Self, figment::Error> {
        let mut figment = Figment::new();
        figment = match path {
            Some(path) => figment.merge(Toml::file(path)),
            None => figment.merge(Toml::file("pitchside.toml")),
        };

        let mut config: Self = figment
            .merge(Env::prefixed("PITCHSIDE_").split("__"))
            .extract()?;

        // The issuer base URL is also accepted through the variable the
        // desktop client uses.
        if config.auth.issuer.is_empty() {
            if let Ok(issuer) = std::env::var("AUTH_SERVER_URL") {
                config.auth.issuer = issuer;
            }
        }
        Ok(config)
    }

    /// Rejects configurations the server cannot start with.
    pub fn validate(&self) -> Result<(), String> {
        if self.auth.issuer.is_empty() {
            return Err("auth.issuer is required (or set AUTH_SERVER_URL)".to_owned());
        }
        if self.auth.audience.is_empty() {
            return Err("auth.audience is required".to_owned());
        }
        if self.tls.cert_path.is_some() != self.tls.key_path.is_some() {
            return Err("tls.cert_path and tls.key_path must be set together".to_owned());
        }
        Ok(())
    }
}

/// Listen address.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListenConfig {
    pub addr: SocketAddr,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 50051),
        }
    }
}

/// TLS identity. Both paths unset means plaintext, for local development
/// behind a terminating proxy.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TlsConfig {
    pub cert_path: Option<PathBuf>,
    pub key_path: Option<PathBuf>,
}

/// Bearer-token validation settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Expected `iss` claim and the base URL the JWKS is fetched from.
    pub issuer: String,
    /// Expected `aud` claim.
    pub audience: String,
    /// Explicit JWKS endpoint; derived from the issuer when unset.
    pub jwks_url: Option<String>,
    /// Signing-key cache lifetime in seconds, clamped to one hour.
    pub key_cache_ttl_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            issuer: String::new(),
            audience: String::new(),
            jwks_url: None,
            key_cache_ttl_secs: MAX_KEY_CACHE_TTL_SECS,
        }
    }
}

impl AuthConfig {
    /// The JWKS endpoint to fetch signing keys from.
    #[must_use]
    pub fn jwks_endpoint(&self) -> String {
        self.jwks_url.clone().unwrap_or_else(|| {
            format!(
                "{}/.well-known/jwks.json",
                self.issuer.trim_end_matches('/')
            )
        })
    }

    /// The key cache lifetime, never longer than one hour.
    #[must_use]
    pub fn key_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.key_cache_ttl_secs.min(MAX_KEY_CACHE_TTL_SECS))
    }
}

/// Usage-metering hook settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UsageConfig {
    /// Counter sink endpoint; unset disables metering.
    pub endpoint: Option<String>,
}

/// Stream pacing limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Minimum gap between schedule calls per subject, in milliseconds.
    pub schedule_cooldown_ms: u64,
    /// Maximum silence between stream messages, in seconds.
    pub stream_idle_timeout_secs: u64,
    /// Total stream deadline, in seconds.
    pub stream_deadline_secs: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            schedule_cooldown_ms: 30_000,
            stream_idle_timeout_secs: 120,
            stream_deadline_secs: 900,
        }
    }
}

impl LimitsConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.schedule_cooldown_ms)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.stream_idle_timeout_secs)
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.stream_deadline_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_usable_once_auth_is_set() {
        let mut config = ServerConfig::default();
        assert!(config.validate().is_err());

        config.auth.issuer = "https://issuer.example".into();
        config.auth.audience = "pitchside".into();
        assert!(config.validate().is_ok());

        assert_eq!(config.limits.cooldown(), Duration::from_secs(30));
        assert_eq!(config.limits.idle_timeout(), Duration::from_secs(120));
        assert_eq!(config.limits.deadline(), Duration::from_secs(900));
    }

    #[test]
    fn jwks_endpoint_derives_from_issuer() {
        let mut auth = AuthConfig {
            issuer: "https://issuer.example/".into(),
            ..AuthConfig::default()
        };
        assert_eq!(
            auth.jwks_endpoint(),
            "https://issuer.example/.well-known/jwks.json"
        );

        auth.jwks_url = Some("https://keys.example/jwks".into());
        assert_eq!(auth.jwks_endpoint(), "https://keys.example/jwks");
    }

    #[test]
    fn key_cache_ttl_is_clamped_to_an_hour() {
        let auth = AuthConfig {
            key_cache_ttl_secs: 86_400,
            ..AuthConfig::default()
        };
        assert_eq!(auth.key_cache_ttl(), Duration::from_secs(3600));
    }

    #[test]
    fn half_configured_tls_is_rejected() {
        let mut config = ServerConfig::default();
        config.auth.issuer = "https://issuer.example".into();
        config.auth.audience = "pitchside".into();
        config.tls.cert_path = Some("cert.pem".into());

        assert!(config.validate().is_err());
    }
}
