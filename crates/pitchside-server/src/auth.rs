//! Bearer-token validation against the configured issuer.
//!
//! Tokens are RS256 JWTs. Signing keys come from the issuer's JWKS
//! endpoint and are cached behind a read-mostly lock shared by every
//! stream; the whole key set is replaced atomically on refresh, never
//! patched in place. An unknown `kid` forces an early refresh so key
//! rotation does not strand clients until the TTL expires.

use std::collections::HashMap;
use std::time::Instant;

use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::config::AuthConfig;

/// Claims the service relies on after validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// The billing key.
    pub sub: String,
    pub exp: u64,
    #[serde(default)]
    pub iss: Option<String>,
    #[serde(default)]
    pub aud: Option<String>,
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("token has no `kid` header")]
    MissingKeyId,

    #[error("expected RS256, got {0:?}")]
    WrongAlgorithm(Algorithm),

    #[error("no signing key with id `{0}` at the issuer")]
    UnknownKeyId(String),

    #[error("could not fetch signing keys: {0}")]
    KeyFetch(String),

    #[error("token has an empty subject")]
    EmptySubject,

    #[error(transparent)]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

/// Anything that can turn a bearer token into validated claims.
///
/// The production implementation is [`TokenValidator`]; tests substitute
/// a stub so service behaviour can be exercised without an issuer.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, token: &str) -> Result<Claims, AuthError>;
}

/// One key from the issuer's JWKS document.
#[derive(Debug, Clone, Deserialize)]
struct Jwk {
    #[serde(default)]
    kid: Option<String>,
    kty: String,
    #[serde(default)]
    n: Option<String>,
    #[serde(default)]
    e: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct JwkSet {
    keys: Vec<Jwk>,
}

struct KeyCache {
    keys: HashMap<String, DecodingKey>,
    fetched_at: Option<Instant>,
}

/// JWKS-backed RS256 token validator.
pub struct TokenValidator {
    config: AuthConfig,
    http: reqwest::Client,
    cache: RwLock<KeyCache>,
}

impl TokenValidator {
    #[must_use]
    pub fn new(config: AuthConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
            cache: RwLock::new(KeyCache {
                keys: HashMap::new(),
                fetched_at: None,
            }),
        }
    }

    /// Builds the claim checks every token must pass.
    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);
        validation
    }

    /// Parses a JWKS document into decoding keys, ignoring entries that
    /// are not usable RSA keys.
    fn keys_from_jwks(set: &JwkSet) -> HashMap<String, DecodingKey> {
        let mut keys = HashMap::new();
        for jwk in &set.keys {
            let (Some(kid), Some(n), Some(e)) = (&jwk.kid, &jwk.n, &jwk.e) else {
                continue;
            };
            if jwk.kty != "RSA" {
                continue;
            }
            match DecodingKey::from_rsa_components(n, e) {
                Ok(key) => {
                    keys.insert(kid.clone(), key);
                }
                Err(error) => {
                    debug!(kid = %kid, %error, "skipping unusable JWKS entry");
                }
            }
        }
        keys
    }

    async fn refresh_keys(&self) -> Result<(), AuthError> {
        let endpoint = self.config.jwks_endpoint();
        let set: JwkSet = self
            .http
            .get(&endpoint)
            .send()
            .await
            .map_err(|e| AuthError::KeyFetch(e.to_string()))?
            .json()
            .await
            .map_err(|e| AuthError::KeyFetch(e.to_string()))?;

        let keys = Self::keys_from_jwks(&set);
        info!(endpoint = %endpoint, keys = keys.len(), "refreshed issuer signing keys");

        let mut cache = self.cache.write().await;
        cache.keys = keys;
        cache.fetched_at = Some(Instant::now());
        Ok(())
    }

    /// Fetches the decoding key for `kid`, refreshing the cache when it
    /// is stale or the key is unknown.
    async fn key_for(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        {
            let cache = self.cache.read().await;
            let fresh = cache
                .fetched_at
                .is_some_and(|at| at.elapsed() < self.config.key_cache_ttl());
            if fresh {
                if let Some(key) = cache.keys.get(kid) {
                    return Ok(key.clone());
                }
            }
        }

        self.refresh_keys().await?;

        let cache = self.cache.read().await;
        cache
            .keys
            .get(kid)
            .cloned()
            .ok_or_else(|| AuthError::UnknownKeyId(kid.to_owned()))
    }
}

#[async_trait]
impl Authenticator for TokenValidator {
    async fn authenticate(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token)?;

        if header.alg != Algorithm::RS256 {
            return Err(AuthError::WrongAlgorithm(header.alg));
        }
        let kid = header.kid.ok_or(AuthError::MissingKeyId)?;

        let key = self.key_for(&kid).await?;
        let data = decode::<Claims>(token, &key, &self.validation())?;

        if data.claims.sub.is_empty() {
            return Err(AuthError::EmptySubject);
        }
        Ok(data.claims)
    }
}

/// Pulls the bearer token out of request metadata.
pub fn bearer_token(metadata: &tonic::metadata::MetadataMap) -> Result<&str, tonic::Status> {
    let header = metadata
        .get("authorization")
        .ok_or_else(|| tonic::Status::unauthenticated("missing `authorization` header"))?;

    let value = header
        .to_str()
        .map_err(|_| tonic::Status::unauthenticated("`authorization` header is not valid text"))?;

    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("Bearer" | "bearer"), Some(token)) => Ok(token),
        _ => Err(tonic::Status::unauthenticated(
            "`authorization` header is not a bearer token",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonic::metadata::MetadataMap;

    #[test]
    fn bearer_extraction() {
        let mut metadata = MetadataMap::new();
        assert!(bearer_token(&metadata).is_err());

        metadata.insert("authorization", "Basic abc".parse().unwrap());
        assert!(bearer_token(&metadata).is_err());

        metadata.insert("authorization", "Bearer tok-123".parse().unwrap());
        assert_eq!(bearer_token(&metadata).unwrap(), "tok-123");

        metadata.insert("authorization", "bearer tok-456".parse().unwrap());
        assert_eq!(bearer_token(&metadata).unwrap(), "tok-456");
    }

    #[test]
    fn jwks_parsing_keeps_usable_rsa_keys() {
        let set: JwkSet = serde_json::from_value(serde_json::json!({
            "keys": [
                // A plausible RSA key; components are base64url.
                { "kid": "key-1", "kty": "RSA", "n": "u1SU1LfVLPHCozMxH2Mo4lgOEePzNm0tRgeLezV6ffAt0gunVTLw7onLRnrq0_IzW7yWR7QkrmBL7jTKEn5u-qKhbwKfBstIs-bMY2Zkp18gnTxKLxoS2tFczGkPLPgizskuemMghRniWaoLcyehkd3qqGElvW_VDL5AaWTg0nLVkjRo9z-40RQzuVaE8AkAFmxZzow3x-VJYKdjykkJ0iT9wCS0DRTXu269V264Vf_3jvredZiKRkgwlL9xNAwxXFg0x_XFw005UWVRIkdgcKWTjpBP2dPwVZ4WWC-9aGVd-Gyn1o0CLelf4rEjGoXbAAEgAqeGUxrcIlbjXfbcmw", "e": "AQAB" },
                // Not RSA: skipped.
                { "kid": "key-2", "kty": "EC" },
                // No kid: skipped.
                { "kty": "RSA", "n": "AQAB", "e": "AQAB" }
            ]
        }))
        .unwrap();

        let keys = TokenValidator::keys_from_jwks(&set);
        assert_eq!(keys.len(), 1);
        assert!(keys.contains_key("key-1"));
    }

    #[tokio::test]
    async fn garbage_tokens_are_rejected_without_key_fetch() {
        let validator = TokenValidator::new(AuthConfig {
            issuer: "https://issuer.example".into(),
            audience: "pitchside".into(),
            ..AuthConfig::default()
        });

        // Not a JWT at all: fails at header decoding, before any
        // network access.
        assert!(matches!(
            validator.authenticate("not-a-token").await,
            Err(AuthError::Jwt(_))
        ));
    }
}
