//! Bearer token identity resolution.
//!
//! Tokens are HS256 JWTs minted by the login service with a shared secret.
//! Resolution never fails loudly: anything short of a valid, unexpired token
//! simply yields no identity.

use axum::http::{HeaderMap, header::AUTHORIZATION};
use chrono::{Duration, Utc};
use engine::UserId;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Token lifetime used when none is configured.
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 60;

#[derive(Clone, Debug)]
pub struct IdentityConfig {
    pub secret: String,
    pub token_ttl_minutes: i64,
}

impl IdentityConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            token_ttl_minutes: DEFAULT_TOKEN_TTL_MINUTES,
        }
    }
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("failed to encode token: {0}")]
    Encoding(String),
    #[error("failed to decode token: {0}")]
    Decoding(String),
    #[error("token has expired")]
    Expired,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

/// Turns request credentials into a [`UserId`].
#[derive(Clone)]
pub struct IdentityGate {
    config: IdentityConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for IdentityGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityGate")
            .field("token_ttl_minutes", &self.config.token_ttl_minutes)
            .field("secret", &"[hidden]")
            .finish()
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

impl IdentityGate {
    #[must_use]
    pub fn new(config: IdentityConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Mints a token for `user_id` valid for the configured lifetime.
    pub fn issue(&self, user_id: UserId, email: Option<&str>) -> Result<String, IdentityError> {
        let now = Utc::now();
        let claims = Claims {
            user_id,
            email: email.map(ToString::to_string),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(self.config.token_ttl_minutes)).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|err| IdentityError::Encoding(err.to_string()))
    }

    /// Validates a raw token and returns its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, IdentityError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => IdentityError::Expired,
                _ => IdentityError::Decoding(err.to_string()),
            })
    }

    /// Resolves the caller from an `Authorization: Bearer` header.
    pub fn resolve(&self, headers: &HeaderMap) -> Option<UserId> {
        let token = bearer_token(headers)?;
        match self.verify(token) {
            Ok(claims) => Some(claims.user_id),
            Err(err) => {
                tracing::debug!("rejected bearer token: {err}");
                None
            }
        }
    }
}
