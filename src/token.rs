//! Session token issuance and validation.
//!
//! Tokens are HS256 JWTs carrying a closed, versioned claims record. Validation failures
//! of any kind collapse into the single [`TokenError::Invalid`] so callers cannot tell
//! an expired token from a forged one.

use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::Role;

/// Claims layout version. Tokens carrying any other value are rejected.
pub const CLAIMS_VERSION: u8 = 1;

/// SessionClaims
///
/// The verified payload of a session token. Unknown fields fail decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SessionClaims {
    pub ver: u8,
    pub user_id: Uuid,
    pub role: Role,
    pub tenant_id: Uuid,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

/// SessionIdentity
///
/// What the login path knows about a user when asking for a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionIdentity {
    pub user_id: Uuid,
    pub role: Role,
    pub tenant_id: Uuid,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("invalid session token")]
    Invalid,
    #[error("session token could not be signed: {0}")]
    Signing(String),
}

/// SessionTokenCodec
///
/// Built once at startup from the configured secret and TTL, then shared read-only by
/// every request task.
#[derive(Clone)]
pub struct SessionTokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for SessionTokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokenCodec")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl SessionTokenCodec {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        // Expiry is exact: a token one second past `exp` is as dead as a forged one.
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a token for `identity`, valid from now for the configured TTL.
    pub fn issue(&self, identity: SessionIdentity) -> Result<String, TokenError> {
        self.issue_at(identity, Utc::now())
    }

    /// Issues a token as if it had been created at `issued_at`.
    pub fn issue_at(
        &self,
        identity: SessionIdentity,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let ttl = chrono::Duration::from_std(self.ttl)
            .map_err(|e| TokenError::Signing(format!("ttl out of range: {e}")))?;

        let claims = SessionClaims {
            ver: CLAIMS_VERSION,
            user_id: identity.user_id,
            role: identity.role,
            tenant_id: identity.tenant_id,
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verifies signature, expiry and payload shape, returning the claims on success.
    pub fn validate(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!(reason = ?e.kind(), "session token rejected");
                TokenError::Invalid
            })?;

        if data.claims.ver != CLAIMS_VERSION {
            tracing::debug!(ver = data.claims.ver, "session token has unsupported version");
            return Err(TokenError::Invalid);
        }

        Ok(data.claims)
    }
}
