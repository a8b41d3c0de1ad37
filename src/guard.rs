use std::ops::Deref;
use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};

use crate::{
    error::AppError,
    models::Role,
    token::{SessionClaims, SessionTokenCodec},
};

/// TokenState
///
/// The shared, immutable token codec as stored in the application state.
pub type TokenState = Arc<SessionTokenCodec>;

/// authenticate
///
/// Resolves the raw `Authorization` header value into verified claims.
///
/// Returns `None` when the header is absent, does not use the `Bearer` scheme, carries
/// an empty token, or the token fails validation. Nothing is distinguished to the
/// caller and nothing panics; the boundary maps `None` to 401.
///
/// The scheme name is matched case-insensitively (RFC 7235).
pub fn authenticate(raw_header: Option<&str>, codec: &SessionTokenCodec) -> Option<SessionClaims> {
    let (scheme, token) = raw_header?.trim_start().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    codec.validate(token).ok()
}

/// authorize
///
/// Role allow-list check. An empty list admits every authenticated caller.
pub fn authorize(claims: &SessionClaims, required_roles: &[Role]) -> bool {
    required_roles.is_empty() || required_roles.contains(&claims.role)
}

/// require_role
///
/// The single role gate used by every role-restricted handler.
pub fn require_role(claims: &SessionClaims, required_roles: &[Role]) -> Result<(), AppError> {
    if authorize(claims, required_roles) {
        Ok(())
    } else {
        tracing::info!(
            user_id = %claims.user_id,
            tenant_id = %claims.tenant_id,
            role = ?claims.role,
            "request rejected by role gate"
        );
        Err(AppError::Forbidden)
    }
}

/// AuthUser
///
/// The resolved identity of an authenticated request. Handlers take it as an argument;
/// the tenant it carries is the only tenant identity any data access may use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser(pub SessionClaims);

impl Deref for AuthUser {
    type Target = SessionClaims;

    fn deref(&self) -> &SessionClaims {
        &self.0
    }
}

/// AuthUser Extractor
///
/// Pulls the token codec out of the state, reads the `Authorization` header and delegates
/// to [`authenticate`]. Any failure rejects with `AppError::Unauthenticated` (401) before
/// the handler runs.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    TokenState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let codec = TokenState::from_ref(state);

        let raw_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        authenticate(raw_header, &codec)
            .map(AuthUser)
            .ok_or(AppError::Unauthenticated)
    }
}
