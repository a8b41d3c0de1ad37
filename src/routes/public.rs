use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a session: the liveness probe and the login exchange.
/// Nothing here reads tenant data beyond the credential lookup performed by `login`.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Returns {"status":"ok"} for load balancer checks.
        .route("/health", get(handlers::health))
        // POST /auth/login
        // Verifies email + password and returns a signed session token.
        .route("/auth/login", post(handlers::login))
}
