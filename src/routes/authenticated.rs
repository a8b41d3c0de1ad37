use crate::{AppState, handlers};
use axum::{
    Router,
    routing::get,
};

/// Authenticated Router Module
///
/// Routes open to any member of a tenant holding a valid session token.
///
/// Access Control Strategy:
/// The router is wrapped in `auth_middleware` and every handler also takes the `AuthUser`
/// extractor. All reads and writes are scoped to the tenant carried by that extractor.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /me
        // The caller's profile plus their tenant and its current plan.
        .route("/me", get(handlers::get_me))
        // GET/POST /notes
        // Lists the tenant's notes, or creates one (subject to the plan quota).
        .route("/notes", get(handlers::list_notes).post(handlers::create_note))
        // GET/PUT/DELETE /notes/{id}
        // Single-note access. A note of another tenant answers 404, same as a missing one.
        .route(
            "/notes/{id}",
            get(handlers::get_note)
                .put(handlers::update_note)
                .delete(handlers::delete_note),
        )
}
