use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Admin Router Module
///
/// Routes restricted to users with the ADMIN role. Authentication comes from the layer
/// applied in `create_router`; each handler then passes the claims through
/// `guard::require_role` before touching the store.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // POST /tenants/{key}/upgrade
        // Switches the admin's own tenant to PRO. `key` is the slug or the tenant id.
        .route("/tenants/{key}/upgrade", post(handlers::upgrade_tenant))
        // GET/POST /users
        // Lists the tenant's users, or invites a new one into the tenant.
        .route(
            "/users",
            get(handlers::list_users).post(handlers::invite_user),
        )
}
