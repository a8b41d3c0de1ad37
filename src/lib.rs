use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Access control core.
pub mod credentials;
pub mod guard;
pub mod quota;
pub mod token;

// Application services and plumbing.
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod seed;

// Routing split by access level (Public, Authenticated, Admin).
pub mod routes;
use guard::AuthUser;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use guard::TokenState;
pub use repository::{InMemoryRepository, PostgresRepository, RepositoryState};
pub use token::SessionTokenCodec;

/// ApiDoc
///
/// OpenAPI document for every handler and payload, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health, handlers::login, handlers::get_me,
        handlers::list_notes, handlers::create_note, handlers::get_note,
        handlers::update_note, handlers::delete_note,
        handlers::upgrade_tenant, handlers::list_users, handlers::invite_user
    ),
    components(
        schemas(
            models::Tenant, models::User, models::Note, models::Plan, models::Role,
            models::LoginRequest, models::LoginResponse, models::CreateNoteRequest,
            models::UpdateNoteRequest, models::InviteUserRequest, models::MeResponse,
            models::UpgradeResponse, models::DeleteNoteResponse, models::HealthResponse,
            error::ErrorBody,
        )
    ),
    tags(
        (name = "tenant-notes", description = "Multi-tenant notes API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single shared container handed to every request. All members are read-only or
/// internally synchronised, so cloning it per request is cheap and safe.
#[derive(Clone)]
pub struct AppState {
    /// Tenant-scoped store facade.
    pub repo: RepositoryState,
    /// Session token codec holding the signing secret.
    pub tokens: TokenState,
    /// Configuration loaded at startup.
    pub config: AppConfig,
}

impl AppState {
    /// Builds the state from a loaded configuration and a repository, deriving the token
    /// codec from the configured secret and TTL.
    pub fn new(config: AppConfig, repo: RepositoryState) -> Self {
        let tokens = std::sync::Arc::new(SessionTokenCodec::new(
            &config.jwt_secret,
            config.token_ttl,
        ));
        Self {
            repo,
            tokens,
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for TokenState {
    fn from_ref(app_state: &AppState) -> TokenState {
        app_state.tokens.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Rejects the request with 401 before routing to a handler unless the `AuthUser`
/// extractor accepts its bearer token.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the routing tree, the authentication layer, and the observability stack.
pub fn create_router(state: AppState) -> Router {
    // Preflight (OPTIONS) requests are answered here with permissive allow headers.
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes()
                .merge(admin::admin_routes())
                .route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
        )
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Opens the per-request span, tagged with the `x-request-id` so every log line of a
/// request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
