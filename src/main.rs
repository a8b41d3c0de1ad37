use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tenant_notes::{
    AppState,
    config::{AppConfig, Env},
    create_router, credentials,
    repository::{PostgresRepository, RepositoryState},
    seed,
};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Bootstraps configuration, logging, the Postgres pool and schema, optional demo data,
/// and the HTTP server.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail-fast on a missing JWT_SECRET or DATABASE_URL).
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging: RUST_LOG wins, otherwise sensible defaults.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tenant_notes=debug,tower_http=info".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 3. Database pool and schema.
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.db_url)
        .await
        .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("FATAL: Failed to apply database migrations.");

    let repo = Arc::new(PostgresRepository::new(pool)) as RepositoryState;

    // 4. Demo tenants and users.
    if config.seed_demo_data {
        seed::seed_demo_data(repo.as_ref())
            .await
            .expect("FATAL: Failed to seed demo data.");
        tracing::info!("Demo data seeded.");
    }

    // Build the unknown-user hash now rather than on the first failed login.
    credentials::unknown_user_hash();

    // 5. Shared state, router, server.
    let bind_addr = config.bind_addr.clone();
    let app = create_router(AppState::new(config, repo));

    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("FATAL: Failed to bind the listen address. Check BIND_ADDR.");

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at /swagger-ui");

    axum::serve(listener, app)
        .await
        .expect("FATAL: HTTP server terminated unexpectedly.");
}
