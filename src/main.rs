//! Playroom Server — realtime presence, messaging, and game coordination.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};

use playroom_core::config::AppConfig;
use playroom_core::error::AppError;
use playroom_directory::repositories::message::PgMessageStore;
use playroom_directory::repositories::user::PgDirectory;
use playroom_directory::traits::{MessageStore, UserDirectory};

#[tokio::main]
async fn main() {
    let env = std::env::var("PLAYROOM_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Playroom v{}", env!("CARGO_PKG_VERSION"));

    // ── Database connection + migrations ─────────────────────────
    tracing::info!("Connecting to database...");
    let db_pool = playroom_directory::connection::create_pool(&config.database).await?;

    tracing::info!("Running database migrations...");
    playroom_directory::migration::run_migrations(&db_pool).await?;
    tracing::info!("Database migrations complete");

    // ── Boundary implementations ─────────────────────────────────
    let directory: Arc<dyn UserDirectory> = Arc::new(PgDirectory::new(db_pool.clone()));
    let message_store: Arc<dyn MessageStore> = Arc::new(PgMessageStore::new(db_pool.clone()));

    // ── Auth ─────────────────────────────────────────────────────
    let jwt_decoder = Arc::new(playroom_auth::jwt::JwtDecoder::new(&config.auth));

    // ── Realtime engine ──────────────────────────────────────────
    tracing::info!("Initializing realtime engine...");
    let realtime = Arc::new(playroom_realtime::RealtimeEngine::new(
        config.realtime.clone(),
        directory,
        message_store,
    ));
    tracing::info!("Realtime engine initialized");

    // ── HTTP server ──────────────────────────────────────────────
    let app_state = playroom_api::AppState {
        config: Arc::new(config.clone()),
        db_pool,
        jwt_decoder,
        realtime,
    };

    let app = playroom_api::build_router(app_state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("Playroom server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    tracing::info!("Playroom server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
