//! Application state shared across all handlers.

use std::sync::Arc;

use sqlx::PgPool;

use playroom_auth::jwt::JwtDecoder;
use playroom_core::config::AppConfig;
use playroom_realtime::RealtimeEngine;

/// Application state passed to every Axum handler via `State<AppState>`.
///
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// PostgreSQL connection pool, used directly only by the health probe.
    pub db_pool: PgPool,
    /// JWT token decoder for the WebSocket handshake.
    pub jwt_decoder: Arc<JwtDecoder>,
    /// The realtime engine.
    pub realtime: Arc<RealtimeEngine>,
}
