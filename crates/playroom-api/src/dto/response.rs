//! Response DTOs.

use serde::{Deserialize, Serialize};

use playroom_realtime::metrics::MetricsSnapshot;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Basic health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status string.
    pub status: String,
    /// Server version.
    pub version: String,
}

/// Detailed health response with subsystem state.
#[derive(Debug, Clone, Serialize)]
pub struct DetailedHealthResponse {
    /// Overall status string.
    pub status: String,
    /// Database connectivity.
    pub database: String,
    /// Live WebSocket connections.
    pub connections: usize,
    /// Live game sessions.
    pub active_games: usize,
    /// Invitations awaiting an answer.
    pub pending_invites: usize,
    /// Engine counters.
    pub metrics: MetricsSnapshot,
}
