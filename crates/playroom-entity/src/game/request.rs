//! Game request entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::GameRequestStatus;

/// A persisted game invitation entry on the challenged user's request list.
///
/// The in-memory invitation coordinator is the authority for the PENDING
/// window; this record is the durable mirror clients fetch over REST.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct GameRequest {
    /// Game ID shared with the eventual session.
    pub game_id: Uuid,
    /// Challenging user.
    #[sqlx(rename = "from_user")]
    pub from: Uuid,
    /// Current status.
    pub status: GameRequestStatus,
    /// When the invitation was sent.
    pub sent_at: DateTime<Utc>,
    /// Absolute expiry time, from the server clock at invite time.
    pub expires_at: DateTime<Utc>,
}
