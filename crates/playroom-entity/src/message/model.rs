//! Chat message entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A private chat message between two users.
///
/// Immutable once created. The ID is assigned by the message store on
/// save; a relay that could not reach the store fabricates one so the
/// real-time path can still deliver the message.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Persisted message ID.
    pub id: Uuid,
    /// Sending user.
    pub sender_id: Uuid,
    /// Receiving user.
    pub receiver_id: Uuid,
    /// Message text.
    pub content: String,
    /// Server-side send timestamp.
    pub sent_at: DateTime<Utc>,
}
