//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A registered user in the Playroom directory.
///
/// The `online`, `connection_ref`, and `last_seen` columns are mirrors of
/// the in-memory connection state; the connection registry remains the
/// authority while the process is running.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Unique login name.
    pub username: String,
    /// Email address (optional).
    pub email: Option<String>,
    /// Whether the user currently has a live connection.
    pub online: bool,
    /// Identifier of the user's live connection, if any.
    pub connection_ref: Option<Uuid>,
    /// Last time the user connected or disconnected.
    pub last_seen: Option<DateTime<Utc>>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}

/// A friend-list entry as returned by the directory.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Friend {
    /// The friend's user ID.
    pub id: Uuid,
    /// The friend's username.
    pub username: String,
    /// Mirrored online flag; a hint only, the connection registry decides.
    pub online: bool,
}
