//! Boundary traits consumed by the real-time core.
//!
//! The core never talks to a database directly; it is handed
//! `Arc<dyn UserDirectory>` / `Arc<dyn MessageStore>` so tests can swap in
//! the in-memory implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use playroom_core::result::AppResult;
use playroom_entity::game::{GameRequest, GameRequestStatus};
use playroom_entity::message::ChatMessage;
use playroom_entity::user::Friend;

/// Read/write access to the user directory and friend graph.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Return the friend list of a user.
    async fn find_friends(&self, user_id: Uuid) -> AppResult<Vec<Friend>>;

    /// Mirror a user's connection state into the directory record.
    ///
    /// Writes are idempotent field sets; last-writer-wins is acceptable.
    async fn set_online_status(
        &self,
        user_id: Uuid,
        online: bool,
        connection_ref: Option<Uuid>,
        last_seen: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Append a game request to a user's invitation list.
    async fn append_game_request(&self, user_id: Uuid, request: GameRequest) -> AppResult<()>;

    /// Update the status of a pending game request from `from` on `user_id`'s
    /// list. Requests already in a terminal state are left untouched.
    async fn update_game_request_status(
        &self,
        user_id: Uuid,
        from: Uuid,
        status: GameRequestStatus,
    ) -> AppResult<()>;
}

/// Chat message persistence.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persist a private message and return it with its assigned ID.
    async fn save(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
        content: &str,
        sent_at: DateTime<Utc>,
    ) -> AppResult<ChatMessage>;

    /// Return the most recent messages between two users, newest first.
    async fn history_between(&self, a: Uuid, b: Uuid, limit: i64) -> AppResult<Vec<ChatMessage>>;
}
