//! Message store repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use playroom_core::error::{AppError, ErrorKind};
use playroom_core::result::AppResult;
use playroom_entity::message::ChatMessage;

use crate::traits::MessageStore;

/// PostgreSQL-backed chat message store.
#[derive(Debug, Clone)]
pub struct PgMessageStore {
    pool: PgPool,
}

impl PgMessageStore {
    /// Create a new message store repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageStore for PgMessageStore {
    async fn save(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
        content: &str,
        sent_at: DateTime<Utc>,
    ) -> AppResult<ChatMessage> {
        sqlx::query_as::<_, ChatMessage>(
            "INSERT INTO messages (sender_id, receiver_id, content, sent_at)
             VALUES ($1, $2, $3, $4)
             RETURNING *",
        )
        .bind(sender_id)
        .bind(receiver_id)
        .bind(content)
        .bind(sent_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to save message", e))
    }

    async fn history_between(&self, a: Uuid, b: Uuid, limit: i64) -> AppResult<Vec<ChatMessage>> {
        sqlx::query_as::<_, ChatMessage>(
            "SELECT * FROM messages
             WHERE (sender_id = $1 AND receiver_id = $2)
                OR (sender_id = $2 AND receiver_id = $1)
             ORDER BY sent_at DESC
             LIMIT $3",
        )
        .bind(a)
        .bind(b)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load message history", e))
    }
}
