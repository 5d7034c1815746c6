//! User directory repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use playroom_core::error::{AppError, ErrorKind};
use playroom_core::result::AppResult;
use playroom_entity::game::{GameRequest, GameRequestStatus};
use playroom_entity::user::{Friend, User};

use crate::traits::UserDirectory;

/// PostgreSQL-backed user directory.
#[derive(Debug, Clone)]
pub struct PgDirectory {
    pool: PgPool,
}

impl PgDirectory {
    /// Create a new directory repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by primary key.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user by id", e))
    }

    /// List a user's game requests, newest first.
    pub async fn find_game_requests(&self, user_id: Uuid) -> AppResult<Vec<GameRequest>> {
        sqlx::query_as::<_, GameRequest>(
            "SELECT game_id, from_user, status, sent_at, expires_at
             FROM game_requests WHERE user_id = $1 ORDER BY sent_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list game requests", e))
    }
}

#[async_trait]
impl UserDirectory for PgDirectory {
    async fn find_friends(&self, user_id: Uuid) -> AppResult<Vec<Friend>> {
        sqlx::query_as::<_, Friend>(
            "SELECT u.id, u.username, u.online
             FROM friendships f
             JOIN users u ON u.id = f.friend_id
             WHERE f.user_id = $1
             ORDER BY u.username",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list friends", e))
    }

    async fn set_online_status(
        &self,
        user_id: Uuid,
        online: bool,
        connection_ref: Option<Uuid>,
        last_seen: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE users SET online = $2, connection_ref = $3, last_seen = $4 WHERE id = $1",
        )
        .bind(user_id)
        .bind(online)
        .bind(connection_ref)
        .bind(last_seen)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update online status", e)
        })?;

        Ok(())
    }

    async fn append_game_request(&self, user_id: Uuid, request: GameRequest) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO game_requests (user_id, game_id, from_user, status, sent_at, expires_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (user_id, game_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(request.game_id)
        .bind(request.from)
        .bind(request.status)
        .bind(request.sent_at)
        .bind(request.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to append game request", e)
        })?;

        Ok(())
    }

    async fn update_game_request_status(
        &self,
        user_id: Uuid,
        from: Uuid,
        status: GameRequestStatus,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE game_requests SET status = $3
             WHERE user_id = $1 AND from_user = $2 AND status = 'PENDING'",
        )
        .bind(user_id)
        .bind(from)
        .bind(status)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update game request status", e)
        })?;

        Ok(())
    }
}
