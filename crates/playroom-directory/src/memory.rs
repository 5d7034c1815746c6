//! In-memory implementations of the boundary traits.
//!
//! Used by the real-time engine tests and by standalone runs without a
//! database. Behavior mirrors the PostgreSQL repositories, including the
//! pending-only guard on game request updates.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use playroom_core::error::AppError;
use playroom_core::result::AppResult;
use playroom_entity::game::{GameRequest, GameRequestStatus};
use playroom_entity::message::ChatMessage;
use playroom_entity::user::Friend;

use crate::traits::{MessageStore, UserDirectory};

/// In-memory user directory.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    /// User ID → friend list.
    friends: DashMap<Uuid, Vec<Friend>>,
    /// User ID → mirrored connection state.
    statuses: DashMap<Uuid, (bool, Option<Uuid>, DateTime<Utc>)>,
    /// User ID → game request list.
    requests: DashMap<Uuid, Vec<GameRequest>>,
    /// When set, every call fails with a database error.
    fail_writes: AtomicBool,
}

impl MemoryDirectory {
    /// Create an empty in-memory directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a symmetric friendship between two users.
    pub fn add_friendship(&self, a: (Uuid, &str), b: (Uuid, &str)) {
        self.friends.entry(a.0).or_default().push(Friend {
            id: b.0,
            username: b.1.to_string(),
            online: false,
        });
        self.friends.entry(b.0).or_default().push(Friend {
            id: a.0,
            username: a.1.to_string(),
            online: false,
        });
    }

    /// Toggle simulated write failures.
    pub fn set_fail(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Return the mirrored online flag for a user, if any was written.
    pub fn mirrored_online(&self, user_id: Uuid) -> Option<bool> {
        self.statuses.get(&user_id).map(|s| s.0)
    }

    /// Return a user's game request list.
    pub fn game_requests(&self, user_id: Uuid) -> Vec<GameRequest> {
        self.requests
            .get(&user_id)
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    fn check_fail(&self) -> AppResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::database("Simulated directory failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for MemoryDirectory {
    async fn find_friends(&self, user_id: Uuid) -> AppResult<Vec<Friend>> {
        self.check_fail()?;
        Ok(self
            .friends
            .get(&user_id)
            .map(|f| f.clone())
            .unwrap_or_default())
    }

    async fn set_online_status(
        &self,
        user_id: Uuid,
        online: bool,
        connection_ref: Option<Uuid>,
        last_seen: DateTime<Utc>,
    ) -> AppResult<()> {
        self.check_fail()?;
        self.statuses
            .insert(user_id, (online, connection_ref, last_seen));
        Ok(())
    }

    async fn append_game_request(&self, user_id: Uuid, request: GameRequest) -> AppResult<()> {
        self.check_fail()?;
        self.requests.entry(user_id).or_default().push(request);
        Ok(())
    }

    async fn update_game_request_status(
        &self,
        user_id: Uuid,
        from: Uuid,
        status: GameRequestStatus,
    ) -> AppResult<()> {
        self.check_fail()?;
        if let Some(mut requests) = self.requests.get_mut(&user_id) {
            for request in requests.iter_mut() {
                if request.from == from && request.status == GameRequestStatus::Pending {
                    request.status = status;
                }
            }
        }
        Ok(())
    }
}

/// In-memory chat message store.
#[derive(Debug, Default)]
pub struct MemoryMessageStore {
    /// All saved messages in insertion order.
    messages: DashMap<Uuid, ChatMessage>,
    /// When set, every call fails with a database error.
    fail_writes: AtomicBool,
}

impl MemoryMessageStore {
    /// Create an empty in-memory message store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle simulated write failures.
    pub fn set_fail(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Return the number of saved messages.
    pub fn saved_count(&self) -> usize {
        self.messages.len()
    }
}

#[async_trait]
impl MessageStore for MemoryMessageStore {
    async fn save(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
        content: &str,
        sent_at: DateTime<Utc>,
    ) -> AppResult<ChatMessage> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::database("Simulated message store failure"));
        }

        let message = ChatMessage {
            id: Uuid::new_v4(),
            sender_id,
            receiver_id,
            content: content.to_string(),
            sent_at,
        };
        self.messages.insert(message.id, message.clone());
        Ok(message)
    }

    async fn history_between(&self, a: Uuid, b: Uuid, limit: i64) -> AppResult<Vec<ChatMessage>> {
        let mut history: Vec<ChatMessage> = self
            .messages
            .iter()
            .filter(|m| {
                (m.sender_id == a && m.receiver_id == b)
                    || (m.sender_id == b && m.receiver_id == a)
            })
            .map(|m| m.clone())
            .collect();
        history.sort_by(|x, y| y.sent_at.cmp(&x.sent_at));
        history.truncate(limit as usize);
        Ok(history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_game_request_terminal_guard() {
        let directory = MemoryDirectory::new();
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
        let now = Utc::now();

        directory
            .append_game_request(
                bob,
                GameRequest {
                    game_id: Uuid::new_v4(),
                    from: alice,
                    status: GameRequestStatus::Pending,
                    sent_at: now,
                    expires_at: now + chrono::Duration::seconds(30),
                },
            )
            .await
            .unwrap();

        directory
            .update_game_request_status(bob, alice, GameRequestStatus::Declined)
            .await
            .unwrap();
        // A second transition must not overwrite the terminal state.
        directory
            .update_game_request_status(bob, alice, GameRequestStatus::Accepted)
            .await
            .unwrap();

        let requests = directory.game_requests(bob);
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].status, GameRequestStatus::Declined);
    }

    #[tokio::test]
    async fn test_message_history_ordering() {
        let store = MemoryMessageStore::new();
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
        let base = Utc::now();

        for i in 0..3 {
            store
                .save(alice, bob, &format!("msg {i}"), base + chrono::Duration::seconds(i))
                .await
                .unwrap();
        }

        let history = store.history_between(bob, alice, 2).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].content, "msg 2");
    }
}
