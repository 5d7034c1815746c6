//! Individual WebSocket connection handle.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::message::types::ServerEvent;

/// Unique connection identifier.
pub type ConnectionId = Uuid;

/// A handle to a single WebSocket connection.
///
/// Holds the sender channel for pushing events to the client, plus
/// metadata about the connected user. One live handle exists per user;
/// reconnects replace the previous handle.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID.
    pub id: ConnectionId,
    /// User who owns this connection.
    pub user_id: Uuid,
    /// Sender for outbound events.
    sender: mpsc::Sender<ServerEvent>,
    /// When the connection was established.
    pub connected_at: DateTime<Utc>,
    /// Last activity timestamp, touched on every inbound event.
    last_activity: tokio::sync::RwLock<DateTime<Utc>>,
    /// Whether the connection is still alive.
    alive: AtomicBool,
}

impl ConnectionHandle {
    /// Create a new connection handle.
    pub fn new(user_id: Uuid, sender: mpsc::Sender<ServerEvent>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            sender,
            connected_at: now,
            last_activity: tokio::sync::RwLock::new(now),
            alive: AtomicBool::new(true),
        }
    }

    /// Push an event to this connection.
    ///
    /// Non-blocking: a full buffer drops the event with a warning (the
    /// relay is best-effort), a closed channel marks the handle dead.
    pub fn send(&self, event: ServerEvent) -> bool {
        if !self.is_alive() {
            return false;
        }
        match self.sender.try_send(event) {
            Ok(_) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(conn_id = %self.id, "Connection send buffer full, dropping event");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_dead();
                false
            }
        }
    }

    /// Check if the connection is alive.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Mark the connection as dead.
    pub fn mark_dead(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    /// Update the last-activity timestamp.
    pub async fn touch(&self) {
        let mut la = self.last_activity.write().await;
        *la = Utc::now();
    }

    /// Read the last-activity timestamp.
    pub async fn last_activity(&self) -> DateTime<Utc> {
        *self.last_activity.read().await
    }
}
