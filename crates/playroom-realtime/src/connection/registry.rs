//! Connection registry — the single source of truth for "is user X
//! reachable right now".

use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

use crate::message::types::ServerEvent;

use super::handle::{ConnectionHandle, ConnectionId};

/// Keyed map from user ID to that user's single live connection.
///
/// Registration is last-connect-wins: a reconnect replaces the previous
/// handle. Lookups for absent users return `None`, never an error.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    /// User ID → live connection handle.
    by_user: DashMap<Uuid, Arc<ConnectionHandle>>,
}

impl ConnectionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection, replacing any prior handle for the user.
    ///
    /// Returns the replaced handle so the caller can mark it dead.
    pub fn register(&self, handle: Arc<ConnectionHandle>) -> Option<Arc<ConnectionHandle>> {
        self.by_user.insert(handle.user_id, handle)
    }

    /// Look up the live connection for a user.
    pub fn lookup(&self, user_id: Uuid) -> Option<Arc<ConnectionHandle>> {
        self.by_user.get(&user_id).map(|entry| entry.value().clone())
    }

    /// Remove a user's connection, but only if the registered handle still
    /// carries the given connection ID.
    ///
    /// A stale socket closing after a reconnect must not evict the fresh
    /// handle; its teardown is skipped entirely.
    pub fn unregister_if(
        &self,
        user_id: Uuid,
        conn_id: ConnectionId,
    ) -> Option<Arc<ConnectionHandle>> {
        self.by_user
            .remove_if(&user_id, |_, handle| handle.id == conn_id)
            .map(|(_, handle)| handle)
    }

    /// Check whether a user currently has a live connection.
    pub fn is_connected(&self, user_id: Uuid) -> bool {
        self.by_user.contains_key(&user_id)
    }

    /// Push an event to a user's connection, if any.
    ///
    /// Returns `false` when the user is not connected or the push failed;
    /// delivery to disconnected users is silently dropped by design.
    pub fn send(&self, user_id: Uuid, event: ServerEvent) -> bool {
        match self.lookup(user_id) {
            Some(handle) => handle.send(event),
            None => false,
        }
    }

    /// Total number of live connections.
    pub fn connection_count(&self) -> usize {
        self.by_user.len()
    }

    /// All currently connected user IDs.
    pub fn connected_user_ids(&self) -> Vec<Uuid> {
        self.by_user.iter().map(|entry| *entry.key()).collect()
    }
}
