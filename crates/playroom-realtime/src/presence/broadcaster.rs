//! Presence fan-out — tells a user's friends when they come and go.
//!
//! Presence truth is the connection registry. The directory mirror is a
//! best-effort write so offline reads (last seen, profile badges) stay
//! roughly current; a failed mirror write never blocks the broadcast.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use playroom_directory::traits::UserDirectory;

use crate::connection::registry::ConnectionRegistry;
use crate::message::types::ServerEvent;

/// Announces presence transitions to the affected friend sets.
pub struct PresenceBroadcaster {
    directory: Arc<dyn UserDirectory>,
    connections: Arc<ConnectionRegistry>,
}

impl PresenceBroadcaster {
    pub fn new(directory: Arc<dyn UserDirectory>, connections: Arc<ConnectionRegistry>) -> Self {
        Self {
            directory,
            connections,
        }
    }

    /// Announce a presence transition for a user.
    ///
    /// Mirrors the state into the directory, then pushes `friend-online`
    /// or `friend-offline` to each friend with a live connection.
    pub async fn announce(&self, user_id: Uuid, online: bool, connection_ref: Option<Uuid>) {
        if let Err(e) = self
            .directory
            .set_online_status(user_id, online, connection_ref, Utc::now())
            .await
        {
            tracing::warn!(user_id = %user_id, error = %e, "Failed to mirror presence to directory");
        }

        let friends = match self.directory.find_friends(user_id).await {
            Ok(friends) => friends,
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Failed to load friends for presence broadcast");
                return;
            }
        };

        let event = if online {
            ServerEvent::FriendOnline { user_id }
        } else {
            ServerEvent::FriendOffline { user_id }
        };

        let mut delivered = 0usize;
        for friend in &friends {
            if self.connections.send(friend.id, event.clone()) {
                delivered += 1;
            }
        }

        tracing::debug!(
            user_id = %user_id,
            online,
            friends = friends.len(),
            delivered,
            "Presence broadcast"
        );
    }

    /// IDs of the user's friends that currently hold a live connection.
    pub async fn online_friends(&self, user_id: Uuid) -> Vec<Uuid> {
        match self.directory.find_friends(user_id).await {
            Ok(friends) => friends
                .into_iter()
                .filter(|f| self.connections.is_connected(f.id))
                .map(|f| f.id)
                .collect(),
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Failed to load friends for online query");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use playroom_directory::memory::MemoryDirectory;
    use tokio::sync::mpsc;

    use crate::connection::handle::ConnectionHandle;

    fn connect(registry: &ConnectionRegistry, user: Uuid) -> mpsc::Receiver<ServerEvent> {
        let (tx, rx) = mpsc::channel(16);
        registry.register(Arc::new(ConnectionHandle::new(user, tx)));
        rx
    }

    #[tokio::test]
    async fn test_announce_reaches_connected_friends_only() {
        let directory = Arc::new(MemoryDirectory::new());
        let connections = Arc::new(ConnectionRegistry::new());
        let broadcaster = PresenceBroadcaster::new(directory.clone(), connections.clone());

        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let carol = Uuid::new_v4();
        directory.add_friendship((alice, "alice"), (bob, "bob"));
        directory.add_friendship((alice, "alice"), (carol, "carol"));

        let mut bob_rx = connect(&connections, bob);
        // carol stays disconnected

        broadcaster.announce(alice, true, Some(Uuid::new_v4())).await;

        let event = bob_rx.recv().await.unwrap();
        assert!(matches!(event, ServerEvent::FriendOnline { user_id } if user_id == alice));
    }

    #[tokio::test]
    async fn test_directory_failure_does_not_block_broadcast() {
        let directory = Arc::new(MemoryDirectory::new());
        let connections = Arc::new(ConnectionRegistry::new());
        let broadcaster = PresenceBroadcaster::new(directory.clone(), connections.clone());

        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        directory.add_friendship((alice, "alice"), (bob, "bob"));
        directory.set_fail(true);

        let mut bob_rx = connect(&connections, bob);
        broadcaster.announce(alice, false, None).await;

        // Mirror write failed and friend lookup failed; nothing delivered,
        // but nothing panicked either.
        directory.set_fail(false);
        broadcaster.announce(alice, false, None).await;
        let event = bob_rx.recv().await.unwrap();
        assert!(matches!(event, ServerEvent::FriendOffline { user_id } if user_id == alice));
    }

    #[tokio::test]
    async fn test_online_friends_intersects_registry() {
        let directory = Arc::new(MemoryDirectory::new());
        let connections = Arc::new(ConnectionRegistry::new());
        let broadcaster = PresenceBroadcaster::new(directory.clone(), connections.clone());

        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let carol = Uuid::new_v4();
        directory.add_friendship((alice, "alice"), (bob, "bob"));
        directory.add_friendship((alice, "alice"), (carol, "carol"));

        let _bob_rx = connect(&connections, bob);

        let online = broadcaster.online_friends(alice).await;
        assert_eq!(online, vec![bob]);
    }
}
