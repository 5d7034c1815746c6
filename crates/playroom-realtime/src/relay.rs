//! Private message and typing-indicator relay.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use playroom_directory::traits::MessageStore;
use playroom_entity::message::ChatMessage;

use crate::connection::registry::ConnectionRegistry;
use crate::message::types::ServerEvent;
use crate::metrics::RealtimeMetrics;

/// Relays private messages (persist, then deliver) and typing indicators
/// (deliver only).
pub struct MessageRelay {
    store: Arc<dyn MessageStore>,
    connections: Arc<ConnectionRegistry>,
    metrics: Arc<RealtimeMetrics>,
}

impl MessageRelay {
    pub fn new(
        store: Arc<dyn MessageStore>,
        connections: Arc<ConnectionRegistry>,
        metrics: Arc<RealtimeMetrics>,
    ) -> Self {
        Self {
            store,
            connections,
            metrics,
        }
    }

    /// Relay a private message from `from` to `to`.
    ///
    /// The message is persisted first so the receiver gets its durable ID.
    /// A storage failure downgrades to transient delivery: the message is
    /// still relayed with a freshly minted ID, it just won't appear in
    /// history.
    pub async fn send_private(&self, from: Uuid, to: Uuid, content: String) -> ChatMessage {
        let sent_at = Utc::now();

        let message = match self.store.save(from, to, &content, sent_at).await {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(
                    from = %from,
                    to = %to,
                    error = %e,
                    "Message persistence failed, delivering transiently"
                );
                ChatMessage {
                    id: Uuid::new_v4(),
                    sender_id: from,
                    receiver_id: to,
                    content,
                    sent_at,
                }
            }
        };

        let delivered = self.connections.send(
            to,
            ServerEvent::PrivateMessage {
                message: message.clone(),
                from,
            },
        );
        if delivered {
            self.metrics.record_message_relayed();
        } else {
            tracing::debug!(from = %from, to = %to, "Receiver offline, message persisted only");
        }

        message
    }

    /// Pass a typing indicator through without persistence.
    pub fn send_typing(&self, from: Uuid, to: Uuid, is_typing: bool) {
        self.connections
            .send(to, ServerEvent::Typing { from, is_typing });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use playroom_directory::memory::MemoryMessageStore;
    use tokio::sync::mpsc;

    use crate::connection::handle::ConnectionHandle;

    fn setup() -> (Arc<MemoryMessageStore>, Arc<ConnectionRegistry>, MessageRelay) {
        let store = Arc::new(MemoryMessageStore::new());
        let connections = Arc::new(ConnectionRegistry::new());
        let relay = MessageRelay::new(
            store.clone(),
            connections.clone(),
            Arc::new(RealtimeMetrics::new()),
        );
        (store, connections, relay)
    }

    fn connect(registry: &ConnectionRegistry, user: Uuid) -> mpsc::Receiver<ServerEvent> {
        let (tx, rx) = mpsc::channel(16);
        registry.register(Arc::new(ConnectionHandle::new(user, tx)));
        rx
    }

    #[tokio::test]
    async fn test_persist_then_deliver() {
        let (store, connections, relay) = setup();
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
        let mut bob_rx = connect(&connections, bob);

        relay.send_private(alice, bob, "hello".to_string()).await;

        assert_eq!(store.saved_count(), 1);
        let event = bob_rx.recv().await.unwrap();
        match event {
            ServerEvent::PrivateMessage { message, from } => {
                assert_eq!(from, alice);
                assert_eq!(message.content, "hello");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_store_failure_still_delivers() {
        let (store, connections, relay) = setup();
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
        let mut bob_rx = connect(&connections, bob);

        store.set_fail(true);
        relay.send_private(alice, bob, "hello".to_string()).await;

        assert_eq!(store.saved_count(), 0);
        let event = bob_rx.recv().await.unwrap();
        assert!(matches!(event, ServerEvent::PrivateMessage { .. }));
    }

    #[tokio::test]
    async fn test_offline_receiver_persists_only() {
        let (store, _connections, relay) = setup();
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());

        relay.send_private(alice, bob, "hello".to_string()).await;
        assert_eq!(store.saved_count(), 1);
    }

    #[tokio::test]
    async fn test_typing_passthrough() {
        let (store, connections, relay) = setup();
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
        let mut bob_rx = connect(&connections, bob);

        relay.send_typing(alice, bob, true);

        assert_eq!(store.saved_count(), 0);
        let event = bob_rx.recv().await.unwrap();
        assert!(matches!(
            event,
            ServerEvent::Typing { from, is_typing: true } if from == alice
        ));
    }
}
