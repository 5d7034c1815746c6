//! Realtime engine — wires the subsystems together and dispatches
//! client events.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use uuid::Uuid;

use playroom_core::config::realtime::RealtimeConfig;
use playroom_directory::traits::{MessageStore, UserDirectory};

use crate::connection::handle::{ConnectionHandle, ConnectionId};
use crate::connection::heartbeat::HeartbeatConfig;
use crate::connection::registry::ConnectionRegistry;
use crate::game::engine::{FirstMoverPicker, GameEngine, RandomFirstMover};
use crate::invite::coordinator::{InvitationCoordinator, InviteOutcome};
use crate::message::types::{ClientEvent, ServerEvent};
use crate::metrics::{MetricsSnapshot, RealtimeMetrics};
use crate::presence::broadcaster::PresenceBroadcaster;
use crate::relay::MessageRelay;
use crate::room::registry::RoomRegistry;

/// The realtime core. One instance per process, shared behind `Arc`.
pub struct RealtimeEngine {
    config: RealtimeConfig,
    connections: Arc<ConnectionRegistry>,
    rooms: Arc<RoomRegistry>,
    presence: PresenceBroadcaster,
    relay: MessageRelay,
    invites: Arc<InvitationCoordinator>,
    games: GameEngine,
    metrics: Arc<RealtimeMetrics>,
}

impl RealtimeEngine {
    /// Build the engine with the production coin-flip first mover.
    pub fn new(
        config: RealtimeConfig,
        directory: Arc<dyn UserDirectory>,
        messages: Arc<dyn MessageStore>,
    ) -> Self {
        Self::with_first_mover(config, directory, messages, Arc::new(RandomFirstMover))
    }

    /// Build the engine with an explicit first-mover policy.
    pub fn with_first_mover(
        config: RealtimeConfig,
        directory: Arc<dyn UserDirectory>,
        messages: Arc<dyn MessageStore>,
        first_mover: Arc<dyn FirstMoverPicker>,
    ) -> Self {
        let connections = Arc::new(ConnectionRegistry::new());
        let rooms = Arc::new(RoomRegistry::new());
        let metrics = Arc::new(RealtimeMetrics::new());

        let presence = PresenceBroadcaster::new(directory.clone(), connections.clone());
        let relay = MessageRelay::new(messages, connections.clone(), metrics.clone());
        let invites = Arc::new(InvitationCoordinator::new(
            directory,
            connections.clone(),
            metrics.clone(),
            Duration::from_secs(config.invite_ttl_seconds),
        ));
        let games = GameEngine::new(
            rooms.clone(),
            connections.clone(),
            metrics.clone(),
            first_mover,
        );

        Self {
            config,
            connections,
            rooms,
            presence,
            relay,
            invites,
            games,
            metrics,
        }
    }

    /// Heartbeat parameters for connection watchdogs.
    pub fn heartbeat_config(&self) -> HeartbeatConfig {
        HeartbeatConfig {
            check_interval: Duration::from_secs(self.config.heartbeat_interval_seconds),
            idle_timeout: Duration::from_secs(self.config.heartbeat_timeout_seconds),
        }
    }

    /// Register a new connection for an authenticated user.
    ///
    /// Returns the handle and the receiving end of the outbound event
    /// channel. A previous connection for the same user is replaced and
    /// marked dead; its socket task will observe the closure and exit
    /// without tearing down the fresh registration.
    pub async fn connect(&self, user_id: Uuid) -> (Arc<ConnectionHandle>, mpsc::Receiver<ServerEvent>) {
        let (tx, rx) = mpsc::channel(self.config.channel_buffer_size);
        let handle = Arc::new(ConnectionHandle::new(user_id, tx));

        if let Some(replaced) = self.connections.register(handle.clone()) {
            tracing::debug!(
                user_id = %user_id,
                old_conn = %replaced.id,
                new_conn = %handle.id,
                "Reconnect replaced live connection"
            );
            replaced.mark_dead();
        }

        self.metrics.record_connection_opened();
        self.presence.announce(user_id, true, Some(handle.id)).await;

        tracing::info!(user_id = %user_id, conn_id = %handle.id, "Connection established");
        (handle, rx)
    }

    /// Dispatch one inbound client event.
    ///
    /// The acting identity is always the authenticated connection owner;
    /// identity fields carried by the payload never widen what the caller
    /// may do.
    pub async fn handle_event(&self, user_id: Uuid, event: ClientEvent) {
        match event {
            ClientEvent::PrivateMessage { to, content } => {
                self.relay.send_private(user_id, to, content).await;
            }
            ClientEvent::Typing { to, is_typing } => {
                self.relay.send_typing(user_id, to, is_typing);
            }
            ClientEvent::GetOnlineFriends => {
                let users = self.presence.online_friends(user_id).await;
                self.connections
                    .send(user_id, ServerEvent::OnlineFriendsList { users });
            }
            ClientEvent::GameInvite { game_id, from, to, .. } => {
                if from != user_id {
                    tracing::debug!(
                        user_id = %user_id,
                        claimed = %from,
                        "Invite sender mismatch, using session identity"
                    );
                }
                Arc::clone(&self.invites).invite(game_id, user_id, to).await;
            }
            ClientEvent::GameInviteAccepted { game_id, from, .. } => {
                if self.invites.accept(game_id, from, user_id).await == InviteOutcome::Resolved {
                    self.games.create_session(game_id, from, user_id);
                }
            }
            ClientEvent::GameInviteDeclined { from, .. } => {
                self.invites.decline(from, user_id).await;
            }
            ClientEvent::GameMove {
                game_id, position, ..
            } => {
                self.games.apply_move(game_id, user_id, position);
            }
            ClientEvent::UserOnline { .. } => {
                let connection_ref = self.connections.lookup(user_id).map(|h| h.id);
                self.presence.announce(user_id, true, connection_ref).await;
            }
            ClientEvent::Ping => {
                self.connections.send(user_id, ServerEvent::Pong);
            }
        }
    }

    /// Tear down a connection.
    ///
    /// Guarded by connection ID: if the user already reconnected, the
    /// registry holds a fresher handle and this call is a no-op, so the
    /// new connection keeps its presence and sessions. Pending game
    /// invitations are left to their expiry timers.
    pub async fn disconnect(&self, user_id: Uuid, conn_id: ConnectionId) {
        let Some(handle) = self.connections.unregister_if(user_id, conn_id) else {
            tracing::debug!(user_id = %user_id, conn_id = %conn_id, "Stale disconnect, ignoring");
            return;
        };
        handle.mark_dead();
        self.metrics.record_connection_closed();

        self.rooms.leave_all(user_id);
        self.games.handle_disconnect(user_id);
        self.presence.announce(user_id, false, None).await;

        tracing::info!(user_id = %user_id, conn_id = %conn_id, "Connection closed");
    }

    /// Number of live connections.
    pub fn connection_count(&self) -> usize {
        self.connections.connection_count()
    }

    /// Number of live game sessions.
    pub fn active_games(&self) -> usize {
        self.games.active_count()
    }

    /// Number of invitations awaiting an answer.
    pub fn pending_invites(&self) -> usize {
        self.invites.pending_count()
    }

    /// Counter snapshot for the detailed health report.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}
