//! # playroom-realtime
//!
//! Real-time engine for Playroom. Provides:
//!
//! - WebSocket connection registry with JWT handshake authentication
//! - Presence fan-out to friends on connect/disconnect
//! - Private message and typing-indicator relay
//! - Game invitation lifecycle with server-side expiry
//! - Authoritative two-player tic-tac-toe sessions with disconnect forfeit

pub mod connection;
pub mod game;
pub mod invite;
pub mod message;
pub mod metrics;
pub mod presence;
pub mod relay;
pub mod room;
pub mod server;

pub use connection::handle::ConnectionHandle;
pub use connection::registry::ConnectionRegistry;
pub use game::engine::GameEngine;
pub use invite::coordinator::InvitationCoordinator;
pub use message::types::{ClientEvent, ServerEvent};
pub use presence::broadcaster::PresenceBroadcaster;
pub use relay::MessageRelay;
pub use server::RealtimeEngine;
