//! Inbound and outbound WebSocket event type definitions.
//!
//! Event names and field casing are part of the client contract and must
//! not change without a client migration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use playroom_entity::game::GameRequestStatus;
use playroom_entity::message::ChatMessage;

use crate::game::board::Board;

/// Events sent by the client to the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    /// Send a private chat message.
    #[serde(rename = "private-message", rename_all = "camelCase")]
    PrivateMessage {
        /// Receiving user.
        to: Uuid,
        /// Message text.
        content: String,
    },
    /// Typing indicator toggle.
    #[serde(rename = "typing", rename_all = "camelCase")]
    Typing {
        /// Receiving user.
        to: Uuid,
        /// Whether the sender is currently typing.
        is_typing: bool,
    },
    /// Pull-based refresh of the online friend set.
    #[serde(rename = "get-online-friends")]
    GetOnlineFriends,
    /// Challenge another user to a game.
    #[serde(rename = "game-invite", rename_all = "camelCase")]
    GameInvite {
        /// Caller-supplied game ID, unique per attempt.
        game_id: Uuid,
        /// Challenging user.
        from: Uuid,
        /// Challenged user.
        to: Uuid,
        /// Client-proposed expiry; the server recomputes it from its own
        /// clock so countdowns are clock-skew-robust.
        expires_at: Option<DateTime<Utc>>,
    },
    /// Accept a pending invitation.
    #[serde(rename = "game-invite-accepted", rename_all = "camelCase")]
    GameInviteAccepted {
        /// Game ID of the invitation.
        game_id: Uuid,
        /// Challenging user.
        from: Uuid,
        /// Challenged user.
        to: Uuid,
    },
    /// Decline a pending invitation.
    #[serde(rename = "game-invite-declined", rename_all = "camelCase")]
    GameInviteDeclined {
        /// Challenging user.
        from: Uuid,
        /// Challenged user.
        to: Uuid,
    },
    /// Play a move in a live game.
    #[serde(rename = "game-move", rename_all = "camelCase")]
    GameMove {
        /// Game ID.
        game_id: Uuid,
        /// Board position, 0..=8.
        position: usize,
        /// The acting player.
        player: Uuid,
        /// Accepted for wire compatibility; the turn flip derives from the
        /// session participants, not this field.
        #[serde(default)]
        opponent: Option<Uuid>,
    },
    /// Manual online re-assert.
    #[serde(rename = "user-online", rename_all = "camelCase")]
    UserOnline {
        /// The user asserting their presence.
        user_id: Uuid,
    },
    /// Keepalive probe.
    #[serde(rename = "ping")]
    Ping,
}

/// Events sent by the server to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// Private chat message delivery.
    #[serde(rename = "private-message", rename_all = "camelCase")]
    PrivateMessage {
        /// The full message, including its persisted ID.
        message: ChatMessage,
        /// Sending user.
        from: Uuid,
    },
    /// Typing indicator from another user.
    #[serde(rename = "typing", rename_all = "camelCase")]
    Typing {
        /// Sending user.
        from: Uuid,
        /// Whether the sender is currently typing.
        is_typing: bool,
    },
    /// Response to a `get-online-friends` request.
    #[serde(rename = "online-friends-list", rename_all = "camelCase")]
    OnlineFriendsList {
        /// IDs of friends with a live connection.
        users: Vec<Uuid>,
    },
    /// A friend came online.
    #[serde(rename = "friend-online", rename_all = "camelCase")]
    FriendOnline {
        /// The friend's user ID.
        user_id: Uuid,
    },
    /// A friend went offline.
    #[serde(rename = "friend-offline", rename_all = "camelCase")]
    FriendOffline {
        /// The friend's user ID.
        user_id: Uuid,
    },
    /// An incoming game invitation.
    #[serde(rename = "receive-game-invite", rename_all = "camelCase")]
    ReceiveGameInvite {
        /// Game ID.
        game_id: Uuid,
        /// Challenging user.
        from: Uuid,
        /// Absolute expiry from the server clock.
        expires_at: DateTime<Utc>,
        /// Invitation status (always PENDING at delivery time).
        status: GameRequestStatus,
    },
    /// The challenged user accepted.
    #[serde(rename = "game-invite-accepted", rename_all = "camelCase")]
    GameInviteAccepted {
        /// Game ID.
        game_id: Uuid,
        /// Challenging user.
        from: Uuid,
        /// Challenged user.
        to: Uuid,
    },
    /// The challenged user declined.
    #[serde(rename = "game-invite-declined", rename_all = "camelCase")]
    GameInviteDeclined {
        /// Challenging user.
        from: Uuid,
        /// Challenged user.
        to: Uuid,
    },
    /// The invitation timed out without a response.
    #[serde(rename = "game-invite-expired", rename_all = "camelCase")]
    GameInviteExpired {
        /// Game ID.
        game_id: Uuid,
        /// Challenging user.
        from: Uuid,
        /// Challenged user.
        to: Uuid,
    },
    /// The client should refetch its game request list.
    #[serde(rename = "update-game-requests")]
    UpdateGameRequests,
    /// A game session started.
    #[serde(rename = "game-start", rename_all = "camelCase")]
    GameStart {
        /// Game ID.
        game_id: Uuid,
        /// The player who moves first.
        starting_player: Uuid,
    },
    /// A move was accepted.
    #[serde(rename = "game-move", rename_all = "camelCase")]
    GameMove {
        /// Game ID.
        game_id: Uuid,
        /// Board position, 0..=8.
        position: usize,
        /// The acting player.
        player: Uuid,
    },
    /// The game reached a terminal outcome.
    #[serde(rename = "game-over", rename_all = "camelCase")]
    GameOver {
        /// Game ID.
        game_id: Uuid,
        /// Winning player, absent on a draw.
        winner: Option<Uuid>,
        /// Whether the game ended in a draw.
        is_draw: bool,
        /// Final board state.
        board: Board,
    },
    /// The opponent's connection dropped mid-game.
    #[serde(rename = "opponent-disconnected", rename_all = "camelCase")]
    OpponentDisconnected {
        /// Game ID of the forfeited session.
        game_id: Uuid,
    },
    /// Keepalive response.
    #[serde(rename = "pong")]
    Pong,
    /// Malformed or unprocessable client event.
    #[serde(rename = "error")]
    Error {
        /// Machine-readable error code.
        code: String,
        /// Human-readable description.
        message: String,
    },
}
