//! Live game session state.

use uuid::Uuid;

use super::board::Board;

/// A live two-player session.
#[derive(Debug, Clone)]
pub struct GameSession {
    /// Game ID, shared with the invitation that spawned the session.
    pub game_id: Uuid,
    /// The two participants.
    pub players: [Uuid; 2],
    /// Current board state.
    pub board: Board,
    /// The player whose move is next.
    pub current_turn: Uuid,
    /// Broadcast room for this session.
    pub room: String,
}

impl GameSession {
    /// Whether the given user is one of the two participants.
    pub fn has_player(&self, user_id: Uuid) -> bool {
        self.players.contains(&user_id)
    }

    /// The other participant. Caller must ensure `user_id` is a player.
    pub fn opponent_of(&self, user_id: Uuid) -> Uuid {
        if self.players[0] == user_id {
            self.players[1]
        } else {
            self.players[0]
        }
    }
}
