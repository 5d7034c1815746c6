//! Game engine — session table, move validation, and terminal detection.
//!
//! The engine is the single authority on game state. Clients submit moves;
//! the engine validates them against the session (membership, turn order,
//! cell vacancy) and broadcasts accepted moves to the session room.
//! Invalid moves are dropped silently, matching the at-most-once,
//! best-effort posture of the rest of the realtime surface.

use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

use crate::connection::registry::ConnectionRegistry;
use crate::message::types::ServerEvent;
use crate::metrics::RealtimeMetrics;
use crate::room::registry::{game_room, RoomRegistry};

use super::board::Board;
use super::session::GameSession;

/// Chooses which participant moves first.
///
/// Injected so tests can pin the opening player; production wiring uses
/// [`RandomFirstMover`].
pub trait FirstMoverPicker: Send + Sync {
    fn pick(&self, players: [Uuid; 2]) -> Uuid;
}

/// Coin-flip first mover.
#[derive(Debug, Default)]
pub struct RandomFirstMover;

impl FirstMoverPicker for RandomFirstMover {
    fn pick(&self, players: [Uuid; 2]) -> Uuid {
        if rand::random::<bool>() {
            players[0]
        } else {
            players[1]
        }
    }
}

/// Outcome of a completed session, used for the terminal broadcast.
struct TerminalState {
    winner: Option<Uuid>,
    is_draw: bool,
    board: Board,
}

pub struct GameEngine {
    /// Game ID → live session.
    sessions: DashMap<Uuid, GameSession>,
    /// Player ID → game IDs the player is currently in. Keyed so
    /// disconnect teardown never scans the session table.
    by_player: DashMap<Uuid, Vec<Uuid>>,
    rooms: Arc<RoomRegistry>,
    connections: Arc<ConnectionRegistry>,
    metrics: Arc<RealtimeMetrics>,
    first_mover: Arc<dyn FirstMoverPicker>,
}

impl GameEngine {
    pub fn new(
        rooms: Arc<RoomRegistry>,
        connections: Arc<ConnectionRegistry>,
        metrics: Arc<RealtimeMetrics>,
        first_mover: Arc<dyn FirstMoverPicker>,
    ) -> Self {
        Self {
            sessions: DashMap::new(),
            by_player: DashMap::new(),
            rooms,
            connections,
            metrics,
            first_mover,
        }
    }

    /// Start a session for an accepted invitation.
    ///
    /// Both players join the session room and receive `game-start` naming
    /// the opening player. A game ID already in play is ignored.
    pub fn create_session(&self, game_id: Uuid, player_a: Uuid, player_b: Uuid) {
        if self.sessions.contains_key(&game_id) {
            tracing::debug!(game_id = %game_id, "Session already exists, ignoring");
            return;
        }

        let room = game_room(game_id);
        self.rooms.join(&room, player_a);
        self.rooms.join(&room, player_b);

        let players = [player_a, player_b];
        let starting_player = self.first_mover.pick(players);

        self.sessions.insert(
            game_id,
            GameSession {
                game_id,
                players,
                board: Board::new(),
                current_turn: starting_player,
                room: room.clone(),
            },
        );
        for player in players {
            self.by_player.entry(player).or_default().push(game_id);
        }

        self.broadcast(
            &room,
            ServerEvent::GameStart {
                game_id,
                starting_player,
            },
        );
        self.metrics.record_game_started();

        tracing::info!(
            game_id = %game_id,
            starting_player = %starting_player,
            "Game session started"
        );
    }

    /// Apply a move from a player.
    ///
    /// Validation order: the session must exist, the player must belong to
    /// it, it must be their turn, and the cell must be free. Any failure
    /// drops the move without a reply and leaves the session untouched.
    pub fn apply_move(&self, game_id: Uuid, player: Uuid, position: usize) {
        let (room, terminal) = {
            let Some(mut session) = self.sessions.get_mut(&game_id) else {
                tracing::debug!(game_id = %game_id, "Move for unknown game, dropping");
                return;
            };

            if !session.has_player(player) {
                tracing::debug!(game_id = %game_id, player = %player, "Move from non-participant, dropping");
                return;
            }
            if session.current_turn != player {
                tracing::debug!(game_id = %game_id, player = %player, "Move out of turn, dropping");
                return;
            }
            if !session.board.mark(position, player) {
                tracing::debug!(game_id = %game_id, position, "Move on invalid cell, dropping");
                return;
            }

            session.current_turn = session.opponent_of(player);

            let winner = session.board.winner();
            let terminal = if winner.is_some() || session.board.is_full() {
                Some(TerminalState {
                    winner,
                    is_draw: winner.is_none(),
                    board: session.board.clone(),
                })
            } else {
                None
            };

            (session.room.clone(), terminal)
        };

        self.broadcast(
            &room,
            ServerEvent::GameMove {
                game_id,
                position,
                player,
            },
        );

        if let Some(terminal) = terminal {
            self.finish(game_id, &room, terminal);
        }
    }

    /// Forfeit every session the user is part of.
    ///
    /// The remaining participant receives `opponent-disconnected`; the
    /// session is gone immediately, so late moves from either side are
    /// dropped as unknown-game.
    pub fn handle_disconnect(&self, user_id: Uuid) {
        let game_ids = self
            .by_player
            .remove(&user_id)
            .map(|(_, ids)| ids)
            .unwrap_or_default();

        for game_id in game_ids {
            let Some((_, session)) = self.sessions.remove(&game_id) else {
                continue;
            };

            let opponent = session.opponent_of(user_id);
            self.drop_player_index(opponent, game_id);
            self.connections
                .send(opponent, ServerEvent::OpponentDisconnected { game_id });
            self.rooms.remove_room(&session.room);
            self.metrics.record_game_completed();

            tracing::info!(
                game_id = %game_id,
                disconnected = %user_id,
                "Game forfeited on disconnect"
            );
        }
    }

    /// Number of live sessions.
    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }

    fn finish(&self, game_id: Uuid, room: &str, terminal: TerminalState) {
        let Some((_, session)) = self.sessions.remove(&game_id) else {
            return;
        };
        for player in session.players {
            self.drop_player_index(player, game_id);
        }

        self.broadcast(
            room,
            ServerEvent::GameOver {
                game_id,
                winner: terminal.winner,
                is_draw: terminal.is_draw,
                board: terminal.board,
            },
        );
        self.rooms.remove_room(room);
        self.metrics.record_game_completed();

        tracing::info!(
            game_id = %game_id,
            winner = ?terminal.winner,
            is_draw = terminal.is_draw,
            "Game over"
        );
    }

    fn drop_player_index(&self, player: Uuid, game_id: Uuid) {
        if let Some(mut ids) = self.by_player.get_mut(&player) {
            ids.retain(|id| *id != game_id);
        }
        self.by_player.remove_if(&player, |_, ids| ids.is_empty());
    }

    fn broadcast(&self, room: &str, event: ServerEvent) {
        for member in self.rooms.members(room) {
            self.connections.send(member, event.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    use crate::connection::handle::ConnectionHandle;

    /// Always picks the first player.
    struct FixedFirstMover;

    impl FirstMoverPicker for FixedFirstMover {
        fn pick(&self, players: [Uuid; 2]) -> Uuid {
            players[0]
        }
    }

    fn setup() -> (Arc<ConnectionRegistry>, GameEngine) {
        let rooms = Arc::new(RoomRegistry::new());
        let connections = Arc::new(ConnectionRegistry::new());
        let engine = GameEngine::new(
            rooms,
            connections.clone(),
            Arc::new(RealtimeMetrics::new()),
            Arc::new(FixedFirstMover),
        );
        (connections, engine)
    }

    fn connect(registry: &ConnectionRegistry, user: Uuid) -> mpsc::Receiver<ServerEvent> {
        let (tx, rx) = mpsc::channel(64);
        registry.register(Arc::new(ConnectionHandle::new(user, tx)));
        rx
    }

    fn drain(rx: &mut mpsc::Receiver<ServerEvent>) -> Vec<ServerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_win_broadcasts_single_game_over() {
        let (connections, engine) = setup();
        let (x, o) = (Uuid::new_v4(), Uuid::new_v4());
        let mut x_rx = connect(&connections, x);
        let game_id = Uuid::new_v4();

        engine.create_session(game_id, x, o);
        // x takes the top row, o fills in below.
        engine.apply_move(game_id, x, 0);
        engine.apply_move(game_id, o, 3);
        engine.apply_move(game_id, x, 1);
        engine.apply_move(game_id, o, 4);
        engine.apply_move(game_id, x, 2);

        let events = drain(&mut x_rx);
        let game_overs: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, ServerEvent::GameOver { .. }))
            .collect();
        assert_eq!(game_overs.len(), 1);
        assert!(matches!(
            game_overs[0],
            ServerEvent::GameOver { winner: Some(w), is_draw: false, .. } if *w == x
        ));
        assert_eq!(engine.active_count(), 0);
    }

    #[tokio::test]
    async fn test_out_of_turn_and_foreign_moves_dropped() {
        let (connections, engine) = setup();
        let (x, o, mallory) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let mut o_rx = connect(&connections, o);
        let game_id = Uuid::new_v4();

        engine.create_session(game_id, x, o);
        drain(&mut o_rx);

        // o moves first out of turn, mallory is not in the game.
        engine.apply_move(game_id, o, 0);
        engine.apply_move(game_id, mallory, 0);
        assert!(drain(&mut o_rx).is_empty());

        // The legitimate first move still lands.
        engine.apply_move(game_id, x, 0);
        let events = drain(&mut o_rx);
        assert!(matches!(
            events.as_slice(),
            [ServerEvent::GameMove { position: 0, .. }]
        ));
    }

    #[tokio::test]
    async fn test_taken_cell_keeps_turn() {
        let (connections, engine) = setup();
        let (x, o) = (Uuid::new_v4(), Uuid::new_v4());
        let mut x_rx = connect(&connections, x);
        let game_id = Uuid::new_v4();

        engine.create_session(game_id, x, o);
        engine.apply_move(game_id, x, 4);
        drain(&mut x_rx);

        // o hits the occupied cell; the turn stays with o.
        engine.apply_move(game_id, o, 4);
        assert!(drain(&mut x_rx).is_empty());
        engine.apply_move(game_id, o, 0);
        assert!(matches!(
            drain(&mut x_rx).as_slice(),
            [ServerEvent::GameMove { position: 0, .. }]
        ));
    }

    #[tokio::test]
    async fn test_draw_on_full_board() {
        let (connections, engine) = setup();
        let (x, o) = (Uuid::new_v4(), Uuid::new_v4());
        let mut x_rx = connect(&connections, x);
        let game_id = Uuid::new_v4();

        engine.create_session(game_id, x, o);
        // x: 0 2 3 7 8, o: 1 4 5 6 — full board, no line.
        for (player, position) in [
            (x, 0),
            (o, 1),
            (x, 2),
            (o, 4),
            (x, 3),
            (o, 5),
            (x, 7),
            (o, 6),
            (x, 8),
        ] {
            engine.apply_move(game_id, player, position);
        }

        let events = drain(&mut x_rx);
        assert!(events.iter().any(|e| matches!(
            e,
            ServerEvent::GameOver { winner: None, is_draw: true, .. }
        )));
        assert_eq!(engine.active_count(), 0);
    }

    #[tokio::test]
    async fn test_disconnect_forfeits_to_opponent() {
        let (connections, engine) = setup();
        let (x, o) = (Uuid::new_v4(), Uuid::new_v4());
        let mut o_rx = connect(&connections, o);
        let game_id = Uuid::new_v4();

        engine.create_session(game_id, x, o);
        drain(&mut o_rx);

        engine.handle_disconnect(x);

        let events = drain(&mut o_rx);
        assert!(matches!(
            events.as_slice(),
            [ServerEvent::OpponentDisconnected { game_id: g }] if *g == game_id
        ));
        assert_eq!(engine.active_count(), 0);

        // Late moves after the forfeit are dropped.
        engine.apply_move(game_id, o, 0);
        assert!(drain(&mut o_rx).is_empty());
    }
}
