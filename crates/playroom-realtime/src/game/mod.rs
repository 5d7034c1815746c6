//! Authoritative two-player tic-tac-toe sessions.

pub mod board;
pub mod engine;
pub mod session;

pub use board::Board;
pub use engine::{FirstMoverPicker, GameEngine, RandomFirstMover};
pub use session::GameSession;
