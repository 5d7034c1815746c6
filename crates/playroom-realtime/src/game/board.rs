//! Tic-tac-toe board state and terminal detection.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The eight winning lines on a 3x3 grid, as cell index triples.
const WINNING_TRIPLES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// A 3x3 board in row-major order. Each cell holds the ID of the player
/// who claimed it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    cells: [Option<Uuid>; 9],
}

impl Board {
    /// An empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a cell for a player.
    ///
    /// Returns `false` without mutating when the position is out of range
    /// or the cell is already taken.
    pub fn mark(&mut self, position: usize, player: Uuid) -> bool {
        match self.cells.get_mut(position) {
            Some(cell @ None) => {
                *cell = Some(player);
                true
            }
            _ => false,
        }
    }

    /// The player holding a winning triple, if any.
    pub fn winner(&self) -> Option<Uuid> {
        for [a, b, c] in WINNING_TRIPLES {
            if let Some(player) = self.cells[a] {
                if self.cells[b] == Some(player) && self.cells[c] == Some(player) {
                    return Some(player);
                }
            }
        }
        None
    }

    /// Whether every cell is claimed.
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|cell| cell.is_some())
    }

    /// Read a cell.
    pub fn cell(&self, position: usize) -> Option<Uuid> {
        self.cells.get(position).copied().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_rejects_taken_and_out_of_range() {
        let mut board = Board::new();
        let (x, o) = (Uuid::new_v4(), Uuid::new_v4());

        assert!(board.mark(4, x));
        assert!(!board.mark(4, o));
        assert_eq!(board.cell(4), Some(x));
        assert!(!board.mark(9, o));
    }

    #[test]
    fn test_every_winning_triple_detected() {
        let (x, o) = (Uuid::new_v4(), Uuid::new_v4());

        for triple in WINNING_TRIPLES {
            let mut board = Board::new();
            for pos in triple {
                assert!(board.mark(pos, x));
            }
            assert_eq!(board.winner(), Some(x), "triple {triple:?} not detected");
        }

        let mut board = Board::new();
        board.mark(0, x);
        board.mark(1, o);
        board.mark(2, x);
        assert_eq!(board.winner(), None);
    }

    #[test]
    fn test_full_board_without_winner() {
        let (x, o) = (Uuid::new_v4(), Uuid::new_v4());
        let mut board = Board::new();
        // x o x / x o o / o x x — no line for either player.
        let layout = [x, o, x, x, o, o, o, x, x];
        for (pos, player) in layout.into_iter().enumerate() {
            assert!(board.mark(pos, player));
        }

        assert!(board.is_full());
        assert_eq!(board.winner(), None);
    }

    #[test]
    fn test_serializes_as_flat_array() {
        let mut board = Board::new();
        let x = Uuid::new_v4();
        board.mark(0, x);

        let json = serde_json::to_value(&board).unwrap();
        let cells = json.as_array().unwrap();
        assert_eq!(cells.len(), 9);
        assert_eq!(cells[0], serde_json::json!(x));
        assert!(cells[1].is_null());
    }
}
