use chess::Board;
use std::str::FromStr;

use crate::models::{outcome::PlayerColor, played_move::PlayedMove};

/// A board plus the history that produced it.
///
/// Tracks what the bare `chess::Board` does not: the applied moves, the hash of
/// every position reached (for repetition counting) and the half-move clock.
#[derive(Debug, Clone)]
pub struct Position {
    board: Board,
    history: Vec<PlayedMove>,
    hashes: Vec<u64>,
    halfmove_clock: u32,
}

impl Position {
    pub fn new(board: Board) -> Self {
        Position {
            board,
            history: vec![],
            hashes: vec![board.get_hash()],
            halfmove_clock: 0,
        }
    }

    /// Parse a FEN string, keeping its half-move clock. Earlier positions are
    /// unknown, so repetitions count from here.
    pub fn from_fen(fen: &str) -> Result<Self, chess::Error> {
        let board = Board::from_str(fen)?;
        let halfmove_clock = fen
            .split_whitespace()
            .nth(4)
            .and_then(|field| field.parse().ok())
            .unwrap_or(0);
        Ok(Position {
            halfmove_clock,
            ..Position::new(board)
        })
    }

    pub(crate) fn push(&mut self, played: PlayedMove, board: Board, resets_clock: bool) {
        self.board = board;
        self.halfmove_clock = if resets_clock {
            0
        } else {
            self.halfmove_clock + 1
        };
        self.hashes.push(board.get_hash());
        self.history.push(played);
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn side_to_move(&self) -> PlayerColor {
        PlayerColor::from(self.board.side_to_move())
    }

    pub fn history(&self) -> &[PlayedMove] {
        &self.history
    }

    pub fn last_move(&self) -> Option<&PlayedMove> {
        self.history.last()
    }

    pub fn move_count(&self) -> usize {
        self.history.len()
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    /// How many times the current position has occurred, itself included.
    pub fn repetitions(&self) -> usize {
        let current = self.board.get_hash();
        self.hashes.iter().filter(|hash| **hash == current).count()
    }

    pub fn fen(&self) -> String {
        format!("{}", self.board)
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::new(Board::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_fen_keeps_halfmove_clock() {
        let position = Position::from_fen("8/8/8/4k3/8/8/8/R3K3 w - - 37 60").unwrap();

        assert_eq!(position.halfmove_clock(), 37);
        assert_eq!(position.move_count(), 0);
        assert_eq!(position.repetitions(), 1);
    }

    #[test]
    fn test_from_fen_rejects_garbage() {
        assert!(Position::from_fen("not a position").is_err());
    }
}
