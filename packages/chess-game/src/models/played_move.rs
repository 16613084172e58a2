use chess::{ChessMove, Piece, Square};

use crate::models::outcome::PlayerColor;

/// A move that has been applied to a position, with the tags needed to
/// annotate and render it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayedMove {
    pub chess_move: ChessMove,
    pub uci: String,
    pub san: String,
    pub mover: PlayerColor,
    pub piece: Piece,
    pub is_capture: bool,
    pub is_en_passant: bool,
    pub is_castle: bool,
    pub is_check: bool,
    pub is_checkmate: bool,
    pub promoted_to: Option<Piece>,
}

impl PlayedMove {
    pub fn from(&self) -> Square {
        self.chess_move.get_source()
    }

    pub fn to(&self) -> Square {
        self.chess_move.get_dest()
    }

    /// Square the captured piece stood on. For en passant this is the
    /// destination file on the departure rank, since the captured pawn never
    /// occupies the destination square.
    pub fn capture_square(&self) -> Option<Square> {
        if !self.is_capture {
            return None;
        }
        if self.is_en_passant {
            Some(Square::make_square(self.from().get_rank(), self.to().get_file()))
        } else {
            Some(self.to())
        }
    }
}

pub fn piece_name(piece: Piece) -> &'static str {
    match piece {
        Piece::King => "King",
        Piece::Queen => "Queen",
        Piece::Bishop => "Bishop",
        Piece::Knight => "Knight",
        Piece::Rook => "Rook",
        Piece::Pawn => "Pawn",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn played(from: &str, to: &str, is_capture: bool, is_en_passant: bool) -> PlayedMove {
        let source = Square::from_str(from).unwrap();
        let dest = Square::from_str(to).unwrap();
        PlayedMove {
            chess_move: ChessMove::new(source, dest, None),
            uci: format!("{}{}", from, to),
            san: String::new(),
            mover: PlayerColor::White,
            piece: Piece::Pawn,
            is_capture,
            is_en_passant,
            is_castle: false,
            is_check: false,
            is_checkmate: false,
            promoted_to: None,
        }
    }

    #[test]
    fn test_capture_square_is_destination_for_normal_capture() {
        let mv = played("e4", "d5", true, false);

        assert_eq!(mv.capture_square(), Some(Square::from_str("d5").unwrap()));
    }

    #[test]
    fn test_capture_square_for_en_passant_uses_departure_rank() {
        let mv = played("e5", "d6", true, true);

        assert_eq!(mv.capture_square(), Some(Square::from_str("d5").unwrap()));
    }

    #[test]
    fn test_quiet_move_has_no_capture_square() {
        let mv = played("e2", "e4", false, false);

        assert_eq!(mv.capture_square(), None);
    }

    #[test]
    fn test_piece_names() {
        assert_eq!(piece_name(Piece::Queen), "Queen");
        assert_eq!(piece_name(Piece::Knight), "Knight");
    }
}
