use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerColor {
    White,
    Black,
}

impl PlayerColor {
    /// Side to move after `move_count` half-moves from the initial position.
    /// Even counts are white's turn, odd counts are black's.
    pub fn to_move(move_count: usize) -> Self {
        if move_count % 2 == 0 {
            PlayerColor::White
        } else {
            PlayerColor::Black
        }
    }

    pub fn other(self) -> Self {
        match self {
            PlayerColor::White => PlayerColor::Black,
            PlayerColor::Black => PlayerColor::White,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PlayerColor::White => "White",
            PlayerColor::Black => "Black",
        }
    }
}

impl fmt::Display for PlayerColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<chess::Color> for PlayerColor {
    fn from(color: chess::Color) -> Self {
        match color {
            chess::Color::White => PlayerColor::White,
            chess::Color::Black => PlayerColor::Black,
        }
    }
}

impl From<PlayerColor> for chess::Color {
    fn from(color: PlayerColor) -> Self {
        match color {
            PlayerColor::White => chess::Color::White,
            PlayerColor::Black => chess::Color::Black,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    InProgress,
    WhiteWon,
    BlackWon,
    Draw,
}

impl Outcome {
    pub fn won_by(color: PlayerColor) -> Self {
        match color {
            PlayerColor::White => Outcome::WhiteWon,
            PlayerColor::Black => Outcome::BlackWon,
        }
    }

    pub fn winner(self) -> Option<PlayerColor> {
        match self {
            Outcome::WhiteWon => Some(PlayerColor::White),
            Outcome::BlackWon => Some(PlayerColor::Black),
            Outcome::InProgress | Outcome::Draw => None,
        }
    }
}

/// How a decided game reached its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Method {
    Checkmate,
    Resignation,
    DrawOffer,
    Stalemate,
    FiftyMoveRule,
    SeventyFiveMoveRule,
    ThreefoldRepetition,
    FivefoldRepetition,
    InsufficientMaterial,
    NoMethod,
}

impl Method {
    pub fn display_name(self) -> &'static str {
        match self {
            Method::Checkmate => "Checkmate",
            Method::DrawOffer => "Draw offer",
            Method::FiftyMoveRule => "Fifty move rule",
            Method::FivefoldRepetition => "Fivefold Repetition",
            Method::InsufficientMaterial => "Insufficient Material",
            Method::NoMethod => "No method",
            Method::Resignation => "Resignation",
            Method::SeventyFiveMoveRule => "Seventy five move rule",
            Method::Stalemate => "Stalemate",
            Method::ThreefoldRepetition => "Threefold repetition",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameStatus {
    pub outcome: Outcome,
    pub method: Method,
}

impl GameStatus {
    pub fn in_progress() -> Self {
        GameStatus {
            outcome: Outcome::InProgress,
            method: Method::NoMethod,
        }
    }

    pub fn won(color: PlayerColor, method: Method) -> Self {
        GameStatus {
            outcome: Outcome::won_by(color),
            method,
        }
    }

    pub fn draw(method: Method) -> Self {
        GameStatus {
            outcome: Outcome::Draw,
            method,
        }
    }

    pub fn is_in_progress(&self) -> bool {
        self.outcome == Outcome::InProgress
    }

    /// Footer line shown under a decided game's announcement.
    pub fn footer(&self) -> Option<String> {
        match self.outcome {
            Outcome::InProgress => None,
            Outcome::WhiteWon => Some(format!("White won by {}!", self.method)),
            Outcome::BlackWon => Some(format!("Black won by {}!", self.method)),
            Outcome::Draw => Some(format!("Draw due to {}!", self.method)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_turn_follows_move_count_parity() {
        assert_eq!(PlayerColor::to_move(0), PlayerColor::White);
        assert_eq!(PlayerColor::to_move(1), PlayerColor::Black);
        assert_eq!(PlayerColor::to_move(2), PlayerColor::White);
        assert_eq!(PlayerColor::to_move(41), PlayerColor::Black);
    }

    #[test]
    fn test_color_conversion() {
        assert_eq!(PlayerColor::from(chess::Color::Black), PlayerColor::Black);
        assert_eq!(chess::Color::from(PlayerColor::White), chess::Color::White);
        assert_eq!(PlayerColor::White.other(), PlayerColor::Black);
    }

    #[rstest]
    #[case(Method::Checkmate, "Checkmate")]
    #[case(Method::DrawOffer, "Draw offer")]
    #[case(Method::FiftyMoveRule, "Fifty move rule")]
    #[case(Method::FivefoldRepetition, "Fivefold Repetition")]
    #[case(Method::InsufficientMaterial, "Insufficient Material")]
    #[case(Method::NoMethod, "No method")]
    #[case(Method::Resignation, "Resignation")]
    #[case(Method::SeventyFiveMoveRule, "Seventy five move rule")]
    #[case(Method::Stalemate, "Stalemate")]
    #[case(Method::ThreefoldRepetition, "Threefold repetition")]
    fn test_method_display_names(#[case] method: Method, #[case] expected: &str) {
        assert_eq!(method.to_string(), expected);
    }

    #[test]
    fn test_footer_text() {
        assert_eq!(GameStatus::in_progress().footer(), None);
        assert_eq!(
            GameStatus::won(PlayerColor::Black, Method::Checkmate).footer(),
            Some("Black won by Checkmate!".to_string())
        );
        assert_eq!(
            GameStatus::won(PlayerColor::White, Method::Resignation).footer(),
            Some("White won by Resignation!".to_string())
        );
        assert_eq!(
            GameStatus::draw(Method::Stalemate).footer(),
            Some("Draw due to Stalemate!".to_string())
        );
    }

    #[test]
    fn test_winner() {
        assert_eq!(Outcome::WhiteWon.winner(), Some(PlayerColor::White));
        assert_eq!(Outcome::Draw.winner(), None);
        assert_eq!(Outcome::InProgress.winner(), None);
    }
}
