use tracing::error;

use crate::repositories::errors::game_repository_errors::GameRepositoryError;
use crate::services::errors::{
    board_renderer_errors::RenderError, chess_service_errors::ChessServiceError,
    platform_errors::PlatformError,
};

pub const GENERIC_FAILURE_MESSAGE: &str =
    "An unknown error occurred. Please talk to your system administrator for help.";

#[derive(Debug)]
pub enum GameError {
    GameAlreadyActive,
    NoSuchGame,
    NotYourTurn,
    NotAParticipant,
    IllegalMove(String),
    SelfChallenge,
    GameOver,
    NoDrawOffer,
    NoDrawToClaim,
    Conflict,
    StoreUnavailable(String),
    RenderFailed(String),
    CorruptRecord(String),
    PlatformUnavailable(String),
}

impl GameError {
    /// Errors caused by what the player asked for, as opposed to infrastructure.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            GameError::GameAlreadyActive
                | GameError::NoSuchGame
                | GameError::NotYourTurn
                | GameError::NotAParticipant
                | GameError::IllegalMove(_)
                | GameError::SelfChallenge
                | GameError::GameOver
                | GameError::NoDrawOffer
                | GameError::NoDrawToClaim
                | GameError::Conflict
        )
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, GameError::Conflict)
    }

    /// Text to show the player. Infrastructure failures are logged and
    /// replaced by a generic message.
    pub fn user_message(&self) -> String {
        if self.is_user_error() {
            self.to_string()
        } else {
            error!("Game operation failed: {}", self);
            GENERIC_FAILURE_MESSAGE.to_string()
        }
    }
}

impl std::fmt::Display for GameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameError::GameAlreadyActive => {
                write!(f, "There is still an active game in this conversation")
            }
            GameError::NoSuchGame => write!(f, "No game started"),
            GameError::NotYourTurn => write!(f, "It is not your turn"),
            GameError::NotAParticipant => write!(f, "You are not playing this game"),
            GameError::IllegalMove(reason) => write!(f, "Illegal move: {}", reason),
            GameError::SelfChallenge => write!(f, "You cannot challenge yourself"),
            GameError::GameOver => write!(f, "The game is already over"),
            GameError::NoDrawOffer => write!(f, "There is no draw offer to accept"),
            GameError::NoDrawToClaim => write!(f, "No draw can be claimed in this position"),
            GameError::Conflict => write!(
                f,
                "The game changed while your action was processed, please try again"
            ),
            GameError::StoreUnavailable(msg) => write!(f, "Store unavailable: {}", msg),
            GameError::RenderFailed(msg) => write!(f, "Render failed: {}", msg),
            GameError::CorruptRecord(msg) => write!(f, "Corrupt game record: {}", msg),
            GameError::PlatformUnavailable(msg) => write!(f, "Platform unavailable: {}", msg),
        }
    }
}

impl std::error::Error for GameError {}

impl From<GameRepositoryError> for GameError {
    fn from(err: GameRepositoryError) -> Self {
        match err {
            GameRepositoryError::Conflict(_) => GameError::Conflict,
            GameRepositoryError::Serialization(msg) => GameError::CorruptRecord(msg),
            GameRepositoryError::Store(msg) => GameError::StoreUnavailable(msg),
        }
    }
}

impl From<ChessServiceError> for GameError {
    fn from(err: ChessServiceError) -> Self {
        match err {
            ChessServiceError::IllegalMove(reason) => GameError::IllegalMove(reason),
            ChessServiceError::GameOver(_) => GameError::GameOver,
            ChessServiceError::InvalidPosition(msg) => GameError::CorruptRecord(msg),
        }
    }
}

impl From<PlatformError> for GameError {
    fn from(err: PlatformError) -> Self {
        GameError::PlatformUnavailable(err.to_string())
    }
}

impl From<RenderError> for GameError {
    fn from(err: RenderError) -> Self {
        GameError::RenderFailed(err.to_string())
    }
}
