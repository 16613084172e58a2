#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChessServiceError {
    IllegalMove(String),
    InvalidPosition(String),
    GameOver(String),
}

impl std::fmt::Display for ChessServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChessServiceError::IllegalMove(msg) => write!(f, "Illegal move: {}", msg),
            ChessServiceError::InvalidPosition(msg) => write!(f, "Invalid position: {}", msg),
            ChessServiceError::GameOver(msg) => write!(f, "Game over: {}", msg),
        }
    }
}

impl std::error::Error for ChessServiceError {}
