use crate::repositories::errors::kv_store_errors::KvStoreError;

#[derive(Debug)]
pub enum GameRepositoryError {
    Serialization(String),
    Store(String),
    Conflict(String),
}

impl std::fmt::Display for GameRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameRepositoryError::Serialization(msg) => {
                write!(f, "Serialization error: {}", msg)
            }
            GameRepositoryError::Store(msg) => write!(f, "Store error: {}", msg),
            GameRepositoryError::Conflict(game_id) => {
                write!(f, "Game {} was modified concurrently", game_id)
            }
        }
    }
}

impl std::error::Error for GameRepositoryError {}

impl From<KvStoreError> for GameRepositoryError {
    fn from(err: KvStoreError) -> Self {
        match err {
            KvStoreError::Serialization(msg) => GameRepositoryError::Serialization(msg),
            KvStoreError::DynamoDb(_) => GameRepositoryError::Store(err.to_string()),
        }
    }
}
