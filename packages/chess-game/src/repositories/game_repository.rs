use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use crate::models::game_record::GameRecord;
use crate::repositories::errors::game_repository_errors::GameRepositoryError;
use crate::repositories::kv_store::KvStore;

/// A record as it was read from storage, together with the exact bytes that
/// were read. The bytes are the compare-and-swap token for the next save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredGame {
    pub record: GameRecord,
    raw: Vec<u8>,
}

impl StoredGame {
    pub fn new(record: GameRecord, raw: Vec<u8>) -> Self {
        StoredGame { record, raw }
    }

    pub fn raw(&self) -> &[u8] {
        &self.raw
    }
}

#[async_trait]
pub trait GameRepository: Send + Sync {
    async fn load(&self, game_id: &str) -> Result<Option<StoredGame>, GameRepositoryError>;

    /// Persist `record`. `expected` is the copy the caller read before
    /// mutating, or `None` when the key must not exist yet. Fails with
    /// `Conflict` if the stored game changed in between.
    async fn save(
        &self,
        record: &GameRecord,
        expected: Option<&StoredGame>,
    ) -> Result<StoredGame, GameRepositoryError>;

    /// Overwrite whatever is stored for the record's id, starting again at
    /// version 1. Only for entries that can no longer be read.
    async fn replace(&self, record: &GameRecord) -> Result<StoredGame, GameRepositoryError>;
}

pub struct KvGameRepository {
    store: Arc<dyn KvStore>,
}

impl KvGameRepository {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl GameRepository for KvGameRepository {
    async fn load(&self, game_id: &str) -> Result<Option<StoredGame>, GameRepositoryError> {
        let Some(raw) = self.store.get(game_id).await? else {
            debug!("No game stored for {}", game_id);
            return Ok(None);
        };

        let record = GameRecord::from_bytes(&raw)
            .map_err(|e| GameRepositoryError::Serialization(e.to_string()))?;
        Ok(Some(StoredGame::new(record, raw)))
    }

    async fn save(
        &self,
        record: &GameRecord,
        expected: Option<&StoredGame>,
    ) -> Result<StoredGame, GameRepositoryError> {
        let mut record = record.clone();
        record.header.version = expected.map_or(1, |stored| stored.record.header.version + 1);

        let raw = record
            .to_bytes()
            .map_err(|e| GameRepositoryError::Serialization(e.to_string()))?;

        let written = self
            .store
            .compare_and_set(record.id(), expected.map(StoredGame::raw), &raw)
            .await?;
        if !written {
            info!("Rejected stale write for game {}", record.id());
            return Err(GameRepositoryError::Conflict(record.id().to_string()));
        }

        debug!(
            "Saved game {} at version {}",
            record.id(),
            record.header.version
        );
        Ok(StoredGame::new(record, raw))
    }

    async fn replace(&self, record: &GameRecord) -> Result<StoredGame, GameRepositoryError> {
        let mut record = record.clone();
        record.header.version = 1;

        let raw = record
            .to_bytes()
            .map_err(|e| GameRepositoryError::Serialization(e.to_string()))?;
        self.store.set(record.id(), &raw).await?;

        info!("Replaced stored game {}", record.id());
        Ok(StoredGame::new(record, raw))
    }
}
