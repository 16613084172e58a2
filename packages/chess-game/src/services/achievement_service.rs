use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::services::errors::achievement_service_errors::AchievementError;

#[cfg(test)]
use mockall::automock;

pub const ACHIEVEMENT_WINNER: &str = "Chess Winner";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AchievementDefinition {
    pub name: String,
    pub description: String,
    pub emoji: String,
    pub multiple: bool,
}

pub fn default_achievements() -> Vec<AchievementDefinition> {
    vec![AchievementDefinition {
        name: ACHIEVEMENT_WINNER.to_string(),
        description: "Win a game of chess".to_string(),
        emoji: "crown".to_string(),
        multiple: false,
    }]
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait AchievementGranter: Send + Sync {
    async fn grant(&self, name: &str, user_id: &str) -> Result<(), AchievementError>;
}

/// Achievement name to id table. Filled once at startup, read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct BadgeRegistry {
    ids: HashMap<String, String>,
}

impl BadgeRegistry {
    pub fn ensure(definitions: &[AchievementDefinition]) -> Self {
        let ids = definitions
            .iter()
            .map(|definition| {
                let id = Uuid::new_v4().to_string();
                debug!("Registered achievement {} as {}", definition.name, id);
                (definition.name.clone(), id)
            })
            .collect();
        BadgeRegistry { ids }
    }

    pub fn id_for(&self, name: &str) -> Option<&str> {
        self.ids.get(name).map(String::as_str)
    }
}

/// Granter that records grants locally and writes them to the log.
pub struct LoggingAchievementGranter {
    registry: BadgeRegistry,
    granted: Mutex<Vec<(String, String)>>,
}

impl LoggingAchievementGranter {
    pub fn new(registry: BadgeRegistry) -> Self {
        LoggingAchievementGranter {
            registry,
            granted: Mutex::new(vec![]),
        }
    }

    /// `(badge id, user id)` pairs in the order they were granted.
    pub async fn granted(&self) -> Vec<(String, String)> {
        self.granted.lock().await.clone()
    }
}

#[async_trait]
impl AchievementGranter for LoggingAchievementGranter {
    async fn grant(&self, name: &str, user_id: &str) -> Result<(), AchievementError> {
        let badge_id = self
            .registry
            .id_for(name)
            .ok_or_else(|| AchievementError::UnknownAchievement(name.to_string()))?;

        self.granted
            .lock()
            .await
            .push((badge_id.to_string(), user_id.to_string()));
        info!("Achievement {} granted to {}", name, user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_grant_known_achievement() {
        let registry = BadgeRegistry::ensure(&default_achievements());
        let badge_id = registry.id_for(ACHIEVEMENT_WINNER).unwrap().to_string();
        let granter = LoggingAchievementGranter::new(registry);

        granter.grant(ACHIEVEMENT_WINNER, "alice").await.unwrap();

        assert_eq!(
            granter.granted().await,
            vec![(badge_id, "alice".to_string())]
        );
    }

    #[tokio::test]
    async fn test_grant_unknown_achievement() {
        let granter = LoggingAchievementGranter::new(BadgeRegistry::default());

        let result = granter.grant(ACHIEVEMENT_WINNER, "alice").await;

        assert!(matches!(
            result,
            Err(AchievementError::UnknownAchievement(name)) if name == ACHIEVEMENT_WINNER
        ));
        assert!(granter.granted().await.is_empty());
    }
}
