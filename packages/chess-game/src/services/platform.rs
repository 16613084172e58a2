use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::models::announcement::AnnouncementContent;
use crate::services::errors::platform_errors::PlatformError;

#[cfg(test)]
use mockall::automock;

/// The parts of the chat platform a game needs: a conversation between two
/// players, their display names, and one message per game that is kept up to
/// date.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    async fn direct_conversation(
        &self,
        player_a: &str,
        player_b: &str,
    ) -> Result<String, PlatformError>;

    async fn username(&self, user_id: &str) -> Result<String, PlatformError>;

    /// Posts the announcement and returns the id the platform gave it.
    async fn create_announcement(
        &self,
        content: &AnnouncementContent,
    ) -> Result<String, PlatformError>;

    async fn update_announcement(&self, content: &AnnouncementContent)
        -> Result<(), PlatformError>;
}

/// In-process platform used by the console and by tests.
#[derive(Default)]
pub struct LocalPlatform {
    display_names: HashMap<String, String>,
    announcements: Mutex<HashMap<String, AnnouncementContent>>,
}

impl LocalPlatform {
    pub fn new() -> Self {
        LocalPlatform::default()
    }

    pub fn with_display_name(mut self, user_id: &str, name: &str) -> Self {
        self.display_names
            .insert(user_id.to_string(), name.to_string());
        self
    }

    pub async fn announcement(&self, announcement_id: &str) -> Option<AnnouncementContent> {
        self.announcements
            .lock()
            .await
            .get(announcement_id)
            .cloned()
    }
}

#[async_trait]
impl ChatPlatform for LocalPlatform {
    async fn direct_conversation(
        &self,
        player_a: &str,
        player_b: &str,
    ) -> Result<String, PlatformError> {
        let mut members = [player_a, player_b];
        members.sort_unstable();
        Ok(members.join("__"))
    }

    async fn username(&self, user_id: &str) -> Result<String, PlatformError> {
        Ok(self
            .display_names
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| user_id.to_string()))
    }

    async fn create_announcement(
        &self,
        content: &AnnouncementContent,
    ) -> Result<String, PlatformError> {
        let id = Uuid::new_v4().to_string();
        let mut stored = content.clone();
        stored.id = Some(id.clone());
        self.announcements.lock().await.insert(id.clone(), stored);
        debug!("Created announcement {} in {}", id, content.conversation_id);
        Ok(id)
    }

    async fn update_announcement(
        &self,
        content: &AnnouncementContent,
    ) -> Result<(), PlatformError> {
        let id = content
            .id
            .clone()
            .ok_or_else(|| PlatformError::NotFound("announcement without id".to_string()))?;

        let mut announcements = self.announcements.lock().await;
        if !announcements.contains_key(&id) {
            return Err(PlatformError::NotFound(format!("announcement {}", id)));
        }
        announcements.insert(id, content.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content() -> AnnouncementContent {
        AnnouncementContent {
            id: None,
            conversation_id: "alice__bob".to_string(),
            author_id: "chess-bot".to_string(),
            title: "Chess game".to_string(),
            image_url: "http://localhost/images/alice__bob".to_string(),
            text: "White: alice\nBlack: bob".to_string(),
            footer: None,
            actions: vec![],
        }
    }

    #[tokio::test]
    async fn test_direct_conversation_is_order_independent() {
        let platform = LocalPlatform::new();

        let forward = platform.direct_conversation("alice", "bob").await.unwrap();
        let backward = platform.direct_conversation("bob", "alice").await.unwrap();

        assert_eq!(forward, backward);
        assert_eq!(forward, "alice__bob");
    }

    #[tokio::test]
    async fn test_username_falls_back_to_id() {
        let platform = LocalPlatform::new().with_display_name("alice", "Alice");

        assert_eq!(platform.username("alice").await.unwrap(), "Alice");
        assert_eq!(platform.username("bob").await.unwrap(), "bob");
    }

    #[tokio::test]
    async fn test_create_then_update_announcement() {
        let platform = LocalPlatform::new();
        let id = platform.create_announcement(&content()).await.unwrap();

        let mut updated = content();
        updated.id = Some(id.clone());
        updated.footer = Some("White won by Resignation!".to_string());
        platform.update_announcement(&updated).await.unwrap();

        let stored = platform.announcement(&id).await.unwrap();
        assert_eq!(stored.footer.as_deref(), Some("White won by Resignation!"));
    }

    #[tokio::test]
    async fn test_update_unknown_announcement() {
        let platform = LocalPlatform::new();
        let mut missing = content();
        missing.id = Some("nope".to_string());

        let result = platform.update_announcement(&missing).await;

        assert!(matches!(result, Err(PlatformError::NotFound(_))));
    }
}
