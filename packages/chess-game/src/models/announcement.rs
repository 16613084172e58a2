use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostAction {
    pub name: String,
    pub url: String,
}

/// The chat message that represents a game. Created once, then updated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnouncementContent {
    pub id: Option<String>,
    pub conversation_id: String,
    pub author_id: String,
    pub title: String,
    pub image_url: String,
    pub text: String,
    pub footer: Option<String>,
    pub actions: Vec<PostAction>,
}

impl AnnouncementContent {
    pub fn action(&self, name: &str) -> Option<&PostAction> {
        self.actions.iter().find(|action| action.name == name)
    }
}
