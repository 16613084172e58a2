#[derive(Debug)]
pub enum AchievementError {
    UnknownAchievement(String),
    Request(String),
}

impl std::fmt::Display for AchievementError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AchievementError::UnknownAchievement(name) => {
                write!(f, "Achievement not recognized: {}", name)
            }
            AchievementError::Request(msg) => write!(f, "Achievement request failed: {}", msg),
        }
    }
}

impl std::error::Error for AchievementError {}
