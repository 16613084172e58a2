use std::env;

pub const DEFAULT_SITE_URL: &str = "http://localhost:8065";
pub const DEFAULT_PLUGIN_ID: &str = "chess";
pub const DEFAULT_BOT_USER_ID: &str = "chess-bot";

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    InvalidSiteUrl(String),
    Missing(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidSiteUrl(url) => {
                write!(f, "Site URL must start with http:// or https://: {}", url)
            }
            ConfigError::Missing(name) => write!(f, "{} must not be empty", name),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Deployment settings. Links placed in announcements are built from these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub site_url: String,
    pub plugin_id: String,
    pub bot_user_id: String,
    /// DynamoDB table holding game records. `None` keeps games in memory.
    pub games_table: Option<String>,
}

impl Config {
    pub fn new(site_url: &str, plugin_id: &str, bot_user_id: &str) -> Self {
        Config {
            site_url: site_url.trim_end_matches('/').to_string(),
            plugin_id: plugin_id.to_string(),
            bot_user_id: bot_user_id.to_string(),
            games_table: None,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let site_url = lookup("CHESS_SITE_URL").unwrap_or_else(|| DEFAULT_SITE_URL.to_string());
        if !(site_url.starts_with("http://") || site_url.starts_with("https://")) {
            return Err(ConfigError::InvalidSiteUrl(site_url));
        }

        let plugin_id = lookup("CHESS_PLUGIN_ID").unwrap_or_else(|| DEFAULT_PLUGIN_ID.to_string());
        if plugin_id.trim().is_empty() {
            return Err(ConfigError::Missing("CHESS_PLUGIN_ID".to_string()));
        }

        let bot_user_id =
            lookup("CHESS_BOT_USER_ID").unwrap_or_else(|| DEFAULT_BOT_USER_ID.to_string());
        if bot_user_id.trim().is_empty() {
            return Err(ConfigError::Missing("CHESS_BOT_USER_ID".to_string()));
        }

        let mut config = Config::new(&site_url, plugin_id.trim(), bot_user_id.trim());
        config.games_table = lookup("CHESS_GAMES_TABLE").filter(|table| !table.trim().is_empty());
        Ok(config)
    }

    pub fn plugin_url(&self) -> String {
        format!("{}/plugins/{}", self.site_url, self.plugin_id)
    }

    pub fn image_url(&self, game_id: &str, version: u64) -> String {
        // The version busts client-side image caches after every change
        format!("{}/images/{}?v={}", self.plugin_url(), game_id, version)
    }

    pub fn move_url(&self, game_id: &str) -> String {
        format!("{}/move/{}", self.plugin_url(), game_id)
    }

    pub fn resign_url(&self, game_id: &str) -> String {
        format!("{}/resign/{}", self.plugin_url(), game_id)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new(DEFAULT_SITE_URL, DEFAULT_PLUGIN_ID, DEFAULT_BOT_USER_ID)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config, Config::default());
        assert!(config.games_table.is_none());
    }

    #[test]
    fn test_reads_all_variables() {
        let config = Config::from_lookup(lookup(&[
            ("CHESS_SITE_URL", "https://chat.example.com/"),
            ("CHESS_PLUGIN_ID", "com.example.chess"),
            ("CHESS_BOT_USER_ID", "bot-42"),
            ("CHESS_GAMES_TABLE", "chess-games"),
        ]))
        .unwrap();

        assert_eq!(config.site_url, "https://chat.example.com");
        assert_eq!(config.plugin_id, "com.example.chess");
        assert_eq!(config.bot_user_id, "bot-42");
        assert_eq!(config.games_table.as_deref(), Some("chess-games"));
    }

    #[test]
    fn test_rejects_bad_site_url() {
        let result = Config::from_lookup(lookup(&[("CHESS_SITE_URL", "chat.example.com")]));

        assert_eq!(
            result,
            Err(ConfigError::InvalidSiteUrl("chat.example.com".to_string()))
        );
    }

    #[test]
    fn test_rejects_empty_plugin_id() {
        let result = Config::from_lookup(lookup(&[("CHESS_PLUGIN_ID", " ")]));

        assert_eq!(
            result,
            Err(ConfigError::Missing("CHESS_PLUGIN_ID".to_string()))
        );
    }

    #[test]
    fn test_action_urls() {
        let config = Config::new("https://chat.example.com", "chess", "bot");

        assert_eq!(
            config.move_url("dm-1"),
            "https://chat.example.com/plugins/chess/move/dm-1"
        );
        assert_eq!(
            config.resign_url("dm-1"),
            "https://chat.example.com/plugins/chess/resign/dm-1"
        );
        assert_eq!(
            config.image_url("dm-1", 3),
            "https://chat.example.com/plugins/chess/images/dm-1?v=3"
        );
    }
}
