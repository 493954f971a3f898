//! Core configuration types and loading.

use serde::Deserialize;
use serenity::model::id::{ChannelId, GuildId, RoleId};
use std::path::Path;
use thiserror::Error;

/// Default SendGrid v3 send endpoint.
const SENDGRID_ENDPOINT: &str = "https://api.sendgrid.com/v3/mail/send";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Bot configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Connection and command settings.
    pub bot: BotConfig,
    /// Wording used in user-facing messages.
    #[serde(default)]
    pub community: CommunityConfig,
    /// Guild, channel and role identifiers.
    pub discord: DiscordConfig,
    /// Verification email settings.
    pub email: EmailConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Fill secrets left empty in the file from the environment.
    pub fn apply_env_overrides(&mut self) {
        if self.bot.token.is_empty()
            && let Ok(token) = std::env::var("DISCORD_TOKEN")
        {
            self.bot.token = token;
        }
        if self.email.api_key.is_empty()
            && let Ok(key) = std::env::var("SENDGRID_API_KEY")
        {
            self.email.api_key = key;
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Bot connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Platform bot token (or `DISCORD_TOKEN`).
    #[serde(default)]
    pub token: String,
    /// Prefix every guild command must start with.
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Prometheus metrics HTTP port (0 disables the endpoint).
    #[serde(default)]
    pub metrics_port: u16,
    /// Log output format.
    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_prefix() -> String {
    "!".to_string()
}

/// Community wording.
#[derive(Debug, Clone, Deserialize)]
pub struct CommunityConfig {
    /// Community name (e.g., "Netsoc").
    #[serde(default = "default_community_name")]
    pub name: String,
}

impl Default for CommunityConfig {
    fn default() -> Self {
        Self {
            name: default_community_name(),
        }
    }
}

fn default_community_name() -> String {
    "Community".to_string()
}

/// Platform identifiers and behaviour toggles.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscordConfig {
    /// Public and committee guilds.
    pub servers: ServersConfig,
    /// Announcement mirror channels.
    pub channels: ChannelsConfig,
    /// Comma-separated role ids granted on verification.
    pub roles: String,
    /// Character limit for event descriptions and announcements.
    #[serde(default = "default_char_limit")]
    pub char_limit: usize,
    /// Welcome templates; `%s` is replaced with the joiner's mention.
    #[serde(default)]
    pub welcome_messages: Vec<String>,
    /// Start registration automatically when a member joins.
    #[serde(default)]
    pub autoregister: bool,
}

impl DiscordConfig {
    /// Role ids from the comma-separated list, skipping blanks and entries
    /// that are not ids.
    pub fn role_ids(&self) -> Vec<RoleId> {
        self.role_entries()
            .filter_map(parse_id)
            .map(RoleId::new)
            .collect()
    }

    /// Entries of the role list that are not ids.
    pub fn invalid_roles(&self) -> Vec<&str> {
        self.role_entries()
            .filter(|entry| parse_id(entry).is_none())
            .collect()
    }

    fn role_entries(&self) -> impl Iterator<Item = &str> {
        self.roles.split(',').map(str::trim).filter(|r| !r.is_empty())
    }
}

fn parse_id(raw: &str) -> Option<u64> {
    raw.parse::<u64>().ok().filter(|id| *id != 0)
}

fn default_char_limit() -> usize {
    1500
}

/// Guild identifiers.
#[derive(Debug, Clone, Deserialize)]
pub struct ServersConfig {
    /// Community guild where verified members get their roles.
    pub public: GuildId,
    /// Privileged guild whose messages count as committee-authored.
    pub committee: GuildId,
}

/// Channel identifiers.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelsConfig {
    /// Public channel announcements and events are mirrored to.
    pub public_announcements: ChannelId,
    /// Private committee channel publishing commands are accepted in.
    pub private_events: ChannelId,
}

/// Verification email settings.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// Mail provider API key (or `SENDGRID_API_KEY`).
    #[serde(default)]
    pub api_key: String,
    /// Sender address.
    pub from: String,
    /// Required institutional address suffix (e.g., "@umail.ucc.ie").
    pub domain: String,
    /// Provider send endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

fn default_endpoint() -> String {
    SENDGRID_ENDPOINT.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL: &str = r#"
        [bot]
        token = "abc"

        [discord]
        roles = "1, 2,,3"

        [discord.servers]
        public = "100"
        committee = "200"

        [discord.channels]
        public_announcements = "101"
        private_events = "201"

        [email]
        from = "registration@example.org"
        domain = "@umail.ucc.ie"
    "#;

    #[test]
    fn test_defaults_applied() {
        let config: Config = toml::from_str(MINIMAL).unwrap();
        assert_eq!(config.bot.prefix, "!");
        assert_eq!(config.bot.metrics_port, 0);
        assert_eq!(config.bot.log_format, LogFormat::Text);
        assert_eq!(config.discord.char_limit, 1500);
        assert!(!config.discord.autoregister);
        assert!(config.discord.welcome_messages.is_empty());
        assert_eq!(config.email.endpoint, SENDGRID_ENDPOINT);
        assert_eq!(config.community.name, "Community");
    }

    #[test]
    fn test_role_ids_split_and_trimmed() {
        let config: Config = toml::from_str(MINIMAL).unwrap();
        let roles = config.discord.role_ids();
        assert_eq!(roles, vec![RoleId::new(1), RoleId::new(2), RoleId::new(3)]);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MINIMAL.as_bytes()).unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.discord.servers.public, GuildId::new(100));
        assert_eq!(config.discord.channels.private_events, ChannelId::new(201));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load("/nonexistent/gatewarden.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_load_rejects_missing_section() {
        let err = toml::from_str::<Config>("[bot]\nprefix = \"?\"\n").unwrap_err();
        assert!(err.to_string().contains("discord"));
    }
}
