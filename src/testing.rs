//! In-memory collaborators and fixtures for unit tests.

use crate::config::Config;
use crate::error::{MailError, PlatformError};
use crate::mail::{Email, MailResponse, Mailer};
use crate::model::{Attachment, Message, TextChannel, User};
use crate::network::{FileUpload, Platform};
use crate::services::verification::TokenGenerator;
use crate::state::{Bot, BotParams};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use parking_lot::Mutex;
use serenity::model::id::{ChannelId, GuildId, MessageId, RoleId, UserId};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

pub const PUBLIC_GUILD: u64 = 100;
pub const PUBLIC_ANNOUNCEMENTS: u64 = 101;
pub const PUBLIC_GENERAL: u64 = 102;
pub const COMMITTEE_GUILD: u64 = 200;
pub const PRIVATE_EVENTS: u64 = 201;
pub const COMMITTEE_CHAT: u64 = 202;
pub const TOKEN: &str = "gladly-brave-otter";

/// DM channel ids are the user id offset by this.
const DM_CHANNEL_BASE: u64 = 5_000_000;

static NEXT_ID: AtomicU64 = AtomicU64::new(10_000);

fn next_id() -> MessageId {
    MessageId::new(NEXT_ID.fetch_add(1, Ordering::Relaxed))
}

fn rejected(reason: &'static str) -> PlatformError {
    PlatformError::Discord(serenity::Error::Other(reason))
}

/// A message as sent through [`MockPlatform`].
#[derive(Debug, Clone, PartialEq)]
pub struct Sent {
    pub channel: ChannelId,
    pub content: String,
    pub filename: Option<String>,
}

/// Records every outbound call and serves canned guilds and histories.
#[derive(Default)]
pub struct MockPlatform {
    pub sent: Mutex<Vec<Sent>>,
    pub deleted: Mutex<Vec<(ChannelId, MessageId)>>,
    pub granted: Mutex<Vec<(GuildId, UserId, RoleId)>>,
    pub dms_opened: Mutex<Vec<UserId>>,
    pub history: Mutex<HashMap<ChannelId, Vec<Message>>>,
    pub history_requests: Mutex<Vec<ChannelId>>,
    /// Known guilds and their system channel.
    pub system_channels: Mutex<HashMap<GuildId, Option<ChannelId>>>,
    pub text_channels: Mutex<HashMap<GuildId, Vec<TextChannel>>>,
    pub guild_lookups: AtomicU64,
    pub failing_roles: Mutex<HashSet<RoleId>>,
    pub failing_history: Mutex<HashSet<ChannelId>>,
    pub fail_dm: AtomicBool,
}

impl MockPlatform {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_history(&self, channel: u64, messages: Vec<Message>) {
        self.history.lock().insert(ChannelId::new(channel), messages);
    }

    /// Register the public guild with `#general` as its system channel.
    pub fn add_public_guild(&self, channels: Vec<TextChannel>) {
        let guild = GuildId::new(PUBLIC_GUILD);
        self.system_channels
            .lock()
            .insert(guild, Some(ChannelId::new(PUBLIC_GENERAL)));
        self.text_channels.lock().insert(guild, channels);
    }

    pub fn fail_role(&self, role: u64) {
        self.failing_roles.lock().insert(RoleId::new(role));
    }

    pub fn fail_history(&self, channel: u64) {
        self.failing_history.lock().insert(ChannelId::new(channel));
    }

    pub fn sent_to(&self, channel: u64) -> Vec<String> {
        let channel = ChannelId::new(channel);
        self.sent
            .lock()
            .iter()
            .filter(|s| s.channel == channel)
            .map(|s| s.content.clone())
            .collect()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }

    pub fn granted_roles(&self, user: u64) -> Vec<u64> {
        let user = UserId::new(user);
        self.granted
            .lock()
            .iter()
            .filter(|(_, u, _)| *u == user)
            .map(|(_, _, r)| r.get())
            .collect()
    }

    pub fn deleted_ids(&self) -> Vec<MessageId> {
        self.deleted.lock().iter().map(|(_, m)| *m).collect()
    }
}

#[async_trait]
impl Platform for MockPlatform {
    async fn send_message(&self, channel: ChannelId, content: &str) -> Result<(), PlatformError> {
        self.sent.lock().push(Sent {
            channel,
            content: content.to_string(),
            filename: None,
        });
        Ok(())
    }

    async fn send_file(
        &self,
        channel: ChannelId,
        content: &str,
        file: FileUpload,
    ) -> Result<(), PlatformError> {
        self.sent.lock().push(Sent {
            channel,
            content: content.to_string(),
            filename: Some(file.filename),
        });
        Ok(())
    }

    async fn channel_messages(
        &self,
        channel: ChannelId,
        limit: u8,
    ) -> Result<Vec<Message>, PlatformError> {
        self.history_requests.lock().push(channel);
        if self.failing_history.lock().contains(&channel) {
            return Err(rejected("history unavailable"));
        }
        let history = self.history.lock().get(&channel).cloned().unwrap_or_default();
        Ok(history.into_iter().take(limit as usize).collect())
    }

    async fn delete_message(
        &self,
        channel: ChannelId,
        message: MessageId,
    ) -> Result<(), PlatformError> {
        self.deleted.lock().push((channel, message));
        Ok(())
    }

    async fn create_dm(&self, user: UserId) -> Result<ChannelId, PlatformError> {
        if self.fail_dm.load(Ordering::Relaxed) {
            return Err(rejected("cannot message this user"));
        }
        self.dms_opened.lock().push(user);
        Ok(ChannelId::new(dm_channel(user.get())))
    }

    async fn add_role(
        &self,
        guild: GuildId,
        user: UserId,
        role: RoleId,
    ) -> Result<(), PlatformError> {
        if self.failing_roles.lock().contains(&role) {
            return Err(rejected("missing permissions"));
        }
        self.granted.lock().push((guild, user, role));
        Ok(())
    }

    async fn system_channel(&self, guild: GuildId) -> Result<Option<ChannelId>, PlatformError> {
        self.guild_lookups.fetch_add(1, Ordering::Relaxed);
        self.system_channels
            .lock()
            .get(&guild)
            .copied()
            .ok_or_else(|| rejected("unknown guild"))
    }

    async fn text_channels(&self, guild: GuildId) -> Result<Vec<TextChannel>, PlatformError> {
        self.guild_lookups.fetch_add(1, Ordering::Relaxed);
        self.text_channels
            .lock()
            .get(&guild)
            .cloned()
            .ok_or_else(|| rejected("unknown guild"))
    }

    async fn fetch_attachment(&self, attachment: &Attachment) -> Result<Bytes, PlatformError> {
        Ok(Bytes::from(attachment.filename.clone().into_bytes()))
    }
}

/// Mail provider answering with a fixed status, or failing outright.
pub struct MockMailer {
    pub sent: Mutex<Vec<Email>>,
    /// `None` simulates a transport failure.
    pub status: Mutex<Option<u16>>,
}

impl MockMailer {
    pub fn accepting() -> Arc<Self> {
        Self::with_status(Some(202))
    }

    pub fn with_status(status: Option<u16>) -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            status: Mutex::new(status),
        })
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }
}

#[async_trait]
impl Mailer for MockMailer {
    async fn send(&self, email: &Email) -> Result<MailResponse, MailError> {
        self.sent.lock().push(email.clone());
        match *self.status.lock() {
            Some(status) => Ok(MailResponse {
                status,
                body: String::new(),
            }),
            None => Err(MailError::Unavailable("connection refused".into())),
        }
    }
}

/// Always hands out the same token.
pub struct FixedToken(pub &'static str);

impl TokenGenerator for FixedToken {
    fn generate(&self) -> String {
        self.0.to_string()
    }
}

pub fn test_config() -> Config {
    toml::from_str(&format!(
        r#"
        [bot]
        token = "token"
        prefix = "!"

        [community]
        name = "Netsoc"

        [discord]
        roles = "301,302"
        char_limit = 40
        welcome_messages = ["Welcome aboard %s!"]
        autoregister = false

        [discord.servers]
        public = "{PUBLIC_GUILD}"
        committee = "{COMMITTEE_GUILD}"

        [discord.channels]
        public_announcements = "{PUBLIC_ANNOUNCEMENTS}"
        private_events = "{PRIVATE_EVENTS}"

        [email]
        api_key = "key"
        from = "server.registration@example.org"
        domain = "@umail.ucc.ie"
        "#
    ))
    .expect("test config parses")
}

pub fn test_bot(platform: Arc<MockPlatform>, mailer: Arc<MockMailer>) -> Arc<Bot> {
    test_bot_with(test_config(), platform, mailer)
}

pub fn test_bot_with(
    config: Config,
    platform: Arc<MockPlatform>,
    mailer: Arc<MockMailer>,
) -> Arc<Bot> {
    Arc::new(Bot::new(BotParams {
        config,
        platform,
        mailer,
        tokens: Arc::new(FixedToken(TOKEN)),
    }))
}

pub fn user(id: u64) -> User {
    User {
        id: UserId::new(id),
        name: format!("user{id}"),
        bot: false,
    }
}

pub fn dm_channel(user: u64) -> u64 {
    DM_CHANNEL_BASE + user
}

pub fn guild_message(guild: u64, channel: u64, author: u64, content: &str) -> Message {
    Message {
        id: next_id(),
        channel_id: ChannelId::new(channel),
        guild_id: Some(GuildId::new(guild)),
        author: user(author),
        content: content.to_string(),
        timestamp: Utc::now(),
        mentions: Vec::new(),
        attachments: Vec::new(),
    }
}

pub fn direct_message(author: u64, content: &str) -> Message {
    Message {
        guild_id: None,
        ..guild_message(PUBLIC_GUILD, dm_channel(author), author, content)
    }
}

pub fn committee_message(content: &str) -> Message {
    guild_message(COMMITTEE_GUILD, PRIVATE_EVENTS, 900, content)
}

pub fn image(filename: &str) -> Attachment {
    Attachment {
        filename: filename.to_string(),
        url: format!("https://cdn.example.org/{filename}"),
        content_type: Some("image/jpeg".into()),
        size: 1024,
    }
}

pub fn text_channel(id: u64, name: &str) -> TextChannel {
    TextChannel {
        id: ChannelId::new(id),
        name: name.to_string(),
    }
}
