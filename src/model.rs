//! The slice of platform records handlers work with.
//!
//! Identifiers are serenity's typed ids; records are converted from
//! serenity's models once, at the network edge, so handlers and tests never
//! touch the full gateway payloads.

use chrono::{DateTime, Utc};
use serenity::model::channel::{Attachment as DiscordAttachment, Message as DiscordMessage};
use serenity::model::id::{ChannelId, GuildId, MessageId, UserId};
use serenity::model::user::User as DiscordUser;

/// A platform account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    /// Automated (bot) account.
    pub bot: bool,
}

impl User {
    /// Mention markup that pings this user when sent in a message.
    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }
}

impl From<&DiscordUser> for User {
    fn from(user: &DiscordUser) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            bot: user.bot,
        }
    }
}

/// A file attached to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    /// Download URL.
    pub url: String,
    /// MIME type reported by the platform.
    pub content_type: Option<String>,
    pub size: u32,
}

impl Attachment {
    /// Whether the attachment is an image, by MIME type or file extension.
    pub fn is_image(&self) -> bool {
        if let Some(ct) = &self.content_type {
            return ct.starts_with("image/");
        }
        let lower = self.filename.to_ascii_lowercase();
        [".png", ".jpg", ".jpeg", ".gif", ".webp"]
            .iter()
            .any(|ext| lower.ends_with(ext))
    }
}

impl From<&DiscordAttachment> for Attachment {
    fn from(a: &DiscordAttachment) -> Self {
        Self {
            filename: a.filename.clone(),
            url: a.url.clone(),
            content_type: a.content_type.clone(),
            size: a.size,
        }
    }
}

/// A message posted to a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub channel_id: ChannelId,
    /// Absent for direct messages.
    pub guild_id: Option<GuildId>,
    pub author: User,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// Users mentioned in the content, in order of appearance.
    pub mentions: Vec<User>,
    pub attachments: Vec<Attachment>,
}

impl Message {
    /// Whether the message arrived outside any guild (a direct message).
    #[inline]
    pub fn is_direct(&self) -> bool {
        self.guild_id.is_none()
    }

    /// Whether the message was posted in the given guild.
    #[inline]
    pub fn in_guild(&self, guild: GuildId) -> bool {
        self.guild_id == Some(guild)
    }
}

impl From<&DiscordMessage> for Message {
    fn from(m: &DiscordMessage) -> Self {
        let timestamp = m
            .timestamp
            .to_rfc3339()
            .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_default();
        Self {
            id: m.id,
            channel_id: m.channel_id,
            guild_id: m.guild_id,
            author: User::from(&m.author),
            content: m.content.clone(),
            timestamp,
            mentions: m.mentions.iter().map(User::from).collect(),
            attachments: m.attachments.iter().map(Attachment::from).collect(),
        }
    }
}

/// A text channel inside a guild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChannel {
    pub id: ChannelId,
    pub name: String,
}

/// Inbound events the dispatcher acts on.
#[derive(Debug, Clone)]
pub enum Event {
    /// A message was posted in a guild channel or a DM.
    MessageCreate(Message),
    /// A user joined a guild.
    MemberAdd { guild_id: GuildId, user: User },
}
