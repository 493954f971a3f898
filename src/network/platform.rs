//! Outbound platform capability.

use crate::error::PlatformError;
use crate::model::{Attachment, Message, TextChannel};
use async_trait::async_trait;
use bytes::Bytes;
use serenity::model::id::{ChannelId, GuildId, MessageId, RoleId, UserId};

/// Most messages the platform returns for a single history request.
pub const HISTORY_LIMIT: u8 = 100;

/// A file to upload alongside message text.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub filename: String,
    pub body: Bytes,
}

impl FileUpload {
    pub fn new(filename: impl Into<String>, body: Bytes) -> Self {
        Self {
            filename: filename.into(),
            body,
        }
    }
}

/// Everything handlers may ask of the chat platform.
///
/// Implementations absorb rate limiting; any error returned is final for
/// that call.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Post text to a channel.
    async fn send_message(&self, channel: ChannelId, content: &str) -> Result<(), PlatformError>;

    /// Post text with an attached file.
    async fn send_file(
        &self,
        channel: ChannelId,
        content: &str,
        file: FileUpload,
    ) -> Result<(), PlatformError>;

    /// Most recent messages in a channel, newest first.
    async fn channel_messages(
        &self,
        channel: ChannelId,
        limit: u8,
    ) -> Result<Vec<Message>, PlatformError>;

    /// Delete a message.
    async fn delete_message(
        &self,
        channel: ChannelId,
        message: MessageId,
    ) -> Result<(), PlatformError>;

    /// Open (or reuse) the direct-message channel with a user.
    async fn create_dm(&self, user: UserId) -> Result<ChannelId, PlatformError>;

    /// Grant a role to a guild member.
    async fn add_role(
        &self,
        guild: GuildId,
        user: UserId,
        role: RoleId,
    ) -> Result<(), PlatformError>;

    /// The guild's system (welcome) channel, if it has one.
    async fn system_channel(&self, guild: GuildId) -> Result<Option<ChannelId>, PlatformError>;

    /// Text channels of a guild.
    async fn text_channels(&self, guild: GuildId) -> Result<Vec<TextChannel>, PlatformError>;

    /// Download an attachment's bytes.
    async fn fetch_attachment(&self, attachment: &Attachment) -> Result<Bytes, PlatformError>;
}
