//! serenity-backed implementation of the [`Platform`] capability.
//!
//! Every call goes through serenity's [`Http`], whose ratelimiter waits out
//! per-route buckets and retries 429 responses itself. Shares the `Http` of
//! the gateway client so both draw from the same buckets.

use super::platform::{FileUpload, Platform};
use crate::error::PlatformError;
use crate::model::{Attachment, Message, TextChannel};
use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use serenity::all::{ChannelType, CreateAttachment, CreateMessage, GetMessages, Http};
use serenity::model::id::{ChannelId, GuildId, MessageId, RoleId, UserId};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Timeout for downloading an attachment from the CDN.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

pub struct DiscordPlatform {
    http: Arc<Http>,
    downloads: reqwest::Client,
    /// DM channels already opened, by recipient.
    dm_channels: DashMap<UserId, ChannelId>,
}

impl DiscordPlatform {
    pub fn new(http: Arc<Http>) -> Self {
        let downloads = reqwest::Client::builder()
            .timeout(DOWNLOAD_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http,
            downloads,
            dm_channels: DashMap::new(),
        }
    }
}

#[async_trait]
impl Platform for DiscordPlatform {
    async fn send_message(&self, channel: ChannelId, content: &str) -> Result<(), PlatformError> {
        channel
            .send_message(&*self.http, CreateMessage::new().content(content))
            .await?;
        Ok(())
    }

    async fn send_file(
        &self,
        channel: ChannelId,
        content: &str,
        file: FileUpload,
    ) -> Result<(), PlatformError> {
        let attachment = CreateAttachment::bytes(file.body.to_vec(), file.filename);
        let builder = CreateMessage::new().content(content).add_file(attachment);
        channel.send_message(&*self.http, builder).await?;
        Ok(())
    }

    async fn channel_messages(
        &self,
        channel: ChannelId,
        limit: u8,
    ) -> Result<Vec<Message>, PlatformError> {
        let messages = channel
            .messages(self.http.as_ref(), GetMessages::new().limit(limit))
            .await?;
        Ok(messages.iter().map(Message::from).collect())
    }

    async fn delete_message(
        &self,
        channel: ChannelId,
        message: MessageId,
    ) -> Result<(), PlatformError> {
        channel.delete_message(self.http.as_ref(), message).await?;
        Ok(())
    }

    async fn create_dm(&self, user: UserId) -> Result<ChannelId, PlatformError> {
        if let Some(channel) = self.dm_channels.get(&user) {
            return Ok(*channel);
        }
        let channel = user.create_dm_channel(&*self.http).await?;
        debug!(user_id = %user, channel_id = %channel.id, "Opened DM channel");
        self.dm_channels.insert(user, channel.id);
        Ok(channel.id)
    }

    async fn add_role(
        &self,
        guild: GuildId,
        user: UserId,
        role: RoleId,
    ) -> Result<(), PlatformError> {
        self.http.add_member_role(guild, user, role, None).await?;
        Ok(())
    }

    async fn system_channel(&self, guild: GuildId) -> Result<Option<ChannelId>, PlatformError> {
        let guild = self.http.get_guild(guild).await?;
        Ok(guild.system_channel_id)
    }

    async fn text_channels(&self, guild: GuildId) -> Result<Vec<TextChannel>, PlatformError> {
        let mut channels: Vec<_> = guild
            .channels(self.http.as_ref())
            .await?
            .into_values()
            .filter(|c| c.kind == ChannelType::Text)
            .collect();
        channels.sort_by_key(|c| c.position);
        Ok(channels
            .into_iter()
            .map(|c| TextChannel {
                id: c.id,
                name: c.name,
            })
            .collect())
    }

    async fn fetch_attachment(&self, attachment: &Attachment) -> Result<Bytes, PlatformError> {
        let body = self
            .downloads
            .get(&attachment.url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(body)
    }
}
