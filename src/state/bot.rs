//! The `Bot` - configuration, collaborators and verification state shared by
//! every event task.

use crate::config::Config;
use crate::mail::Mailer;
use crate::model::Message;
use crate::network::Platform;
use crate::services::verification::{TokenGenerator, VerificationStore};
use serenity::model::id::ChannelId;
use std::sync::Arc;
use tracing::warn;

/// Collaborators needed to build a [`Bot`].
pub struct BotParams {
    pub config: Config,
    pub platform: Arc<dyn Platform>,
    pub mailer: Arc<dyn Mailer>,
    pub tokens: Arc<dyn TokenGenerator>,
}

/// Shared state handed to every handler.
pub struct Bot {
    pub config: Config,
    pub platform: Arc<dyn Platform>,
    pub mailer: Arc<dyn Mailer>,
    pub tokens: Arc<dyn TokenGenerator>,
    /// Users mid-verification. Starts empty on every boot.
    pub verification: VerificationStore,
}

impl Bot {
    pub fn new(params: BotParams) -> Self {
        Self {
            config: params.config,
            platform: params.platform,
            mailer: params.mailer,
            tokens: params.tokens,
            verification: VerificationStore::new(),
        }
    }

    /// Send text to a channel, logging (not propagating) failure.
    pub async fn reply(&self, channel: ChannelId, text: &str) {
        if let Err(e) = self.platform.send_message(channel, text).await {
            warn!(channel_id = %channel, error = %e, "Failed to send reply");
        }
    }

    /// Whether the message was authored inside the committee guild.
    pub fn is_committee(&self, msg: &Message) -> bool {
        msg.in_guild(self.config.discord.servers.committee)
    }

    /// Committee member posting in the private events channel.
    pub fn in_committee_channel(&self, msg: &Message) -> bool {
        self.is_committee(msg) && msg.channel_id == self.config.discord.channels.private_events
    }

    /// Text a message starts with when it invokes `command` with arguments.
    pub fn trigger(&self, command: &str) -> String {
        format!("{}{} ", self.config.bot.prefix, command)
    }
}
