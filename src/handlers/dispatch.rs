//! Routes gateway events to commands, the verification flow and the welcome.

use super::core::{Context, Registry};
use super::register::welcome_member;
use crate::model::{Event, Message, User};
use crate::services::verification;
use crate::state::Bot;
use crate::telemetry::spans;
use serenity::model::id::GuildId;
use std::sync::Arc;
use tracing::{Instrument, debug, warn};

pub struct Dispatcher {
    bot: Arc<Bot>,
    registry: Registry,
}

impl Dispatcher {
    pub fn new(bot: Arc<Bot>, registry: Registry) -> Self {
        Self { bot, registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub async fn on_event(&self, event: Event) {
        match event {
            Event::MessageCreate(msg) => {
                self.on_message(&msg)
                    .instrument(spans::event("message_create"))
                    .await
            }
            Event::MemberAdd { guild_id, user } => {
                self.on_member_add(guild_id, &user)
                    .instrument(spans::event("member_add"))
                    .await
            }
        }
    }

    pub async fn on_message(&self, msg: &Message) {
        if msg.author.bot {
            return;
        }

        if msg.is_direct() {
            if let Err(e) = verification::handle_direct_message(&self.bot, msg).await {
                warn!(user_id = %msg.author.id, error = %e, "Verification step failed");
            }
            return;
        }

        let Some(body) = msg.content.strip_prefix(self.bot.config.bot.prefix.as_str()) else {
            return;
        };
        let Some(name) = body.split_whitespace().next() else {
            return;
        };

        let ctx = Context {
            bot: &self.bot,
            registry: &self.registry,
        };
        if let Err(e) = self.registry.dispatch(&ctx, name, msg).await {
            warn!(command = %name, error = %e, code = e.error_code(), "Command failed");
            if let Some(text) = e.user_reply() {
                self.bot.reply(msg.channel_id, text).await;
            }
        }
    }

    pub async fn on_member_add(&self, guild: GuildId, member: &User) {
        if guild != self.bot.config.discord.servers.public {
            return;
        }
        if member.bot {
            debug!(user_id = %member.id, "Ignoring bot join");
            return;
        }

        if let Err(e) = welcome_member(&self.bot, guild, member).await {
            warn!(user_id = %member.id, guild_id = %guild, error = %e, "Failed to welcome member");
        }
    }
}
