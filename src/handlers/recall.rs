//! `recall`: delete a published announcement or event together with the
//! private command that produced it.
//!
//! Nothing links the two messages, so the public text is rebuilt from the
//! private command and matched against recent public history.

use super::core::{Context, Handler};
use super::publish::{EventDraft, format_event};
use crate::error::{HandlerError, HandlerResult};
use crate::model::Message;
use crate::network::HISTORY_LIMIT;
use async_trait::async_trait;
use serenity::model::id::MessageId;
use tracing::{debug, info};

/// A private trigger and the public message it published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecallMatch {
    pub private: MessageId,
    pub public: MessageId,
    pub confirmation: String,
}

/// Public announcement text with the `@everyone` line removed.
fn without_mention_line(content: &str) -> &str {
    content
        .split_once('\n')
        .map_or("", |(_, rest)| rest)
        .trim_matches(' ')
}

/// Find the most recent private command whose published counterpart is
/// still in the public history.
///
/// Private messages are scanned in the order given; a trigger with no public
/// counterpart is skipped.
pub fn find_recall(prefix: &str, private: &[Message], public: &[Message]) -> Option<RecallMatch> {
    let announce = format!("{prefix}announce ");
    let sannounce = format!("{prefix}sannounce ");
    let event = format!("{prefix}event ");

    private.iter().find_map(|trigger| {
        let (published, confirmation) = if let Some(content) = trigger.content.strip_prefix(&announce) {
            let found = public
                .iter()
                .find(|p| without_mention_line(&p.content) == content)?;
            (found, format!("Successfully recalled announcement\n*{content}*"))
        } else if let Some(content) = trigger.content.strip_prefix(&sannounce) {
            let found = public
                .iter()
                .find(|p| p.content.trim_matches(' ') == content)?;
            (found, format!("Successfully recalled announcement\n*{content}*"))
        } else if let Some(body) = trigger.content.strip_prefix(&event) {
            let draft = EventDraft::parse(body)
                .inspect_err(|e| debug!(message_id = %trigger.id, error = %e, "Skipping unparseable event"))
                .ok()?;
            let expected = format_event(&draft);
            let found = public.iter().find(|p| p.content == expected)?;
            (
                found,
                format!("Successfully recalled event\n**{}**\n{}", draft.title, draft.description),
            )
        } else {
            return None;
        };

        Some(RecallMatch {
            private: trigger.id,
            public: published.id,
            confirmation,
        })
    })
}

pub struct RecallHandler;

#[async_trait]
impl Handler for RecallHandler {
    async fn handle(&self, ctx: &Context<'_>, msg: &Message) -> HandlerResult {
        let bot = ctx.bot;
        if !bot.in_committee_channel(msg) {
            return Err(HandlerError::Unavailable);
        }

        let channels = &bot.config.discord.channels;
        let public = bot
            .platform
            .channel_messages(channels.public_announcements, HISTORY_LIMIT)
            .await?;
        let private = bot
            .platform
            .channel_messages(channels.private_events, HISTORY_LIMIT)
            .await?;

        let Some(found) = find_recall(&bot.config.bot.prefix, &private, &public) else {
            debug!("Nothing to recall");
            return Ok(());
        };

        bot.platform
            .delete_message(channels.private_events, found.private)
            .await?;
        bot.platform
            .delete_message(channels.public_announcements, found.public)
            .await?;
        info!(private_id = %found.private, public_id = %found.public, "Recalled publication");

        bot.reply(msg.channel_id, &found.confirmation).await;
        Ok(())
    }
}
