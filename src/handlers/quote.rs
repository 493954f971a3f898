//! `quote`: post a random message from the public server, optionally by a
//! mentioned user.

use super::core::{Context, Handler};
use crate::error::HandlerResult;
use crate::model::{Message, TextChannel};
use crate::network::HISTORY_LIMIT;
use async_trait::async_trait;
use rand::Rng;
use tracing::debug;

const NOT_FOUND_BY_USER: &str = "Couldn't find any messages by that user";
const NOT_FOUND: &str = "Couldn't find any messages";
const PREVIEW_CHARS: usize = 256;

fn truncate(content: &str, max: usize) -> String {
    match content.char_indices().nth(max) {
        Some((end, _)) => format!("{}...", &content[..end]),
        None => content.to_string(),
    }
}

fn preview(msg: &Message, channel: &TextChannel) -> String {
    format!(
        "**{}**: {}\n*{} in #{}*",
        msg.author.name,
        truncate(&msg.content, PREVIEW_CHARS),
        msg.timestamp.format("%d/%m/%y"),
        channel.name
    )
}

fn pick(len: usize) -> usize {
    rand::thread_rng().gen_range(0..len)
}

pub struct QuoteHandler;

#[async_trait]
impl Handler for QuoteHandler {
    async fn handle(&self, ctx: &Context<'_>, msg: &Message) -> HandlerResult {
        let bot = ctx.bot;
        let wanted = msg.mentions.first().map(|user| user.id);
        let mut pool = bot
            .platform
            .text_channels(bot.config.discord.servers.public)
            .await?;

        // Channels without a usable message are dropped until one yields a quote.
        while !pool.is_empty() {
            let index = pick(pool.len());
            let history = bot
                .platform
                .channel_messages(pool[index].id, HISTORY_LIMIT)
                .await?;
            let candidates: Vec<&Message> = history
                .iter()
                .filter(|m| wanted.is_none_or(|id| m.author.id == id))
                .collect();

            if candidates.is_empty() {
                debug!(channel_id = %pool[index].id, "No candidate messages, resampling");
                pool.swap_remove(index);
                continue;
            }

            let quoted = candidates[pick(candidates.len())];
            bot.reply(msg.channel_id, &preview(quoted, &pool[index])).await;
            return Ok(());
        }

        let reply = if wanted.is_some() { NOT_FOUND_BY_USER } else { NOT_FOUND };
        bot.reply(msg.channel_id, reply).await;
        Ok(())
    }
}
