//! Stateless utility commands: `ping` and `help`.

use super::core::{Context, Handler};
use crate::error::HandlerResult;
use crate::model::Message;
use async_trait::async_trait;

pub struct PingHandler;

#[async_trait]
impl Handler for PingHandler {
    async fn handle(&self, ctx: &Context<'_>, msg: &Message) -> HandlerResult {
        ctx.bot.platform.send_message(msg.channel_id, "pong").await?;
        Ok(())
    }
}

/// Lists commands in a code block; committee commands only for committee members.
pub struct HelpHandler;

#[async_trait]
impl Handler for HelpHandler {
    async fn handle(&self, ctx: &Context<'_>, msg: &Message) -> HandlerResult {
        let mut out = String::from("```");
        for (name, help) in ctx.registry.help_text(false) {
            out.push_str(&format!("{name}: {help}\n"));
        }
        if ctx.bot.is_committee(msg) {
            for (name, help) in ctx.registry.help_text(true) {
                out.push_str(&format!("{name}: {help}\n"));
            }
        }
        out.push_str("```");

        ctx.bot.platform.send_message(msg.channel_id, &out).await?;
        Ok(())
    }
}
