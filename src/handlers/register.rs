//! The `register` command and the welcome sent to new members.

use super::core::{Context, Handler};
use crate::error::HandlerResult;
use crate::model::{Message, User};
use crate::services::verification;
use crate::state::Bot;
use async_trait::async_trait;
use rand::seq::SliceRandom;
use serenity::model::id::GuildId;
use tracing::{debug, warn};

pub struct RegisterHandler;

#[async_trait]
impl Handler for RegisterHandler {
    async fn handle(&self, ctx: &Context<'_>, msg: &Message) -> HandlerResult {
        verification::begin_registration(ctx.bot, &msg.author).await
    }
}

/// Greet a member who joined the public server and, with auto-registration
/// on, start verifying them.
///
/// The registration hint only follows a welcome; with no templates configured
/// the system channel stays quiet.
pub async fn welcome_member(bot: &Bot, guild: GuildId, member: &User) -> HandlerResult {
    let discord = &bot.config.discord;

    let welcome = discord
        .welcome_messages
        .choose(&mut rand::thread_rng())
        .map(|template| template.replacen("%s", &member.mention(), 1));
    if let Some(welcome) = welcome {
        match bot.platform.system_channel(guild).await {
            Ok(Some(system)) => {
                bot.reply(system, &welcome).await;
                bot.reply(system, &follow_up(bot)).await;
            }
            Ok(None) => debug!(guild_id = %guild, "No system channel for welcome"),
            Err(e) => warn!(guild_id = %guild, error = %e, "Couldn't find guild for welcome"),
        }
    }

    if discord.autoregister {
        verification::begin_registration(bot, member).await?;
    }
    Ok(())
}

fn follow_up(bot: &Bot) -> String {
    let manual = "If you're a student in another college simply let us know here and we will be able to assign you a role manually!";
    if bot.config.discord.autoregister {
        format!("We've sent you a DM so you can register for full access to the server!\n{manual}")
    } else {
        format!(
            "Please type `{}register` to start the verification process to make sure you're a {} member.\n{manual}",
            bot.config.bot.prefix, bot.config.community.name
        )
    }
}
