//! Committee publishing: events and announcements mirrored from the private
//! events channel to the public announcements channel.

mod parse;

pub use parse::{Announcement, EventDraft, ParseError, first_image};

use super::core::{Context, Handler};
use crate::error::{HandlerError, HandlerResult};
use crate::model::{Attachment, Message};
use crate::network::FileUpload;
use crate::state::Bot;
use async_trait::async_trait;
use tracing::{info, warn};

const POSTER: &str = "poster.jpg";

/// Public text for an event. Recall rebuilds this exact string to find the
/// published message, so any change here breaks recall of older events.
pub fn format_event(draft: &EventDraft) -> String {
    format!(
        "Hey @everyone, we have a new upcoming event on {}:\n**{}**\n{}",
        draft.date.format("%d/%m/%y"),
        draft.title,
        draft.description
    )
}

/// Text after `<prefix><command> `, or empty when there is none.
fn command_body<'m>(bot: &Bot, command: &str, msg: &'m Message) -> &'m str {
    msg.content
        .strip_prefix(bot.trigger(command).as_str())
        .unwrap_or("")
}

async fn poster(bot: &Bot, image: &Attachment) -> Result<FileUpload, HandlerError> {
    let body = bot.platform.fetch_attachment(image).await?;
    Ok(FileUpload::new(POSTER, body))
}

pub struct EventHandler;

#[async_trait]
impl Handler for EventHandler {
    async fn handle(&self, ctx: &Context<'_>, msg: &Message) -> HandlerResult {
        let bot = ctx.bot;
        if !bot.in_committee_channel(msg) {
            return Err(HandlerError::Unavailable);
        }

        let parsed = EventDraft::parse(command_body(bot, "event", msg)).and_then(|draft| {
            draft.check_limit(bot.config.discord.char_limit)?;
            let image = first_image(&msg.attachments).ok_or(ParseError::MissingImage)?;
            Ok((draft, image))
        });
        let (draft, image) = match parsed {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, "Failed to parse event");
                bot.reply(msg.channel_id, &format!("Failed to parse event: {e}"))
                    .await;
                return Err(e.into());
            }
        };

        let upload = poster(bot, image).await?;
        let channel = bot.config.discord.channels.public_announcements;
        bot.platform
            .send_file(channel, &format_event(&draft), upload)
            .await?;

        info!(title = %draft.title, date = %draft.date, "Event published");
        Ok(())
    }
}

/// `announce` and `sannounce`; the silent variant omits the `@everyone` line.
pub struct AnnounceHandler {
    pub silent: bool,
}

impl AnnounceHandler {
    fn command(&self) -> &'static str {
        if self.silent { "sannounce" } else { "announce" }
    }
}

#[async_trait]
impl Handler for AnnounceHandler {
    async fn handle(&self, ctx: &Context<'_>, msg: &Message) -> HandlerResult {
        let bot = ctx.bot;
        if !bot.in_committee_channel(msg) {
            return Err(HandlerError::Unavailable);
        }

        let body = command_body(bot, self.command(), msg);
        let announcement =
            match Announcement::parse(body, &msg.attachments, bot.config.discord.char_limit) {
                Ok(announcement) => announcement,
                Err(e) => {
                    warn!(error = %e, "Error sending announcement");
                    bot.reply(msg.channel_id, &format!("Error sending announcement: {e}"))
                        .await;
                    return Err(e.into());
                }
            };

        let text = if self.silent {
            announcement.content
        } else {
            format!("@everyone\n{}", announcement.content)
        };
        let channel = bot.config.discord.channels.public_announcements;
        match &announcement.image {
            Some(image) => {
                let upload = poster(bot, image).await?;
                bot.platform.send_file(channel, &text, upload).await?;
            }
            None => bot.platform.send_message(channel, &text).await?,
        }

        info!(silent = self.silent, "Announcement published");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::Registry;
    use crate::testing::*;

    async fn run(handler: &dyn Handler, bot: &Bot, msg: &Message) -> HandlerResult {
        let registry = Registry::empty();
        let ctx = Context { bot, registry: &registry };
        handler.handle(&ctx, msg).await
    }

    #[test]
    fn test_format_event() {
        let draft = EventDraft::parse(r#""Games Night" "2024-03-07" "Pizza""#).unwrap();
        assert_eq!(
            format_event(&draft),
            "Hey @everyone, we have a new upcoming event on 07/03/24:\n**Games Night**\nPizza"
        );
    }

    #[tokio::test]
    async fn test_event_mirrors_poster_to_public() {
        let platform = MockPlatform::new();
        let bot = test_bot(platform.clone(), MockMailer::accepting());
        let mut msg = committee_message(r#"!event "Games Night" "2024-03-07" "Pizza""#);
        msg.attachments = vec![image("games.png")];

        run(&EventHandler, &bot, &msg).await.unwrap();

        let sent = platform.sent.lock();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].channel.get(), PUBLIC_ANNOUNCEMENTS);
        assert_eq!(sent[0].filename.as_deref(), Some(POSTER));
        assert!(sent[0].content.starts_with("Hey @everyone"));
    }

    #[tokio::test]
    async fn test_event_rejections_are_reported_in_place() {
        let platform = MockPlatform::new();
        let bot = test_bot(platform.clone(), MockMailer::accepting());

        let no_image = committee_message(r#"!event "Games Night" "2024-03-07" "Pizza""#);
        let result = run(&EventHandler, &bot, &no_image).await;
        assert!(matches!(result, Err(HandlerError::Parse(ParseError::MissingImage))));

        let mut too_long = committee_message(&format!(
            r#"!event "Games Night" "2024-03-07" "{}""#,
            "x".repeat(41)
        ));
        too_long.attachments = vec![image("games.png")];
        let result = run(&EventHandler, &bot, &too_long).await;
        assert!(matches!(result, Err(HandlerError::Parse(ParseError::TooLong { .. }))));

        let replies = platform.sent_to(PRIVATE_EVENTS);
        assert_eq!(replies.len(), 2);
        assert!(replies.iter().all(|r| r.starts_with("Failed to parse event: ")));
        assert!(platform.sent_to(PUBLIC_ANNOUNCEMENTS).is_empty());
    }

    #[tokio::test]
    async fn test_publishing_outside_private_channel_is_unavailable() {
        let platform = MockPlatform::new();
        let bot = test_bot(platform.clone(), MockMailer::accepting());

        let wrong_channel = guild_message(COMMITTEE_GUILD, COMMITTEE_CHAT, 900, "!announce hi");
        let wrong_guild = guild_message(PUBLIC_GUILD, PRIVATE_EVENTS, 1, "!announce hi");

        for msg in [wrong_channel, wrong_guild] {
            let result = run(&AnnounceHandler { silent: false }, &bot, &msg).await;
            assert!(matches!(result, Err(HandlerError::Unavailable)));
        }
        assert_eq!(platform.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_announcements() {
        let platform = MockPlatform::new();
        let bot = test_bot(platform.clone(), MockMailer::accepting());

        run(&AnnounceHandler { silent: false }, &bot, &committee_message("!announce Hello World"))
            .await
            .unwrap();
        run(&AnnounceHandler { silent: true }, &bot, &committee_message("!sannounce Quiet  one "))
            .await
            .unwrap();
        let mut with_image = committee_message("!announce Look");
        with_image.attachments = vec![image("look.jpg")];
        run(&AnnounceHandler { silent: false }, &bot, &with_image)
            .await
            .unwrap();

        assert_eq!(
            platform.sent_to(PUBLIC_ANNOUNCEMENTS),
            vec!["@everyone\nHello World", "Quiet  one ", "@everyone\nLook"]
        );
        assert_eq!(platform.sent.lock()[2].filename.as_deref(), Some(POSTER));
    }

    #[tokio::test]
    async fn test_empty_announcement() {
        let platform = MockPlatform::new();
        let bot = test_bot(platform.clone(), MockMailer::accepting());

        let result = run(&AnnounceHandler { silent: false }, &bot, &committee_message("!announce")).await;

        assert!(matches!(result, Err(HandlerError::Parse(ParseError::Empty))));
        assert_eq!(
            platform.sent_to(PRIVATE_EVENTS),
            vec!["Error sending announcement: nothing to announce"]
        );
    }
}
