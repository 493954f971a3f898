//! Member verification.
//!
//! A user is verified by proving control of an institutional email address:
//!
//! ```text
//! (not pending) --register--> AwaitingEmail --valid address, mail accepted--> AwaitingToken
//!                                  ^   |                                        |   ^
//!                                  +---+ (bad address / mail failure)          |   | (wrong token,
//!                                                                               v   |  role grant failed)
//!                                                          removed <--roles granted-+
//! ```
//!
//! There is no expiry: a user who never answers stays pending until restart.

mod store;
mod token;

pub use store::{RegistrationState, TokenCheck, VerificationStore};
pub use token::{Petname, TokenGenerator};

use crate::error::{HandlerError, HandlerResult, MailError};
use crate::mail::Email;
use crate::metrics;
use crate::state::Bot;
use crate::model::{Message, User};
use tracing::{debug, error, info, warn};

const TOKEN_PROMPT: &str = "Please reply with the token that has been emailed to you";
const EMAIL_FAILED: &str = "Failed to send email. Please try again later";
const INCORRECT_TOKEN: &str = "Incorrect token. Please try again";
const GRANT_FAILED: &str =
    "Failed to register for the server. Please contact the owners of the server";

/// Start verification for a user: mark them pending and prompt over DM.
///
/// A user already pending is left alone, so repeated invocations never send
/// a second prompt.
pub async fn begin_registration(bot: &Bot, user: &User) -> HandlerResult {
    if !bot.verification.begin(user.id) {
        debug!(user_id = %user.id, "Already registering");
        return Ok(());
    }
    metrics::record_registration_started();

    let channel = match bot.platform.create_dm(user.id).await {
        Ok(channel) => channel,
        Err(e) => {
            error!(user_id = %user.id, error = %e, "Failed to create DM channel");
            bot.verification.cancel(user.id);
            return Err(e.into());
        }
    };

    let prompt = format!(
        "Please message me your {} email address so I can verify you as a member of {}",
        bot.config.email.domain, bot.config.community.name
    );
    if let Err(e) = bot.platform.send_message(channel, &prompt).await {
        error!(user_id = %user.id, error = %e, "Failed to send registration prompt");
        bot.verification.cancel(user.id);
        return Err(e.into());
    }

    info!(
        user_id = %user.id,
        pending = bot.verification.pending_count(),
        "Registration started"
    );
    Ok(())
}

/// Handle a direct message from a possibly-pending user.
///
/// Only the first whitespace-delimited word of the message is considered.
pub async fn handle_direct_message(bot: &Bot, msg: &Message) -> HandlerResult {
    let user = msg.author.id;
    let Some(state) = bot.verification.get(user) else {
        return Ok(());
    };
    let input = msg.content.split_whitespace().next().unwrap_or("");

    match state {
        RegistrationState::AwaitingEmail => submit_email(bot, msg, input).await,
        RegistrationState::AwaitingToken { .. } => submit_token(bot, msg, input).await,
        RegistrationState::SendingEmail | RegistrationState::GrantingRoles { .. } => {
            debug!(
                user_id = %user,
                token_issued = state.token().is_some(),
                "Ignoring DM while a step is in flight"
            );
            Ok(())
        }
    }
}

fn is_institutional(address: &str, domain: &str) -> bool {
    address.len() > domain.len() && address.ends_with(domain)
}

async fn submit_email(bot: &Bot, msg: &Message, address: &str) -> HandlerResult {
    let user = msg.author.id;
    let domain = &bot.config.email.domain;

    if !is_institutional(address, domain) {
        let reply = format!("Please use a valid email address ending in {}", domain);
        bot.reply(msg.channel_id, &reply).await;
        return Ok(());
    }

    if !bot.verification.start_dispatch(user) {
        return Ok(());
    }

    let token = bot.tokens.generate();
    let community = &bot.config.community.name;
    let email = Email {
        from: bot.config.email.from.clone(),
        to: address.to_string(),
        subject: format!("{} Discord Verification", community),
        body: format!(
            "Please message the following token to the {community} bot to gain access to the Discord Server:\n\n\
             {token}\n\n\
             If you did not request access to the {community} Discord Server, ignore this message."
        ),
    };

    match bot.mailer.send(&email).await {
        Ok(response) if response.accepted() => {
            bot.verification.issue_token(user, token);
            metrics::record_token_issued();
            info!(user_id = %user, "Verification email sent");
            bot.reply(msg.channel_id, TOKEN_PROMPT).await;
            Ok(())
        }
        Ok(response) => {
            warn!(
                user_id = %user,
                status = response.status,
                body = %response.body,
                "Mail provider rejected verification email"
            );
            bot.verification.abort_dispatch(user);
            metrics::record_email_failure();
            bot.reply(msg.channel_id, EMAIL_FAILED).await;
            Err(HandlerError::Mail(MailError::Unavailable(format!(
                "provider returned {}",
                response.status
            ))))
        }
        Err(e) => {
            error!(user_id = %user, error = %e, "Failed to send email");
            bot.verification.abort_dispatch(user);
            metrics::record_email_failure();
            bot.reply(msg.channel_id, EMAIL_FAILED).await;
            Err(e.into())
        }
    }
}

async fn submit_token(bot: &Bot, msg: &Message, submitted: &str) -> HandlerResult {
    let user = msg.author.id;

    match bot.verification.check_token(user, submitted) {
        TokenCheck::Matched => {}
        TokenCheck::Mismatch => {
            bot.reply(msg.channel_id, INCORRECT_TOKEN).await;
            return Ok(());
        }
        TokenCheck::NotAwaiting => return Ok(()),
    }

    let public = bot.config.discord.servers.public;
    // Grants are not rolled back: a failure part-way leaves earlier roles in place.
    for role in bot.config.discord.role_ids() {
        if let Err(e) = bot.platform.add_role(public, user, role).await {
            error!(
                user_id = %user,
                guild_id = %public,
                role_id = %role,
                error = %e,
                "Failed to add role"
            );
            bot.verification.abort_grant(user);
            bot.reply(msg.channel_id, GRANT_FAILED).await;
            return Err(e.into());
        }
    }

    bot.verification.complete(user);
    metrics::record_verification_completed();
    info!(user_id = %user, "Member verified");
    let thanks = format!(
        "Thank you. You have been registered for the {} Discord Server",
        bot.config.community.name
    );
    bot.reply(msg.channel_id, &thanks).await;
    Ok(())
}
