//! Gateway client - inbound event stream.
//!
//! serenity owns the WebSocket session (identify, heartbeat, resume and
//! reconnect). [`Gateway`] converts the events gatewarden acts on and feeds
//! them to the dispatcher's event pump.

use crate::model::{Event, Message, User};
use serenity::all::{Client, Context, EventHandler, GatewayIntents, Member, Ready};
use serenity::model::channel::Message as DiscordMessage;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Intents needed for commands, direct messages and member joins.
pub fn intents() -> GatewayIntents {
    GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
}

/// Forwards gateway events to the event pump.
pub struct Gateway {
    events: mpsc::Sender<Event>,
}

impl Gateway {
    pub fn new(events: mpsc::Sender<Event>) -> Self {
        Self { events }
    }

    /// Build a gateway client that feeds `events`.
    pub async fn connect(
        token: &str,
        events: mpsc::Sender<Event>,
    ) -> Result<Client, serenity::Error> {
        Client::builder(token, intents())
            .event_handler(Self::new(events))
            .await
    }

    async fn forward(&self, event: Event) {
        if self.events.send(event).await.is_err() {
            warn!("Event pump closed, dropping event");
        }
    }
}

#[serenity::async_trait]
impl EventHandler for Gateway {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(
            user = %ready.user.name,
            session_id = %ready.session_id,
            guilds = ready.guilds.len(),
            "Gateway session ready"
        );
    }

    async fn message(&self, _ctx: Context, msg: DiscordMessage) {
        self.forward(Event::MessageCreate(Message::from(&msg))).await;
    }

    async fn guild_member_addition(&self, _ctx: Context, member: Member) {
        self.forward(Event::MemberAdd {
            guild_id: member.guild_id,
            user: User::from(&member.user),
        })
        .await;
    }
}
