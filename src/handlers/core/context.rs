//! Handler context and trait.

use super::registry::Registry;
use crate::error::HandlerResult;
use crate::state::Bot;
use async_trait::async_trait;
use crate::model::Message;

/// Everything a handler may touch while processing one message.
pub struct Context<'a> {
    pub bot: &'a Bot,
    /// Needed by `help` to list the other commands.
    pub registry: &'a Registry,
}

/// A named chat command.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, ctx: &Context<'_>, msg: &Message) -> HandlerResult;
}
