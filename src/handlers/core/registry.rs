//! Command handler registry and dispatch.
//!
//! The `Registry` maps command names to handlers and their help text, and
//! keeps per-command usage counters.

use super::context::{Context, Handler};
use crate::config::Config;
use crate::error::HandlerResult;
use crate::handlers::{
    publish::{AnnounceHandler, EventHandler},
    quote::QuoteHandler,
    recall::RecallHandler,
    register::RegisterHandler,
    utility::{HelpHandler, PingHandler},
};
use crate::model::Message;
use crate::telemetry::{CommandTimer, spans};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{Instrument, debug};

/// Registration-time record for one command.
pub struct Command {
    pub help: String,
    /// Listed under committee help rather than general help.
    pub committee: bool,
    handler: Box<dyn Handler>,
}

/// Registry of command handlers.
pub struct Registry {
    commands: HashMap<String, Command>,
    command_counts: HashMap<String, AtomicU64>,
}

impl Registry {
    /// An empty registry.
    pub fn empty() -> Self {
        Self {
            commands: HashMap::new(),
            command_counts: HashMap::new(),
        }
    }

    /// Create a registry with every bot command registered.
    pub fn new(config: &Config) -> Self {
        let prefix = &config.bot.prefix;
        let limit = config.discord.char_limit;
        let mut registry = Self::empty();

        registry.register("ping", "pong!", PingHandler, false);
        registry.register("help", "displays this message", HelpHandler, false);
        registry.register(
            "register",
            "registers you as a member of the server",
            RegisterHandler,
            false,
        );
        registry.register(
            "quote",
            "quotes a random message, optionally from a mentioned user",
            QuoteHandler,
            false,
        );

        // Committee commands
        registry.register(
            "event",
            format!(
                "send a message in the format: \n\t{prefix}event \"title\" \"yyyy-mm-dd\" \"description\" \n\tand make sure to have an image attached too.\n\tCharacter limit of {limit} for description"
            ),
            EventHandler,
            true,
        );
        registry.register(
            "announce",
            format!("send a message in the format: \n\t{prefix}announce TEXT\n\tCharacter limit of {limit}"),
            AnnounceHandler { silent: false },
            true,
        );
        registry.register(
            "sannounce",
            format!("announce without mentioning everyone: \n\t{prefix}sannounce TEXT\n\tCharacter limit of {limit}"),
            AnnounceHandler { silent: true },
            true,
        );
        registry.register(
            "recall",
            "PERMANENTLY DELETE the last announcement or event.",
            RecallHandler,
            true,
        );

        registry
    }

    /// Add a command. A second registration under the same name replaces the first.
    pub fn register(
        &mut self,
        name: &str,
        help: impl Into<String>,
        handler: impl Handler + 'static,
        committee: bool,
    ) {
        self.commands.insert(
            name.to_string(),
            Command {
                help: help.into(),
                committee,
                handler: Box::new(handler),
            },
        );
        self.command_counts
            .entry(name.to_string())
            .or_insert_with(|| AtomicU64::new(0));
    }

    pub fn lookup(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    /// Help entries for either the general or the committee commands, sorted by name.
    pub fn help_text(&self, committee: bool) -> BTreeMap<&str, &str> {
        self.commands
            .iter()
            .filter(|(_, command)| command.committee == committee)
            .map(|(name, command)| (name.as_str(), command.help.as_str()))
            .collect()
    }

    /// Usage counts of commands invoked at least once, most used first.
    pub fn command_stats(&self) -> Vec<(&str, u64)> {
        let mut stats: Vec<_> = self
            .command_counts
            .iter()
            .map(|(name, count)| (name.as_str(), count.load(Ordering::Relaxed)))
            .filter(|(_, count)| *count > 0)
            .collect();
        stats.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        stats
    }

    /// Dispatch a message to the handler registered under `name`.
    ///
    /// Unknown commands are ignored.
    pub async fn dispatch(&self, ctx: &Context<'_>, name: &str, msg: &Message) -> HandlerResult {
        let Some(command) = self.lookup(name) else {
            debug!(command = %name, "Unknown command");
            return Ok(());
        };

        if let Some(counter) = self.command_counts.get(name) {
            counter.fetch_add(1, Ordering::Relaxed);
        }

        let _timer = CommandTimer::new(name);
        let result = command
            .handler
            .handle(ctx, msg)
            .instrument(spans::command(name, msg))
            .await;

        if let Err(ref e) = result {
            crate::metrics::record_command_error(name, e.error_code());
            debug!(command = %name, error = %e, "Command error");
        }

        result
    }
}
