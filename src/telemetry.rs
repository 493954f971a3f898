//! Telemetry utilities for command timing and tracing spans.

use std::time::Instant;

/// Guard for timing command execution and recording metrics.
///
/// Records command latency when dropped.
pub struct CommandTimer {
    command: String,
    start: Instant,
}

impl CommandTimer {
    /// Start timing a command.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            start: Instant::now(),
        }
    }
}

impl Drop for CommandTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        crate::metrics::record_command(&self.command, duration);
    }
}

/// Standardized span constructors.
pub mod spans {
    use crate::model::Message;
    use tracing::{Span, info_span};

    /// Span for one command invocation.
    pub fn command(name: &str, msg: &Message) -> Span {
        match &msg.guild_id {
            Some(guild) => info_span!(
                "bot.command",
                name = %name,
                user_id = %msg.author.id,
                guild_id = %guild,
                channel_id = %msg.channel_id
            ),
            None => info_span!(
                "bot.command",
                name = %name,
                user_id = %msg.author.id,
                channel_id = %msg.channel_id
            ),
        }
    }

    /// Span for one gateway event.
    pub fn event(kind: &'static str) -> Span {
        info_span!("bot.event", kind = kind)
    }
}
