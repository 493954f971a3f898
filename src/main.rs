//! gatewarden - community verification and announcement bot.
//!
//! Verifies members by institutional email before granting roles, and lets
//! a committee publish and recall announcements and events.

mod config;
mod error;
mod handlers;
mod http;
mod mail;
mod metrics;
mod model;
mod network;
mod services;
mod state;
mod telemetry;

#[cfg(test)]
mod testing;

use crate::config::{Config, LogFormat, validate};
use crate::handlers::{Dispatcher, Registry};
use crate::mail::SendGrid;
use crate::network::{DiscordPlatform, Gateway};
use crate::services::verification::Petname;
use crate::state::{Bot, BotParams};
use anyhow::Context as _;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Gateway events buffered ahead of the dispatcher.
const EVENT_BUFFER: usize = 256;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let mut config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {config_path}"))?;
    config.apply_env_overrides();

    init_tracing(config.bot.log_format);

    if let Err(errors) = validate(&config) {
        for e in &errors {
            error!(path = %config_path, error = %e, "Invalid configuration");
        }
        anyhow::bail!("{} configuration error(s) in {config_path}", errors.len());
    }

    info!(
        community = %config.community.name,
        prefix = %config.bot.prefix,
        autoregister = config.discord.autoregister,
        "Starting gatewarden"
    );

    metrics::init();
    if config.bot.metrics_port != 0 {
        tokio::spawn(http::run_http_server(config.bot.metrics_port));
    }

    let (events_tx, mut events_rx) = mpsc::channel(EVENT_BUFFER);
    let mut client = Gateway::connect(&config.bot.token, events_tx)
        .await
        .context("failed to build gateway client")?;

    let platform = Arc::new(DiscordPlatform::new(Arc::clone(&client.http)));
    let mailer = Arc::new(SendGrid::new(
        config.email.endpoint.clone(),
        config.email.api_key.clone(),
    ));
    let registry = Registry::new(&config);
    let bot = Arc::new(Bot::new(BotParams {
        config,
        platform,
        mailer,
        tokens: Arc::new(Petname),
    }));
    let dispatcher = Arc::new(Dispatcher::new(bot, registry));

    let pump = {
        let dispatcher = Arc::clone(&dispatcher);
        async move {
            while let Some(event) = events_rx.recv().await {
                let dispatcher = Arc::clone(&dispatcher);
                tokio::spawn(async move { dispatcher.on_event(event).await });
            }
        }
    };
    tokio::spawn(pump);

    let shard_manager = Arc::clone(&client.shard_manager);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutting down");
            shard_manager.shutdown_all().await;
        }
    });

    client.start().await.context("gateway failed")?;
    info!("Gateway closed");

    let stats = dispatcher.registry().command_stats();
    info!(?stats, "Command usage");
    Ok(())
}
