//! Platform connectivity.
//!
//! - [`platform`]: the outbound capability every handler talks through
//! - [`discord`]: serenity implementation of that capability
//! - [`gateway`]: inbound event stream

pub mod discord;
pub mod gateway;
pub mod platform;

pub use discord::DiscordPlatform;
pub use gateway::Gateway;
pub use platform::{FileUpload, HISTORY_LIMIT, Platform};
