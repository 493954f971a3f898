//! Shared bot state.

mod bot;

pub use bot::{Bot, BotParams};
