//! Stateful services.
//!
//! Currently a single one: member verification, which owns the only
//! mutable state in the bot.

pub mod verification;
