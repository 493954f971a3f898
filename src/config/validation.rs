//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("bot.token is required (or set DISCORD_TOKEN)")]
    MissingToken,
    #[error("bot.prefix must not be empty")]
    EmptyPrefix,
    #[error("discord.roles entry '{0}' is not a role id")]
    InvalidRole(String),
    #[error("discord.roles must list at least one role id")]
    NoRoles,
    #[error("discord.char_limit must be greater than zero")]
    ZeroCharLimit,
    #[error("email.domain must start with '@', got '{0}'")]
    InvalidDomain(String),
    #[error("email.api_key is required (or set SENDGRID_API_KEY)")]
    MissingApiKey,
    #[error("discord.welcome_messages[{0}] has no %s placeholder for the member mention")]
    WelcomeWithoutPlaceholder(usize),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.bot.token.is_empty() {
        errors.push(ValidationError::MissingToken);
    }
    if config.bot.prefix.is_empty() {
        errors.push(ValidationError::EmptyPrefix);
    }

    for entry in config.discord.invalid_roles() {
        errors.push(ValidationError::InvalidRole(entry.to_string()));
    }
    if config.discord.role_ids().is_empty() {
        errors.push(ValidationError::NoRoles);
    }
    if config.discord.char_limit == 0 {
        errors.push(ValidationError::ZeroCharLimit);
    }

    if !config.email.domain.starts_with('@') {
        errors.push(ValidationError::InvalidDomain(config.email.domain.clone()));
    }
    if config.email.api_key.is_empty() {
        errors.push(ValidationError::MissingApiKey);
    }

    for (i, template) in config.discord.welcome_messages.iter().enumerate() {
        if !template.contains("%s") {
            errors.push(ValidationError::WelcomeWithoutPlaceholder(i));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
