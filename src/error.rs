//! Unified error handling for gatewarden.
//!
//! Handlers return [`HandlerError`]; collaborator failures arrive as
//! [`PlatformError`] or [`MailError`] and convert automatically. Nothing here
//! is fatal: the dispatcher logs every error and moves on to the next event.

use crate::handlers::publish::ParseError;
use thiserror::Error;

// ============================================================================
// Collaborator Errors
// ============================================================================

/// Failure talking to the chat platform.
///
/// Rate limits never surface here; the client waits them out.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("platform request failed: {0}")]
    Discord(#[from] serenity::Error),

    #[error("attachment download failed: {0}")]
    Download(#[from] reqwest::Error),
}

/// Failure talking to the mail provider.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("mail provider unavailable: {0}")]
    Unavailable(String),
}

// ============================================================================
// Handler Errors (command processing)
// ============================================================================

/// Errors that can occur during command handling.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Restricted command invoked by a non-committee member or in the wrong channel.
    #[error("command unavailable in this context")]
    Unavailable,

    #[error("invalid command body: {0}")]
    Parse(#[from] ParseError),

    #[error("platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("mail error: {0}")]
    Mail(#[from] MailError),
}

impl HandlerError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unavailable => "unavailable",
            Self::Parse(_) => "parse_error",
            Self::Platform(_) => "platform_error",
            Self::Mail(_) => "mail_error",
        }
    }

    /// Text to send back to the invoking channel.
    ///
    /// Returns `None` for errors the handler already reported or that have
    /// no user-facing wording.
    pub fn user_reply(&self) -> Option<&'static str> {
        match self {
            Self::Unavailable => Some("This command is unavailable"),
            Self::Platform(_) => Some("Something went wrong. Please try again later"),
            Self::Parse(_) | Self::Mail(_) => None,
        }
    }
}

/// Result type for command handlers.
pub type HandlerResult = Result<(), HandlerError>;
