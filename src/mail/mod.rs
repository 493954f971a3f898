//! Outbound mail capability.

mod sendgrid;

pub use sendgrid::SendGrid;

use crate::error::MailError;
use async_trait::async_trait;

/// A plain-text email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Provider response to a send request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailResponse {
    pub status: u16,
    pub body: String,
}

impl MailResponse {
    /// Whether the provider accepted the message for delivery.
    #[inline]
    pub fn accepted(&self) -> bool {
        matches!(self.status, 200 | 202)
    }
}

/// Sends verification emails.
///
/// A returned [`MailResponse`] means the provider answered; callers decide
/// acceptance with [`MailResponse::accepted`]. `Err` means no answer at all.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &Email) -> Result<MailResponse, MailError>;
}
