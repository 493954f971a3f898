//! SendGrid v3 mail client.

use super::{Email, MailResponse, Mailer};
use crate::error::MailError;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

/// Timeout for a send request.
const MAIL_TIMEOUT: Duration = Duration::from_secs(10);

/// SendGrid client.
pub struct SendGrid {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl SendGrid {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(MAIL_TIMEOUT)
            .user_agent("gatewarden/0.3")
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }
}

/// Request body for the v3 send endpoint.
fn request_body(email: &Email) -> Value {
    json!({
        "personalizations": [{ "to": [{ "email": email.to }] }],
        "from": { "email": email.from },
        "subject": email.subject,
        "content": [{ "type": "text/plain", "value": email.body }],
    })
}

#[async_trait]
impl Mailer for SendGrid {
    async fn send(&self, email: &Email) -> Result<MailResponse, MailError> {
        if self.api_key.is_empty() {
            return Err(MailError::Unavailable("no API key configured".into()));
        }

        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request_body(email))
            .send()
            .await?;

        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        debug!(status = status, "Mail provider responded");
        Ok(MailResponse { status, body })
    }
}
