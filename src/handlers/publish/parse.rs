//! Parsing of `event` and `announce` command bodies.

use crate::model::Attachment;
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

static EVENT_BODY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*"([^"]+)"\s+"([^"]+)"\s+"((?s:.*))"\s*$"#).expect("event pattern is valid")
});

/// Why a command body was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error(r#"expected "title" "yyyy-mm-dd" "description""#)]
    EventFormat,

    #[error("invalid date {0:?}, expected yyyy-mm-dd")]
    Date(String),

    #[error("{len} characters is over the limit of {limit}")]
    TooLong { len: usize, limit: usize },

    #[error("an image must be attached")]
    MissingImage,

    #[error("nothing to announce")]
    Empty,
}

/// The structured fields of an `event` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub title: String,
    pub date: NaiveDate,
    pub description: String,
}

impl EventDraft {
    /// Parse `"title" "yyyy-mm-dd" "description"`.
    pub fn parse(body: &str) -> Result<Self, ParseError> {
        let caps = EVENT_BODY.captures(body).ok_or(ParseError::EventFormat)?;
        let date = NaiveDate::parse_from_str(&caps[2], "%Y-%m-%d")
            .map_err(|_| ParseError::Date(caps[2].to_string()))?;

        Ok(Self {
            title: caps[1].to_string(),
            date,
            description: caps[3].to_string(),
        })
    }

    /// Reject descriptions longer than `limit` characters.
    pub fn check_limit(&self, limit: usize) -> Result<(), ParseError> {
        within_limit(&self.description, limit)
    }
}

/// Free text mirrored to the public channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Announcement {
    pub content: String,
    pub image: Option<Attachment>,
}

impl Announcement {
    pub fn parse(body: &str, attachments: &[Attachment], limit: usize) -> Result<Self, ParseError> {
        if body.trim().is_empty() {
            return Err(ParseError::Empty);
        }
        within_limit(body, limit)?;

        Ok(Self {
            content: body.to_string(),
            image: first_image(attachments).cloned(),
        })
    }
}

pub fn first_image(attachments: &[Attachment]) -> Option<&Attachment> {
    attachments.iter().find(|a| a.is_image())
}

fn within_limit(text: &str, limit: usize) -> Result<(), ParseError> {
    let len = text.chars().count();
    if len > limit {
        return Err(ParseError::TooLong { len, limit });
    }
    Ok(())
}
