//! Rendering conversations as plain-text transcripts.
//!
//! Each message becomes `Sender (timestamp): text`, followed by one line per
//! attached share.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::config::ExportConfig;
use crate::models::{Message, Share};
use crate::{Error, Result};

/// Locales whose date-time layout the transcripts can reproduce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locale {
    /// `5/1/2019, 11:02:03 AM`
    EnUs,
    /// `01/05/2019, 11:02:03`
    EnGb,
    /// `1.5.2019, 11:02:03`
    DeDe,
    /// `01.05.2019, 11:02:03`
    RuRu,
}

impl Locale {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().replace('_', "-").to_ascii_lowercase().as_str() {
            "en-us" | "en" => Ok(Self::EnUs),
            "en-gb" => Ok(Self::EnGb),
            "de-de" | "de" => Ok(Self::DeDe),
            "ru-ru" | "ru" => Ok(Self::RuRu),
            other => Err(Error::InvalidArgument(format!(
                "unsupported locale '{}'. Use en-US|en-GB|de-DE|ru-RU",
                other
            ))),
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Self::EnUs => "en-US",
            Self::EnGb => "en-GB",
            Self::DeDe => "de-DE",
            Self::RuRu => "ru-RU",
        }
    }

    fn pattern(self) -> &'static str {
        match self {
            Self::EnUs => "%-m/%-d/%Y, %-I:%M:%S %p",
            Self::EnGb => "%d/%m/%Y, %H:%M:%S",
            Self::DeDe => "%-d.%-m.%Y, %H:%M:%S",
            Self::RuRu => "%d.%m.%Y, %H:%M:%S",
        }
    }
}

/// Locale and time zone every timestamp of a run is rendered in.
#[derive(Debug, Clone, Copy)]
pub struct TranscriptFormat {
    pub locale: Locale,
    pub time_zone: Tz,
}

impl TranscriptFormat {
    pub fn new(locale: Locale, time_zone: Tz) -> Self {
        Self { locale, time_zone }
    }

    pub fn from_config(config: &ExportConfig) -> Self {
        Self::new(config.locale, config.time_zone)
    }

    pub fn timestamp(&self, at: &DateTime<Utc>) -> String {
        at.with_timezone(&self.time_zone)
            .format(self.locale.pattern())
            .to_string()
    }

    /// `Sender (timestamp): text`; a message without text keeps the trailing `": "`.
    pub fn message_line(&self, message: &Message) -> String {
        format!(
            "{} ({}): {}",
            message.from.name,
            self.timestamp(&message.created_time),
            message.message.as_deref().unwrap_or_default()
        )
    }

    /// Message lines in the given order, each followed by its share lines.
    pub fn conversation_lines(&self, messages: &[Message]) -> Vec<String> {
        let mut lines = Vec::with_capacity(messages.len());
        for message in messages {
            lines.push(self.message_line(message));
            lines.extend(message.shares().iter().map(share_line));
        }
        lines
    }

    /// Transcript body: lines joined by `\n`, without a trailing newline.
    pub fn render(&self, messages: &[Message]) -> String {
        self.conversation_lines(messages).join("\n")
    }
}

/// `name (description): link`, dropping whichever parts are absent.
pub fn share_line(share: &Share) -> String {
    let name = share.name.as_deref().filter(|s| !s.is_empty());
    let description = share.description.as_deref().filter(|s| !s.is_empty());

    let mut line = String::new();
    if let Some(name) = name {
        line.push_str(name);
    }
    if let Some(description) = description {
        line.push_str(&format!(" ({})", description));
    }
    if name.is_some() || description.is_some() {
        line.push_str(": ");
    }
    line.push_str(&share.link);
    line
}
