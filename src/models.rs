//! Graph API payloads for page conversations.
//!
//! Only the fields the exporter reads are modelled; everything else in the
//! responses is ignored by serde.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

/// One chunk of a paginated collection.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    #[serde(default)]
    pub data: Vec<T>,
    #[serde(default)]
    pub paging: Option<Paging>,
}

impl<T> Page<T> {
    /// Continuation URL, if the collection has more pages.
    pub fn next_url(&self) -> Option<&str> {
        self.paging
            .as_ref()
            .and_then(|p| p.next.as_deref())
            .filter(|url| !url.is_empty())
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            paging: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Paging {
    #[serde(default)]
    pub next: Option<String>,
}

/// Entry of `/{page-id}/conversations`.
#[derive(Debug, Clone, Deserialize)]
pub struct ConversationSummary {
    pub id: String,
    #[serde(default)]
    pub updated_time: Option<String>,
}

/// Response of `/{conversation-id}?fields=messages{...},participants`.
#[derive(Debug, Clone, Deserialize)]
pub struct ConversationDetail {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub messages: Page<Message>,
    #[serde(default)]
    pub participants: Page<Participant>,
}

impl ConversationDetail {
    /// The participant who is not the page itself.
    pub fn other_participant(&self, page_id: &str) -> Option<&Participant> {
        self.participants.data.iter().find(|p| p.id != page_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Participant {
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub id: Option<String>,
    pub from: Participant,
    #[serde(deserialize_with = "deserialize_graph_time")]
    pub created_time: DateTime<Utc>,
    #[serde(default)]
    pub message: Option<String>,
    /// First page of shares only; share pagination is never followed.
    #[serde(default)]
    pub shares: Option<Page<Share>>,
}

impl Message {
    pub fn shares(&self) -> &[Share] {
        self.shares.as_ref().map(|p| p.data.as_slice()).unwrap_or(&[])
    }
}

/// Link preview attached to a message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Share {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub link: String,
}

/// Participant name plus chronologically ordered messages, ready to render.
#[derive(Debug, Clone)]
pub struct ConversationTranscript {
    pub conversation_id: String,
    pub participant_name: String,
    pub messages: Vec<Message>,
}

/// Parse Graph timestamps (`2019-05-01T17:02:03+0000`), falling back to RFC 3339.
pub fn parse_graph_time(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z")
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn deserialize_graph_time<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let raw = String::deserialize(deserializer)?;
    parse_graph_time(&raw)
        .ok_or_else(|| D::Error::custom(format!("invalid created_time '{}'", raw)))
}

/// The Graph API sends `null` for some absent fields; treat it like a missing key.
fn deserialize_nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
