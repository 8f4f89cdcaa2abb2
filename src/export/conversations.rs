//! Listing page conversations and fetching their messages.

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, info};

use crate::graph::GraphClient;
use crate::models::{ConversationDetail, ConversationSummary, ConversationTranscript, Page};
use crate::{Error, Result};

/// Field selection for the conversation detail request.
pub const CONVERSATION_FIELDS: &str =
    "messages{from,created_time,message,shares{name,description,link}},participants";

/// All private conversations of the page, in the order the API lists them.
pub async fn list_conversations(
    client: &GraphClient,
    page_id: &str,
    limit: u32,
) -> Result<Vec<ConversationSummary>> {
    let first: Page<ConversationSummary> = client
        .get(
            &format!("{}/conversations", page_id),
            &[("limit", limit.to_string())],
        )
        .await?;

    let conversations = client.collect_pages(first).await?;
    info!(count = conversations.len(), "Listed conversations");
    Ok(conversations)
}

/// Messages of one conversation, oldest first, with the name of the person
/// the page talked to.
pub async fn fetch_conversation(
    client: &GraphClient,
    page_id: &str,
    limit: u32,
    summary: &ConversationSummary,
) -> Result<ConversationTranscript> {
    let detail: ConversationDetail = client
        .get(
            &summary.id,
            &[
                ("fields", CONVERSATION_FIELDS.to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await?;

    let participant_name = detail
        .other_participant(page_id)
        .map(|p| p.name.clone())
        .ok_or_else(|| Error::MissingParticipant(summary.id.clone()))?;

    // Shares are paged separately; only their first page is kept so the
    // export stays within the Graph API rate limit.
    let mut messages = client.collect_pages(detail.messages).await?;

    // The Graph API returns messages newest first.
    messages.reverse();

    debug!(
        conversation = %summary.id,
        participant = %participant_name,
        messages = messages.len(),
        "Fetched conversation"
    );

    Ok(ConversationTranscript {
        conversation_id: summary.id.clone(),
        participant_name,
        messages,
    })
}

/// Fetch every conversation with at most `concurrency` requests in flight.
///
/// The first failure aborts the whole batch. Results keep the listing order.
pub async fn fetch_all(
    client: &GraphClient,
    page_id: &str,
    limit: u32,
    summaries: &[ConversationSummary],
    concurrency: usize,
) -> Result<Vec<ConversationTranscript>> {
    let concurrency = concurrency.max(1);

    let transcripts: Vec<ConversationTranscript> = stream::iter(summaries)
        .map(|summary| fetch_conversation(client, page_id, limit, summary))
        .buffered(concurrency)
        .try_collect()
        .await?;

    info!(count = transcripts.len(), "Fetched all conversations");
    Ok(transcripts)
}
