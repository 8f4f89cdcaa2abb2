//! Export pipeline: list conversations, fetch them, write transcripts.
//!
//! The whole listing and every conversation are fetched before the first
//! file is written, so a failed request leaves no new transcripts behind.

pub mod conversations;
pub mod transcript;
pub mod writer;

use std::path::PathBuf;

use tracing::info;

use crate::config::ExportConfig;
use crate::graph::GraphClient;
use crate::{Error, Result};

pub use conversations::{fetch_all, fetch_conversation, list_conversations};
pub use transcript::{share_line, Locale, TranscriptFormat};
pub use writer::{ensure_output_dir, write_transcript};

/// What a finished run produced.
#[derive(Debug, Clone, Default)]
pub struct ExportSummary {
    pub conversations: usize,
    pub files: Vec<PathBuf>,
}

/// Download every private conversation of the page and save one transcript
/// per participant in `config.output_dir`.
///
/// No request is retried; the Graph API rate limit can be hit on pages with
/// many conversations.
pub async fn run(client: &GraphClient, config: &ExportConfig) -> Result<ExportSummary> {
    config.validate()?;
    ensure_output_dir(&config.output_dir).await?;

    // extract
    let summaries = list_conversations(client, &config.page_id, config.limit).await?;

    // transform
    let transcripts = fetch_all(
        client,
        &config.page_id,
        config.limit,
        &summaries,
        config.concurrency,
    )
    .await?;

    // load
    let format = TranscriptFormat::from_config(config);
    let mut files = Vec::with_capacity(transcripts.len());
    for transcript in &transcripts {
        let body = format.render(&transcript.messages);
        let path = write_transcript(&config.output_dir, &transcript.participant_name, &body).await?;
        files.push(path);
    }

    info!(
        conversations = transcripts.len(),
        dir = %config.output_dir.display(),
        "Export finished"
    );

    Ok(ExportSummary {
        conversations: transcripts.len(),
        files,
    })
}

/// Operator instructions for an expired or under-privileged token.
pub fn credential_guidance(config: &ExportConfig) -> String {
    format!(
        "Verify that a valid Facebook Page API token for {} was passed as the first \
         command line parameter.\n\
         The token may be obtained from https://developers.facebook.com/tools/explorer/.\n\
         It requires the pages_messaging permission and must be replaced when expired.",
        config.page_url()
    )
}

/// Guidance to print for `err`, if it is a credential problem.
pub fn guidance_for(err: &Error, config: &ExportConfig) -> Option<String> {
    err.is_auth_failure().then(|| credential_guidance(config))
}
