//! Writing transcripts to the output directory.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tokio::fs;
use tracing::info;

use crate::metrics;
use crate::Result;

static UNSAFE_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[/\\\x00]").expect("valid filename regex"));

/// File stem for a participant: the display name as-is, minus path separators.
pub fn transcript_file_stem(participant_name: &str) -> String {
    let stem = UNSAFE_FILENAME_CHARS.replace_all(participant_name, "_");
    match stem.trim() {
        "" | "." | ".." => "unknown".to_string(),
        _ => stem.into_owned(),
    }
}

/// Create the output directory and any missing parents.
pub async fn ensure_output_dir(output_dir: &Path) -> Result<()> {
    fs::create_dir_all(output_dir).await?;
    Ok(())
}

/// Write `<participant_name>.txt` into `output_dir`, replacing an existing file.
///
/// Two participants with the same display name share one file; the later
/// write wins.
pub async fn write_transcript(
    output_dir: &Path,
    participant_name: &str,
    body: &str,
) -> Result<PathBuf> {
    ensure_output_dir(output_dir).await?;

    let path = output_dir.join(format!("{}.txt", transcript_file_stem(participant_name)));
    fs::write(&path, body).await?;

    metrics::record_transcript_written();
    info!(path = %path.display(), bytes = body.len(), "Saved transcript");
    Ok(path)
}
