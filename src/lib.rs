//! Facebook Page Inbox Export Library
//!
//! This library provides tools to:
//! - List the private conversations of a Facebook Page via the Graph API
//! - Fetch every message of each conversation, following pagination
//! - Render conversations as plain-text transcripts with localized timestamps
//! - Write one transcript file per conversation partner
//! - Expose Prometheus metrics about the export

pub mod config;
pub mod error;
pub mod export;
pub mod graph;
pub mod metrics;
pub mod models;

// Re-export common types
pub use config::ExportConfig;
pub use error::{Error, Result};
pub use export::{run, ExportSummary};
pub use graph::GraphClient;
