//! Graph API access: authenticated client and pagination.

pub mod client;
pub mod pagination;

pub use client::{GraphClient, GRAPH_API_URL};
pub use pagination::follow_pages;
