//! Minimal Graph API client (read-only GET requests).

use std::time::Instant;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::metrics;
use crate::models::Page;
use crate::{Error, Result};

use super::pagination::follow_pages;

/// Graph API endpoint with the version the exporter was written against.
pub const GRAPH_API_URL: &str = "https://graph.facebook.com/v3.3";

/// Holds the page access token for the whole run. Cheap to clone.
#[derive(Debug, Clone)]
pub struct GraphClient {
    http: Client,
    access_token: String,
    base_url: String,
}

impl GraphClient {
    /// Create client for the public Graph API.
    pub fn new<S: Into<String>>(access_token: S) -> Result<Self> {
        Self::with_base_url(access_token, GRAPH_API_URL)
    }

    /// Create client with custom base url (tests, API version pinning).
    pub fn with_base_url<S1: Into<String>, S2: Into<String>>(
        access_token: S1,
        base_url: S2,
    ) -> Result<Self> {
        let access_token = access_token.into();
        if access_token.trim().is_empty() {
            return Err(Error::InvalidArgument("access token is empty".to_string()));
        }

        let http = Client::builder()
            .user_agent(format!("page_inbox_export/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            access_token: access_token.trim().to_string(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `{base_url}/{path}` with query parameters.
    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        self.request(&url, query, path_kind(path)).await
    }

    /// GET an opaque continuation URL exactly as the API returned it.
    pub async fn get_page<T: DeserializeOwned>(&self, url: &str) -> Result<Page<T>> {
        self.request(url, &[], "next_page").await
    }

    /// Pull the remaining pages of a collection whose first page is already known.
    pub async fn collect_pages<T: DeserializeOwned>(&self, first: Page<T>) -> Result<Vec<T>> {
        follow_pages(first, |url| async move { self.get_page::<T>(&url).await }).await
    }

    async fn request<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        kind: &'static str,
    ) -> Result<T> {
        debug!(url = %redact(url), kind, "Graph API request");
        let started = Instant::now();

        let result = self.send(url, query).await.and_then(|text| {
            serde_json::from_str(&text).map_err(|e| {
                Error::SerializationError(format!(
                    "unexpected Graph API response from {}: {}",
                    redact(url),
                    e
                ))
            })
        });

        let status = match &result {
            Ok(_) => "ok",
            Err(err) if err.is_auth_failure() => "auth_error",
            Err(_) => "error",
        };
        metrics::record_graph_request(kind, status, started.elapsed());

        result
    }

    async fn send(&self, url: &str, query: &[(&str, String)]) -> Result<String> {
        let mut request = self.http.get(url).bearer_auth(&self.access_token);
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Http(format!("request to {} failed: {}", redact(url), e.without_url())))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::Http(format!("failed to read response body: {}", e.without_url())))?;

        if !status.is_success() {
            return Err(api_error(status, &text));
        }

        Ok(text)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: GraphError,
}

#[derive(Debug, Deserialize)]
struct GraphError {
    #[serde(default)]
    message: String,
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    code: i64,
}

/// Turn a non-2xx response into `Error::GraphApi`, keeping the raw body when
/// it is not a Graph error envelope.
fn api_error(status: StatusCode, body: &str) -> Error {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => Error::GraphApi {
            status: status.as_u16(),
            code: envelope.error.code,
            kind: envelope.error.kind,
            message: envelope.error.message,
        },
        Err(_) => Error::GraphApi {
            status: status.as_u16(),
            code: 0,
            kind: "HttpError".to_string(),
            message: body.chars().take(500).collect(),
        },
    }
}

fn path_kind(path: &str) -> &'static str {
    if path.trim_end_matches('/').ends_with("/conversations") {
        "conversations"
    } else {
        "conversation"
    }
}

/// Continuation URLs embed the access token; keep it out of error messages.
fn redact(url: &str) -> String {
    match url.split_once('?') {
        Some((base, _)) => format!("{}?…", base),
        None => url.to_string(),
    }
}
