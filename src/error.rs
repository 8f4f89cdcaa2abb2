//! Error types for the page inbox exporter

use thiserror::Error;

/// Graph API error codes that mean the token is missing, expired or lacks
/// a permission.
const AUTH_ERROR_CODES: [i64; 3] = [10, 102, 190];
const PERMISSION_ERROR_CODES: std::ops::RangeInclusive<i64> = 200..=299;
/// Throttling codes, also reported as `OAuthException`.
const RATE_LIMIT_ERROR_CODES: [i64; 4] = [4, 17, 32, 613];

#[derive(Error, Debug)]
pub enum Error {
    #[error("Graph API error (HTTP {status}, {kind} #{code}): {message}")]
    GraphApi {
        status: u16,
        code: i64,
        kind: String,
        message: String,
    },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Conversation {0} has no participant other than the page")]
    MissingParticipant(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// True when the upstream API rejected the credential.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            Error::GraphApi {
                status, code, kind, ..
            } if !RATE_LIMIT_ERROR_CODES.contains(code) => {
                *status == 401
                    || *status == 403
                    || kind == "OAuthException"
                    || AUTH_ERROR_CODES.contains(code)
                    || PERMISSION_ERROR_CODES.contains(code)
            }
            _ => false,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Http(err.without_url().to_string())
    }
}
