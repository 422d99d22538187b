//! Error types for the booking API client

use thiserror::Error;

/// Errors raised while talking to the booking API.
///
/// Non-2xx statuses are not errors: they come back as a normal response so
/// negative scenarios can assert on them.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or timeout failure, after retries
    #[error("{method} {url} failed: {source}")]
    Transport {
        method: String,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// An idempotent request kept returning a retryable status
    #[error("{method} {url} still returned {status} after {attempts} attempts")]
    RetriesExhausted {
        method: String,
        url: String,
        status: u16,
        attempts: u32,
    },

    /// Body could not be read or decoded as expected
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Header name or value rejected
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type ClientResult<T> = Result<T, ClientError>;
