use booker_client::ClientError;
use thiserror::Error;

/// Error types for the harness utilities
#[derive(Debug, Error)]
pub enum TestError {
    /// Booking API client error
    #[error("API client error: {0}")]
    Client(#[from] ClientError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Fake server error
    #[error("Server error: {0}")]
    Server(String),

    /// Test setup failed
    #[error("Test setup failed: {0}")]
    TestSetupFailed(String),

    /// Other errors
    #[error("Other error: {0}")]
    Other(String),
}
