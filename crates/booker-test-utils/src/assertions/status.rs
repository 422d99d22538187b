use booker_client::ApiResponse;
use thiserror::Error;

/// Statuses tolerated when the API may accept or reject a malformed field
pub const LENIENT_VALIDATION_STATUSES: [u16; 3] = [200, 400, 422];

/// Statuses tolerated for payloads that may also crash the API
pub const LENIENT_ERROR_STATUSES: [u16; 4] = [200, 400, 422, 500];

/// Statuses that mean an authenticated write was refused
pub const AUTH_FAILURE_STATUSES: [u16; 2] = [401, 403];

/// Error type for response and record validation failures
#[derive(Debug, Error, PartialEq)]
pub enum AssertionError {
    #[error("Unexpected status: expected {expected}, got {actual} (body: {body})")]
    StatusMismatch { expected: u16, actual: u16, body: String },

    #[error("Unexpected status: expected one of {allowed:?}, got {actual} (body: {body})")]
    StatusNotAllowed {
        allowed: Vec<u16>,
        actual: u16,
        body: String,
    },

    #[error("Field {field} mismatch: expected {expected}, got {actual}")]
    FieldMismatch {
        field: String,
        expected: String,
        actual: String,
    },

    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("{operation} took {elapsed_ms:.2}ms, limit is {limit_ms}ms")]
    TooSlow {
        operation: String,
        elapsed_ms: f64,
        limit_ms: f64,
    },

    #[error("Assertion failed: {0}")]
    Other(String),
}

pub fn assert_status(response: &ApiResponse, expected: u16) -> Result<(), AssertionError> {
    if response.status_code() != expected {
        return Err(AssertionError::StatusMismatch {
            expected,
            actual: response.status_code(),
            body: response.text().to_string(),
        });
    }
    Ok(())
}

pub fn assert_status_in(response: &ApiResponse, allowed: &[u16]) -> Result<(), AssertionError> {
    if !allowed.contains(&response.status_code()) {
        return Err(AssertionError::StatusNotAllowed {
            allowed: allowed.to_vec(),
            actual: response.status_code(),
            body: response.text().to_string(),
        });
    }
    Ok(())
}

pub fn assert_response_time(operation: &str, elapsed_ms: f64, limit_ms: f64) -> Result<(), AssertionError> {
    if elapsed_ms > limit_ms {
        return Err(AssertionError::TooSlow {
            operation: operation.to_string(),
            elapsed_ms,
            limit_ms,
        });
    }
    Ok(())
}
