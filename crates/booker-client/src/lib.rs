//! Client side of the booking API acceptance harness.
//!
//! [`ApiClient`] wraps a pooled `reqwest` client with a bounded retry policy.
//! [`AuthHelper`] and [`BookingHelper`] build the resource operations the
//! scenarios drive on top of it.

pub mod auth;
pub mod booking;
pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod retry;
pub mod schema;

pub use auth::{cookie_headers, AuthHelper};
pub use booking::{BookingHelper, SEARCH_FETCH_LIMIT};
pub use config::HarnessConfig;
pub use error::{ClientError, ClientResult};
pub use http::{ApiClient, ApiResponse, RequestBody};
pub use models::{
    Booking, BookingDates, BookingFilter, BookingRecord, BookingRef, CreatedBooking, Credentials, SearchHit,
};
pub use retry::RetryPolicy;
pub use schema::{validate_schema, validate_value};

// Re-exported so callers can name methods and headers without a direct dependency
pub use reqwest::header::HeaderMap;
pub use reqwest::{Method, StatusCode};
