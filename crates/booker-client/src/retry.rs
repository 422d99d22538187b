//! Bounded retry with exponential backoff.

use std::time::Duration;

use reqwest::{Method, StatusCode};

/// Upper bound on a single backoff sleep
pub const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Statuses that trigger a retry on idempotent requests
pub const RETRYABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Seconds slept before the first retry; doubles for each later one
    pub backoff_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_factor: 1.5,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff_factor: f64) -> Self {
        Self {
            max_retries,
            backoff_factor,
        }
    }

    /// A policy that sends every request exactly once
    pub fn none() -> Self {
        Self::new(0, 0.0)
    }

    pub fn is_idempotent(method: &Method) -> bool {
        matches!(
            *method,
            Method::GET | Method::HEAD | Method::OPTIONS | Method::PUT | Method::DELETE
        )
    }

    pub fn is_retryable_status(status: StatusCode) -> bool {
        RETRYABLE_STATUSES.contains(&status.as_u16())
    }

    /// Whether `method` may be attempted again after `retries_done` retries
    pub fn allows_retry(&self, method: &Method, retries_done: u32) -> bool {
        Self::is_idempotent(method) && retries_done < self.max_retries
    }

    /// Sleep before retry number `retry` (1-based): `factor * 2^(retry-1)` seconds, capped
    pub fn backoff(&self, retry: u32) -> Duration {
        if retry == 0 {
            return Duration::ZERO;
        }

        let exponent = (retry - 1).min(31) as i32;
        let secs = self.backoff_factor * 2f64.powi(exponent);
        if !secs.is_finite() || secs <= 0.0 {
            return Duration::ZERO;
        }

        Duration::from_secs_f64(secs.min(MAX_BACKOFF.as_secs_f64()))
    }
}
