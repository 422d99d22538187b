//! Response-time tracking for API operations.
//!
//! Every measured call is appended to an ordered list that lives for the whole
//! run. Calls slower than their operation's threshold are logged as warnings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::time::Instant;
use tracing::{info, warn};

/// Threshold used for operations without an explicit entry
pub const DEFAULT_THRESHOLD_MS: f64 = 5000.0;

/// A single timed API call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetric {
    pub operation: String,
    pub elapsed_ms: f64,
    pub timestamp: DateTime<Utc>,
}

/// Aggregate view over all recorded metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub total_calls: usize,
    pub avg_response_time: String,
    pub min_response_time: String,
    pub max_response_time: String,
    pub slowest_operation: PerformanceMetric,
}

/// Collects per-operation timings and checks them against thresholds
#[derive(Debug, Clone)]
pub struct PerformanceMonitor {
    metrics: Vec<PerformanceMetric>,
    thresholds: HashMap<String, f64>,
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl PerformanceMonitor {
    pub fn new() -> Self {
        let thresholds = [
            ("create_booking", 5000.0),
            ("get_booking", 3000.0),
            ("update_booking", 5000.0),
            ("delete_booking", 3000.0),
            ("search_bookings", 10000.0),
        ]
        .into_iter()
        .map(|(operation, ms)| (operation.to_string(), ms))
        .collect();

        Self {
            metrics: Vec::new(),
            thresholds,
        }
    }

    /// Override or add the threshold for one operation
    pub fn with_threshold(mut self, operation: impl Into<String>, threshold_ms: f64) -> Self {
        self.thresholds.insert(operation.into(), threshold_ms);
        self
    }

    pub fn threshold(&self, operation: &str) -> f64 {
        self.thresholds
            .get(operation)
            .copied()
            .unwrap_or(DEFAULT_THRESHOLD_MS)
    }

    /// Record a timing. Returns `false` when the call exceeded its threshold.
    pub fn record(&mut self, operation: &str, elapsed_ms: f64) -> bool {
        self.metrics.push(PerformanceMetric {
            operation: operation.to_string(),
            elapsed_ms,
            timestamp: Utc::now(),
        });

        let threshold = self.threshold(operation);
        if elapsed_ms > threshold {
            warn!(
                operation,
                elapsed_ms, threshold, "{operation} took {elapsed_ms:.2}ms (threshold: {threshold}ms)"
            );
            false
        } else {
            info!(operation, elapsed_ms, "{operation} completed in {elapsed_ms:.2}ms");
            true
        }
    }

    pub fn metrics(&self) -> &[PerformanceMetric] {
        &self.metrics
    }

    /// Summary over everything recorded so far, `None` when nothing was measured
    pub fn summary(&self) -> Option<PerformanceSummary> {
        let slowest = self
            .metrics
            .iter()
            .max_by(|a, b| a.elapsed_ms.total_cmp(&b.elapsed_ms))?;

        let total: f64 = self.metrics.iter().map(|m| m.elapsed_ms).sum();
        let min = self
            .metrics
            .iter()
            .map(|m| m.elapsed_ms)
            .fold(f64::INFINITY, f64::min);
        let avg = total / self.metrics.len() as f64;

        Some(PerformanceSummary {
            total_calls: self.metrics.len(),
            avg_response_time: format!("{avg:.2}ms"),
            min_response_time: format!("{min:.2}ms"),
            max_response_time: format!("{:.2}ms", slowest.elapsed_ms),
            slowest_operation: slowest.clone(),
        })
    }
}

/// Await a future and report its wall-clock duration in milliseconds
pub async fn timed<F: Future>(future: F) -> (F::Output, f64) {
    let started = Instant::now();
    let output = future.await;
    (output, started.elapsed().as_secs_f64() * 1000.0)
}
