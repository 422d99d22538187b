//! Scenario result aggregation and run reports.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use booker_monitoring::PerformanceSummary;
use chrono::{DateTime, Local, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::error::TestError;
use crate::security::SecurityReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TestStatus {
    Passed,
    Failed,
}

impl TestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "PASSED",
            Self::Failed => "FAILED",
        }
    }
}

/// Outcome of one scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRecord {
    pub name: String,
    pub status: TestStatus,
    pub duration_secs: f64,
    pub timestamp: DateTime<Utc>,
    pub details: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub total_duration: String,
    pub total_tests: usize,
    pub passed: usize,
    pub failed: usize,
    pub success_rate: String,
    pub performance_summary: Option<PerformanceSummary>,
    pub security_summary: Option<SecurityReport>,
    pub failed_tests: Vec<TestRecord>,
}

impl RunSummary {
    /// A run succeeds when something ran and nothing failed
    pub fn is_success(&self) -> bool {
        self.total_tests > 0 && self.failed == 0
    }
}

/// Collects scenario results for the whole run.
///
/// Shared by reference between hooks; every method takes `&self`.
#[derive(Debug)]
pub struct ResultAggregator {
    start_time: DateTime<Utc>,
    records: Mutex<Vec<TestRecord>>,
    performance: Mutex<Option<PerformanceSummary>>,
    security: Mutex<Option<SecurityReport>>,
}

impl Default for ResultAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self {
            start_time: Utc::now(),
            records: Mutex::new(Vec::new()),
            performance: Mutex::new(None),
            security: Mutex::new(None),
        }
    }

    pub fn add_result(&self, name: impl Into<String>, status: TestStatus, duration_secs: f64, details: Value) {
        self.records.lock().push(TestRecord {
            name: name.into(),
            status,
            duration_secs,
            timestamp: Utc::now(),
            details,
        });
    }

    /// Replace the performance summary attached to the report
    pub fn set_performance(&self, summary: PerformanceSummary) {
        *self.performance.lock() = Some(summary);
    }

    /// Replace the security summary attached to the report
    pub fn set_security(&self, report: SecurityReport) {
        *self.security.lock() = Some(report);
    }

    pub fn records(&self) -> Vec<TestRecord> {
        self.records.lock().clone()
    }

    pub fn summarize(&self) -> RunSummary {
        let end_time = Utc::now();
        let records = self.records.lock().clone();

        let total = records.len();
        let passed = records.iter().filter(|r| r.status == TestStatus::Passed).count();
        let failed_tests: Vec<TestRecord> = records
            .into_iter()
            .filter(|r| r.status == TestStatus::Failed)
            .collect();

        let success_rate = if total == 0 {
            "0%".to_string()
        } else {
            format!("{:.1}%", passed as f64 / total as f64 * 100.0)
        };

        let duration = (end_time - self.start_time).num_milliseconds() as f64 / 1000.0;

        RunSummary {
            start_time: self.start_time,
            end_time,
            total_duration: format!("{duration:.2}s"),
            total_tests: total,
            passed,
            failed: failed_tests.len(),
            success_rate,
            performance_summary: self.performance.lock().clone(),
            security_summary: self.security.lock().clone(),
            failed_tests,
        }
    }
}

/// Human-readable report
pub fn render_text(suite: &str, summary: &RunSummary, records: &[TestRecord]) -> String {
    let mut out = String::new();
    let rule = "=".repeat(50);

    let _ = writeln!(out, "Booking API Test Report: {suite}");
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "Started:      {}", summary.start_time.to_rfc3339());
    let _ = writeln!(out, "Finished:     {}", summary.end_time.to_rfc3339());
    let _ = writeln!(out, "Duration:     {}", summary.total_duration);
    let _ = writeln!(out, "Total Tests:  {}", summary.total_tests);
    let _ = writeln!(out, "Passed:       {}", summary.passed);
    let _ = writeln!(out, "Failed:       {}", summary.failed);
    let _ = writeln!(out, "Success Rate: {}", summary.success_rate);

    if !records.is_empty() {
        let _ = writeln!(out, "\nScenarios");
        let _ = writeln!(out, "{}", "-".repeat(50));
        for record in records {
            let _ = writeln!(
                out,
                "[{}] {} ({:.2}s)",
                record.status.as_str(),
                record.name,
                record.duration_secs
            );
        }
    }

    if !summary.failed_tests.is_empty() {
        let _ = writeln!(out, "\nFailures");
        let _ = writeln!(out, "{}", "-".repeat(50));
        for record in &summary.failed_tests {
            let _ = writeln!(out, "{}: {}", record.name, record.details);
        }
    }

    if let Some(performance) = &summary.performance_summary {
        let _ = writeln!(out, "\nPerformance");
        let _ = writeln!(out, "{}", "-".repeat(50));
        let _ = writeln!(out, "Calls:   {}", performance.total_calls);
        let _ = writeln!(out, "Average: {}", performance.avg_response_time);
        let _ = writeln!(out, "Min:     {}", performance.min_response_time);
        let _ = writeln!(out, "Max:     {}", performance.max_response_time);
        let _ = writeln!(out, "Slowest: {}", performance.slowest_operation.operation);
    }

    if let Some(security) = &summary.security_summary {
        let _ = writeln!(out, "\nSecurity");
        let _ = writeln!(out, "{}", "-".repeat(50));
        let _ = writeln!(out, "Probes:  {}", security.total_security_tests);
        let _ = writeln!(out, "Flagged: {}", security.potentially_vulnerable_responses);
        let _ = writeln!(out, "Score:   {}", security.security_score);
        for recommendation in &security.recommendations {
            let _ = writeln!(out, "  - {recommendation}");
        }
    }

    out
}

/// Write the machine-readable summary, creating parent directories
pub fn save_json(summary: &RunSummary, path: &Path) -> Result<(), TestError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(summary)?)?;
    info!("Report saved: {}", path.display());
    Ok(())
}

pub fn save_text(report: &str, path: &Path) -> Result<(), TestError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, report)?;
    info!("Report saved: {}", path.display());
    Ok(())
}

/// `<suite>_<YYYYmmdd_HHMMSS>_report.txt` and `.json` under `reports_dir`
pub fn report_paths(reports_dir: &Path, suite: &str, at: DateTime<Local>) -> (PathBuf, PathBuf) {
    let stamp = at.format("%Y%m%d_%H%M%S");
    let suite = suite.trim().replace(' ', "_").to_lowercase();
    (
        reports_dir.join(format!("{suite}_{stamp}_report.txt")),
        reports_dir.join(format!("{suite}_{stamp}_report.json")),
    )
}
