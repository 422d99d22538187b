//! Run-wide state shared by every scenario.

use booker_client::{cookie_headers, ApiClient, AuthHelper, BookingHelper, HarnessConfig, HeaderMap};
use booker_monitoring::{PerformanceMonitor, PerformanceSummary};
use parking_lot::Mutex;
use tokio::sync::OnceCell;
use tracing::{info, instrument};

use crate::config::RunPaths;
use crate::error::TestError;
use crate::fixtures::FixtureSet;
use crate::report::{ResultAggregator, RunSummary};
use crate::security::{security_report, ProbeResult};

/// One HTTP client, one token and one set of collectors per run.
///
/// Locks guard plain data and are never held across an await point.
#[derive(Debug)]
pub struct HarnessSession {
    config: HarnessConfig,
    paths: RunPaths,
    client: ApiClient,
    auth: AuthHelper,
    bookings: BookingHelper,
    fixtures: FixtureSet,
    performance: Mutex<PerformanceMonitor>,
    probes: Mutex<Vec<ProbeResult>>,
    results: ResultAggregator,
    token: OnceCell<String>,
}

impl HarnessSession {
    pub fn new(config: HarnessConfig, paths: RunPaths) -> Result<Self, TestError> {
        let client = ApiClient::new(&config)?;
        let fixtures = FixtureSet::load(&paths.data_dir);

        info!(
            base_url = %config.base_url,
            environment = %config.environment,
            "Harness session created"
        );

        Ok(Self {
            auth: AuthHelper::new(client.clone()),
            bookings: BookingHelper::new(client.clone()),
            client,
            config,
            paths,
            fixtures,
            performance: Mutex::new(PerformanceMonitor::new()),
            probes: Mutex::new(Vec::new()),
            results: ResultAggregator::new(),
            token: OnceCell::new(),
        })
    }

    /// Session configured from environment variables
    pub fn from_env() -> Result<Self, TestError> {
        Self::new(HarnessConfig::load(), RunPaths::load())
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn paths(&self) -> &RunPaths {
        &self.paths
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn auth(&self) -> &AuthHelper {
        &self.auth
    }

    pub fn bookings(&self) -> &BookingHelper {
        &self.bookings
    }

    pub fn fixtures(&self) -> &FixtureSet {
        &self.fixtures
    }

    pub fn results(&self) -> &ResultAggregator {
        &self.results
    }

    /// The run's token, requested on first use and cached afterwards
    #[instrument(skip(self))]
    pub async fn token(&self) -> Result<&str, TestError> {
        self.token
            .get_or_try_init(|| async {
                self.auth
                    .obtain_token(&self.config.username, &self.config.password)
                    .await
                    .ok_or_else(|| {
                        TestError::TestSetupFailed("Failed to obtain authentication token".to_string())
                    })
            })
            .await
            .map(String::as_str)
    }

    /// Cookie headers for the session token
    pub async fn auth_headers(&self) -> Result<HeaderMap, TestError> {
        let token = self.token().await?;
        Ok(cookie_headers(token)?)
    }

    pub async fn check_api_health(&self) -> bool {
        self.client.check_health().await
    }

    /// Record a timing. Returns `false` when it exceeded the operation's threshold.
    pub fn record_timing(&self, operation: &str, elapsed_ms: f64) -> bool {
        self.performance.lock().record(operation, elapsed_ms)
    }

    pub fn performance_threshold(&self, operation: &str) -> f64 {
        self.performance.lock().threshold(operation)
    }

    pub fn performance_summary(&self) -> Option<PerformanceSummary> {
        self.performance.lock().summary()
    }

    /// Keep probe results and refresh the security summary
    pub fn record_probes(&self, results: &[ProbeResult]) {
        let report = {
            let mut probes = self.probes.lock();
            probes.extend_from_slice(results);
            security_report(&probes)
        };
        self.results.set_security(report);
    }

    /// Attach the latest collector summaries and summarize the run
    pub fn finish(&self) -> RunSummary {
        if let Some(performance) = self.performance_summary() {
            self.results.set_performance(performance);
        }
        self.results.summarize()
    }
}
