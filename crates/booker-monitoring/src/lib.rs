//! Logging and performance monitoring for the booking API harness.

use std::env;
use tracing::info;

pub mod logging;
pub mod performance;

/// Configuration for initializing the monitoring system
#[derive(Debug, Clone)]
pub struct MonitoringConfig {
    /// Service name attached to the startup log line
    pub service_name: String,
    /// Log level filter (e.g., "info,booker_client=debug"), overridden by RUST_LOG
    pub log_filter: String,
    /// Environment under test (dev, staging, prod)
    pub environment: String,
    /// Emit JSON log lines instead of the pretty format
    pub json_logs: bool,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            service_name: "booker-harness".to_string(),
            log_filter: "info".to_string(),
            environment: "staging".to_string(),
            json_logs: false,
        }
    }
}

impl MonitoringConfig {
    /// Defaults overridden from `TEST_ENV` and `BOOKER_LOG_JSON`
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(environment) = env::var("TEST_ENV") {
            config.environment = environment;
        }

        if let Ok(json) = env::var("BOOKER_LOG_JSON") {
            config.json_logs = json == "1" || json.eq_ignore_ascii_case("true");
        }

        config
    }
}

/// Initialize monitoring system
pub fn init(config: &MonitoringConfig) -> anyhow::Result<()> {
    logging::init_logging(config)?;
    info!(environment = %config.environment, "Monitoring initialized");
    Ok(())
}

/// Shutdown the monitoring system
pub fn shutdown() {
    info!("Shutting down monitoring system");
}


// Exported types
pub use crate::performance::*;
