use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, COOKIE};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{ClientError, ClientResult};

pub const DEFAULT_BASE_URL: &str = "https://restful-booker.herokuapp.com";
pub const DEFAULT_ENVIRONMENT: &str = "staging";
pub const DEFAULT_ENV_FILE: &str = "config/environments.json";

pub const AUTH_PATH: &str = "/auth";
pub const BOOKING_PATH: &str = "/booking";

/// Harness configuration, resolved from environment variables
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Root URL of the booking API, without a trailing slash
    pub base_url: String,
    /// Name of the target environment
    pub environment: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// How many times a retryable request is repeated
    pub retry_count: u32,
    /// Base of the exponential backoff, in seconds
    pub retry_backoff: f64,
    pub username: String,
    pub password: String,
    /// JSON file holding per-environment settings
    pub env_file: PathBuf,
    /// Settings for the active environment, empty when none are known
    pub env_config: Map<String, Value>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            environment: DEFAULT_ENVIRONMENT.to_string(),
            timeout_secs: 30,
            retry_count: 3,
            retry_backoff: 1.5,
            username: "admin".to_string(),
            password: "password123".to_string(),
            env_file: PathBuf::from(DEFAULT_ENV_FILE),
            env_config: Map::new(),
        }
    }
}

impl HarnessConfig {
    /// Load configuration from the process environment and the environment file
    pub fn load() -> Self {
        let mut config = Self::from_lookup(|key| env::var(key).ok());
        config.env_config = load_environment_config(&config.env_file, &config.environment);
        config
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// Unparseable numeric values are logged and the default is kept. The
    /// environment file is not read here.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("API_BASE_URL") {
            config.base_url = url.trim_end_matches('/').to_string();
        }

        if let Some(environment) = lookup("TEST_ENV") {
            config.environment = environment;
        }

        if let Some(timeout) = lookup("REQUEST_TIMEOUT") {
            match timeout.parse::<u64>() {
                Ok(secs) => config.timeout_secs = secs,
                Err(_) => warn!("Invalid REQUEST_TIMEOUT: {}, using default", timeout),
            }
        }

        if let Some(count) = lookup("RETRY_COUNT") {
            match count.parse::<u32>() {
                Ok(count) => config.retry_count = count,
                Err(_) => warn!("Invalid RETRY_COUNT: {}, using default", count),
            }
        }

        if let Some(backoff) = lookup("RETRY_BACKOFF") {
            match backoff.parse::<f64>() {
                Ok(factor) if factor.is_finite() && factor >= 0.0 => config.retry_backoff = factor,
                _ => warn!("Invalid RETRY_BACKOFF: {}, using default", backoff),
            }
        }

        if let Some(username) = lookup("BOOKER_USERNAME") {
            config.username = username;
        }

        if let Some(password) = lookup("BOOKER_PASSWORD") {
            config.password = password;
        }

        if let Some(path) = lookup("BOOKER_ENV_FILE") {
            config.env_file = PathBuf::from(path);
        }

        config
    }

    /// Point the configuration at another API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn auth_endpoint(&self) -> String {
        format!("{}{}", self.base_url, AUTH_PATH)
    }

    pub fn booking_endpoint(&self) -> String {
        format!("{}{}", self.base_url, BOOKING_PATH)
    }

    /// JSON content negotiation headers sent with every request
    pub fn default_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    /// Default headers plus the `token` cookie
    pub fn auth_headers(token: &str) -> ClientResult<HeaderMap> {
        let mut headers = Self::default_headers();
        let cookie = HeaderValue::from_str(&format!("token={token}"))
            .map_err(|e| ClientError::InvalidHeader(format!("cookie token: {e}")))?;
        headers.insert(COOKIE, cookie);
        Ok(headers)
    }
}

/// Read the entry for `environment` from a JSON file keyed by environment name.
/// A missing or unreadable file yields an empty map.
pub fn load_environment_config(path: &Path, environment: &str) -> Map<String, Value> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            debug!("No environment file at {}: {}", path.display(), e);
            return Map::new();
        }
    };

    match serde_json::from_str::<Value>(&content) {
        Ok(Value::Object(mut environments)) => match environments.remove(environment) {
            Some(Value::Object(entry)) => entry,
            _ => Map::new(),
        },
        Ok(_) => {
            warn!("Environment file {} is not a JSON object", path.display());
            Map::new()
        }
        Err(e) => {
            warn!("Failed to parse environment file {}: {}", path.display(), e);
            Map::new()
        }
    }
}
