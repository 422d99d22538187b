//! HTTP wrapper around a pooled `reqwest` client.
//!
//! Every call goes through [`ApiClient::request`], which merges default
//! headers, applies the retry policy and hands back the full response. Non-2xx
//! statuses are returned as values so that negative scenarios can inspect them.

use std::time::{Duration, Instant};

use reqwest::header::HeaderMap;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use booker_monitoring::timed;

use crate::config::{HarnessConfig, BOOKING_PATH};
use crate::error::{ClientError, ClientResult};
use crate::retry::RetryPolicy;

/// Request payload
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Serialized as JSON
    Json(Value),
    /// Sent verbatim, used for malformed-payload scenarios
    Raw(String),
}

impl RequestBody {
    pub fn json<T: Serialize + ?Sized>(data: &T) -> ClientResult<Self> {
        Ok(Self::Json(serde_json::to_value(data)?))
    }
}

impl From<Value> for RequestBody {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

/// A fully read HTTP response
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: String,
    elapsed: Duration,
}

impl ApiResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
            elapsed,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn text(&self) -> &str {
        &self.body
    }

    /// Time spent on the final attempt
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }

    /// Decode the body into `T`
    pub fn json<T: DeserializeOwned>(&self) -> ClientResult<T> {
        serde_json::from_str(&self.body).map_err(|e| {
            ClientError::MalformedResponse(format!(
                "status {} body could not be decoded: {}",
                self.status_code(),
                e
            ))
        })
    }

    pub fn json_value(&self) -> ClientResult<Value> {
        self.json()
    }
}

/// Retrying client bound to one API root
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    retry: RetryPolicy,
    default_headers: HeaderMap,
}

impl ApiClient {
    /// Build a client from configuration
    pub fn new(config: &HarnessConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            retry: RetryPolicy::new(config.retry_count, config.retry_backoff),
            default_headers: HarnessConfig::default_headers(),
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    fn merged_headers(&self, headers: Option<&HeaderMap>) -> HeaderMap {
        let mut merged = self.default_headers.clone();
        if let Some(headers) = headers {
            for (name, value) in headers {
                merged.insert(name.clone(), value.clone());
            }
        }
        merged
    }

    /// Send a request, retrying per the policy.
    ///
    /// `path` is appended to the base URL. Caller headers override the
    /// defaults.
    #[instrument(skip(self, headers, body, params), fields(method = %method, path = %path))]
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        headers: Option<&HeaderMap>,
        body: Option<&RequestBody>,
        params: Option<&[(String, String)]>,
    ) -> ClientResult<ApiResponse> {
        let url = format!("{}{}", self.base_url, path);
        let headers = self.merged_headers(headers);
        let mut retries = 0;

        loop {
            let mut builder = self
                .client
                .request(method.clone(), &url)
                .headers(headers.clone());

            if let Some(params) = params {
                builder = builder.query(params);
            }

            builder = match body {
                Some(RequestBody::Json(value)) => builder.json(value),
                Some(RequestBody::Raw(raw)) => builder.body(raw.clone()),
                None => builder,
            };

            info!("Making {} request to {}", method, url);
            if let Some(body) = body {
                debug!("Request data: {:?}", body);
            }

            let started = Instant::now();
            let response = match builder.send().await {
                Ok(response) => response,
                Err(e) => {
                    if self.retry.allows_retry(&method, retries) {
                        retries += 1;
                        let delay = self.retry.backoff(retries);
                        warn!(
                            "{} {} failed ({}), retry {}/{} in {:?}",
                            method, url, e, retries, self.retry.max_retries, delay
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    error!(method = %method, url = %url, "Request failed: {}", e);
                    return Err(ClientError::Transport {
                        method: method.to_string(),
                        url,
                        source: e,
                    });
                }
            };

            let status = response.status();
            if RetryPolicy::is_idempotent(&method) && RetryPolicy::is_retryable_status(status) {
                if self.retry.allows_retry(&method, retries) {
                    retries += 1;
                    let delay = self.retry.backoff(retries);
                    warn!(
                        "{} {} returned {}, retry {}/{} in {:?}",
                        method, url, status, retries, self.retry.max_retries, delay
                    );
                    tokio::time::sleep(delay).await;
                    continue;
                }

                error!(method = %method, url = %url, status = status.as_u16(), "Retries exhausted");
                return Err(ClientError::RetriesExhausted {
                    method: method.to_string(),
                    url,
                    status: status.as_u16(),
                    attempts: retries + 1,
                });
            }

            let response_headers = response.headers().clone();
            let text = response.text().await.map_err(|e| {
                ClientError::MalformedResponse(format!("{method} {url}: failed to read body: {e}"))
            })?;
            let elapsed = started.elapsed();

            info!("Response status: {}", status.as_u16());
            if status.is_client_error() || status.is_server_error() {
                warn!("Error response: {}", text);
            }

            return Ok(ApiResponse::new(status, response_headers, text, elapsed));
        }
    }

    pub async fn get(
        &self,
        path: &str,
        headers: Option<&HeaderMap>,
        params: Option<&[(String, String)]>,
    ) -> ClientResult<ApiResponse> {
        self.request(Method::GET, path, headers, None, params).await
    }

    pub async fn post(
        &self,
        path: &str,
        body: &RequestBody,
        headers: Option<&HeaderMap>,
    ) -> ClientResult<ApiResponse> {
        self.request(Method::POST, path, headers, Some(body), None).await
    }

    pub async fn put(
        &self,
        path: &str,
        body: &RequestBody,
        headers: Option<&HeaderMap>,
    ) -> ClientResult<ApiResponse> {
        self.request(Method::PUT, path, headers, Some(body), None).await
    }

    pub async fn patch(
        &self,
        path: &str,
        body: &RequestBody,
        headers: Option<&HeaderMap>,
    ) -> ClientResult<ApiResponse> {
        self.request(Method::PATCH, path, headers, Some(body), None).await
    }

    pub async fn delete(&self, path: &str, headers: Option<&HeaderMap>) -> ClientResult<ApiResponse> {
        self.request(Method::DELETE, path, headers, None, None).await
    }

    /// Send a request and measure wall-clock time across all attempts, in milliseconds
    pub async fn timed_request(
        &self,
        method: Method,
        path: &str,
        headers: Option<&HeaderMap>,
        body: Option<&RequestBody>,
        params: Option<&[(String, String)]>,
    ) -> ClientResult<(ApiResponse, f64)> {
        let (result, elapsed_ms) = timed(self.request(method, path, headers, body, params)).await;
        let response = result?;
        info!("Response time: {:.2}ms", elapsed_ms);
        Ok((response, elapsed_ms))
    }

    /// True when the booking listing answers 200
    pub async fn check_health(&self) -> bool {
        match self.get(BOOKING_PATH, None, None).await {
            Ok(response) => response.status() == StatusCode::OK,
            Err(e) => {
                error!("API health check failed: {}", e);
                false
            }
        }
    }
}
