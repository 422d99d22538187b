//! Token acquisition and validation against `/auth`.

use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{error, info, instrument, warn};

use crate::config::{HarnessConfig, AUTH_PATH, BOOKING_PATH};
use crate::error::ClientResult;
use crate::http::{ApiClient, RequestBody};
use crate::models::Credentials;

/// Build headers carrying `Cookie: token=<value>`
pub fn cookie_headers(token: &str) -> ClientResult<HeaderMap> {
    HarnessConfig::auth_headers(token)
}

#[derive(Debug, Clone)]
pub struct AuthHelper {
    client: ApiClient,
}

impl AuthHelper {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Request a token. Any outcome other than a 200 carrying a string
    /// `token` yields `None`.
    #[instrument(skip(self, password))]
    pub async fn obtain_token(&self, username: &str, password: &str) -> Option<String> {
        let body = match RequestBody::json(&Credentials::new(username, password)) {
            Ok(body) => body,
            Err(e) => {
                error!("Authentication error: {}", e);
                return None;
            }
        };

        let response = match self.client.post(AUTH_PATH, &body, None).await {
            Ok(response) => response,
            Err(e) => {
                error!("Authentication error: {}", e);
                return None;
            }
        };

        if response.status() != StatusCode::OK {
            error!("Authentication failed with status: {}", response.status_code());
            return None;
        }

        let token = response
            .json_value()
            .ok()
            .and_then(|body| body.get("token").and_then(Value::as_str).map(str::to_string));

        match token {
            Some(token) => {
                info!("Authentication successful");
                Some(token)
            }
            None => {
                warn!("Authentication rejected: {}", response.text());
                None
            }
        }
    }

    /// A token is valid unless an authenticated read is answered with 401 or 403
    pub async fn is_token_valid(&self, token: &str) -> bool {
        let headers = match cookie_headers(token) {
            Ok(headers) => headers,
            Err(e) => {
                error!("Token validation error: {}", e);
                return false;
            }
        };

        let path = format!("{BOOKING_PATH}/1");
        match self.client.get(&path, Some(&headers), None).await {
            Ok(response) => !matches!(
                response.status(),
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
            ),
            Err(e) => {
                error!("Token validation error: {}", e);
                false
            }
        }
    }

    /// True when the credentials do not produce a token
    pub async fn rejects_credentials(&self, username: &str, password: &str) -> bool {
        self.obtain_token(username, password).await.is_none()
    }
}
