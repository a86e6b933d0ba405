//! Uniform request/response plumbing between the admin views and the REST API.
//!
//! A [`RequestClient`] never fails: HTTP statuses come back verbatim and
//! anything below the HTTP layer (refused connections, timeouts, bodies that
//! are not JSON) is folded into [`ApiResult::transport_failure`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

pub const STATUS_OK: u16 = 200;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResult {
    pub status: u16,
    pub body: Option<Value>,
    pub transport_error: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    ServerError(u16),
    TransportFailure,
}

impl ApiResult {
    pub fn ok(body: Option<Value>) -> Self {
        Self::with_status(STATUS_OK, body)
    }

    pub fn with_status(status: u16, body: Option<Value>) -> Self {
        Self {
            status,
            body,
            transport_error: false,
        }
    }

    pub fn transport_failure() -> Self {
        Self {
            status: 0,
            body: None,
            transport_error: true,
        }
    }

    pub fn outcome(&self) -> Outcome {
        if self.transport_error {
            Outcome::TransportFailure
        } else if self.status == STATUS_OK {
            Outcome::Success
        } else {
            Outcome::ServerError(self.status)
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome() == Outcome::Success
    }
}

#[async_trait]
pub trait RequestClient: Send + Sync {
    /// Issues exactly one call. No retries, no caching.
    async fn request(&self, method: Method, path: &str, body: Option<Value>) -> ApiResult;
}

#[derive(Debug, Error)]
pub enum ClientBuildError {
    #[error("invalid server url '{url}': {source}")]
    InvalidServerUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("failed to build http client: {0}")]
    Http(#[from] reqwest::Error),
}

pub struct HttpRequestClient {
    http: Client,
    server_url: String,
}

impl HttpRequestClient {
    pub fn new(server_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientBuildError> {
        let server_url = server_url.into();
        url::Url::parse(&server_url).map_err(|source| ClientBuildError::InvalidServerUrl {
            url: server_url.clone(),
            source,
        })?;
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            server_url: server_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    fn endpoint(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.server_url)
        } else {
            format!("{}/{path}", self.server_url)
        }
    }
}

#[async_trait]
impl RequestClient for HttpRequestClient {
    async fn request(&self, method: Method, path: &str, body: Option<Value>) -> ApiResult {
        let url = self.endpoint(path);
        let mut builder = self.http.request(method.clone(), &url);
        if let Some(body) = &body {
            builder = builder.json(body);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(
                    method = %method,
                    path,
                    timed_out = err.is_timeout(),
                    error = %err,
                    "transport: request failed"
                );
                return ApiResult::transport_failure();
            }
        };

        let status = response.status().as_u16();
        if status != STATUS_OK {
            debug!(method = %method, path, status, "transport: non-success status");
            return ApiResult::with_status(status, None);
        }

        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(method = %method, path, error = %err, "transport: failed to read body");
                return ApiResult::transport_failure();
            }
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return ApiResult::ok(None);
        }

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(body) => ApiResult::ok(Some(body)),
            Err(err) => {
                warn!(method = %method, path, error = %err, "transport: malformed response body");
                ApiResult::transport_failure()
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
