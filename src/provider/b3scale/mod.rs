//! b3scale REST client
//!
//! Native REST implementation of [`FrontendApi`](crate::provider::FrontendApi)
//! against the b3scale admin API v1 (`/api/v1/frontends`).
//! Uses reqwest with rustls, so it runs unchanged against Pact mock servers.

mod operations;
mod requests;
mod responses;

pub use requests::*;
pub use responses::*;

use crate::observability::metrics;
use crate::provider::ApiError;
use reqwest::{Client, Method, StatusCode};
use std::time::{Duration, Instant};
use tracing::{debug, Span};

/// b3scale REST client
pub struct B3ScaleREST {
    http_client: Client,
    base_url: String,
    access_token: String,
}

impl std::fmt::Debug for B3ScaleREST {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("B3ScaleREST")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl B3ScaleREST {
    /// Create a client for `base_url` (e.g. `https://b3scale.example.org`).
    ///
    /// Every request carries `Authorization: Bearer {access_token}` and is bounded
    /// by `timeout`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        access_token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let http_client = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        debug!("Initialized b3scale REST client for {}", base_url);

        Ok(Self {
            http_client,
            base_url,
            access_token: access_token.into(),
        })
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build HTTP request with authentication headers
    pub(crate) fn make_request(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> reqwest::RequestBuilder {
        let url = format!("{}/api/v1/{}", self.base_url, path.trim_start_matches('/'));

        let auth_header = if self.access_token.starts_with("Bearer ") {
            self.access_token.clone()
        } else {
            format!("Bearer {}", self.access_token)
        };

        let mut request = self
            .http_client
            .request(method, &url)
            .header("Authorization", auth_header)
            .header("Accept", "application/json");

        if let Some(body) = body {
            request = request.json(&body);
        }

        request
    }

    /// Map a non-success response to an [`ApiError`]
    pub(crate) fn handle_error_response(status: StatusCode, error_text: String) -> ApiError {
        if status == StatusCode::NOT_FOUND {
            return ApiError::NotFound;
        }

        let body = match serde_json::from_str::<ErrorResponse>(&error_text) {
            Ok(error_response) => error_response.to_string(),
            Err(_) => error_text,
        };

        ApiError::Status {
            status: status.as_u16(),
            body,
        }
    }

    /// Send a request and return the text of a successful response, or the mapped error
    pub(crate) async fn execute(&self, request: reqwest::RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Self::handle_error_response(status, error_text));
        }
        Ok(response.text().await?)
    }
}

/// Records duration and outcome of one API call on its span and in metrics
pub(crate) struct OperationTracker {
    operation: &'static str,
    start: Instant,
    span: Span,
}

impl OperationTracker {
    pub(crate) fn new(operation: &'static str, span: Span) -> Self {
        Self {
            operation,
            start: Instant::now(),
            span,
        }
    }

    pub(crate) fn record_success(&self) {
        let duration = self.start.elapsed();
        self.span
            .record("operation.duration_ms", duration.as_millis() as u64);
        self.span.record("operation.success", true);
        metrics::record_api_operation(self.operation, duration.as_secs_f64());
    }

    pub(crate) fn record_error(&self, error: &ApiError) {
        let duration = self.start.elapsed();
        self.span.record("operation.success", false);
        self.span.record("error.message", error.to_string());
        self.span
            .record("operation.duration_ms", duration.as_millis() as u64);
        metrics::increment_api_operation_errors(self.operation);
    }

    /// Record the outcome of `result` and hand it back unchanged
    pub(crate) fn finish<T>(&self, result: Result<T, ApiError>) -> Result<T, ApiError> {
        match &result {
            Ok(_) => self.record_success(),
            // An absent frontend is an answer, not a failed call
            Err(ApiError::NotFound) => self.record_success(),
            Err(e) => self.record_error(e),
        }
        result
    }
}
