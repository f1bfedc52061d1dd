//! # Response Types
//!
//! Error payloads returned by the b3scale admin API. Successful responses
//! decode straight into [`FrontendState`](crate::provider::FrontendState).

use serde::Deserialize;

/// Error body (`{"error": "...", "message": "..."}`)
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl std::fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.message {
            Some(message) if !message.is_empty() => write!(f, "{}: {}", self.error, message),
            _ => f.write_str(&self.error),
        }
    }
}
