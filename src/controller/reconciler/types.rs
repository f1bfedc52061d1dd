//! # Types
//!
//! Core types for the reconciler.

use crate::config::ControllerConfig;
use crate::controller::backoff::FibonacciBackoff;
use crate::provider::{ApiError, FrontendApi};
use crate::store::{FrontendStore, SecretStore, StoreError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

/// Problems with `spec.credentials` that only an edit of the resource can fix
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("spec.credentials must be set to create the frontend")]
    MissingCredentials,
    #[error("spec.credentials.frontend must not be empty")]
    EmptyFrontendKey,
    #[error("spec.credentials.secretRef must name a secret and a key")]
    EmptySecretRef,
}

/// Failures resolving the frontend secret
#[derive(Debug, Error)]
pub enum SecretError {
    #[error("secret {secret} or its key '{key}' not found")]
    NotFound { secret: String, key: String },
    #[error("key '{key}' of secret {secret} holds {length} characters; at least {min} are required")]
    TooShort {
        secret: String,
        key: String,
        length: usize,
        min: usize,
    },
    #[error("key '{key}' of secret {secret} is not valid UTF-8")]
    InvalidEncoding { secret: String, key: String },
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum ReconcilerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Secret(#[from] SecretError),
    #[error("b3scale API error: {0}")]
    Api(#[from] ApiError),
    #[error(transparent)]
    Store(StoreError),
    /// The linked frontend vanished from b3scale
    #[error("frontend {id} referenced by spec.frontendID does not exist in b3scale")]
    ExternalEntityMissing { id: String },
    /// A previous run created a frontend but its id was never recorded
    #[error(
        "frontend {id} with key '{key}' already exists from an earlier create attempt; \
         set spec.frontendID to {id} to adopt it"
    )]
    LinkLost { id: String, key: String },
    #[error("{0} was modified concurrently")]
    Conflict(String),
    #[error("reconciliation did not finish within {0:?}")]
    Timeout(Duration),
}

impl From<StoreError> for ReconcilerError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Conflict { kind, key } => ReconcilerError::Conflict(format!("{kind} {key}")),
            other => ReconcilerError::Store(other),
        }
    }
}

impl ReconcilerError {
    /// Whether retrying soon can succeed without anyone editing anything
    ///
    /// Retryable errors are requeued on the Fibonacci backoff, the rest on the
    /// long fixed interval.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            ReconcilerError::Validation(_)
            | ReconcilerError::ExternalEntityMissing { .. }
            | ReconcilerError::LinkLost { .. } => false,
            ReconcilerError::Secret(e) => {
                matches!(e, SecretError::NotFound { .. } | SecretError::Store(_))
            }
            ReconcilerError::Api(e) => match e {
                ApiError::Status { status, .. } => {
                    !(400..500).contains(status) || *status == 408 || *status == 429
                }
                ApiError::Decode(_) => false,
                ApiError::NotFound | ApiError::Http(_) => true,
            },
            ReconcilerError::Store(_)
            | ReconcilerError::Conflict(_)
            | ReconcilerError::Timeout(_) => true,
        }
    }
}

/// Backoff state for a specific resource
#[derive(Debug, Clone)]
pub struct BackoffState {
    pub backoff: FibonacciBackoff,
    pub error_count: u32,
}

impl BackoffState {
    #[must_use]
    pub fn new(min_secs: u64, max_secs: u64) -> Self {
        Self {
            backoff: FibonacciBackoff::new(min_secs, max_secs),
            error_count: 0,
        }
    }

    pub fn increment_error(&mut self) {
        self.error_count += 1;
    }

    pub fn reset(&mut self) {
        self.error_count = 0;
        self.backoff.reset();
    }
}

/// Shared context of all reconcile runs
#[derive(Clone)]
pub struct Reconciler {
    pub frontends: Arc<dyn FrontendStore>,
    pub secrets: Arc<dyn SecretStore>,
    pub api: Arc<dyn FrontendApi>,
    /// Public base URL of b3scale, used for `FRONTEND_ENDPOINT`
    pub endpoint_base: String,
    pub config: ControllerConfig,
    // Backoff state per resource (namespace/name), owned by the error policy
    pub backoff_states: Arc<Mutex<HashMap<String, BackoffState>>>,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("endpoint_base", &self.endpoint_base)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Reconciler {
    #[must_use]
    pub fn new(
        frontends: Arc<dyn FrontendStore>,
        secrets: Arc<dyn SecretStore>,
        api: Arc<dyn FrontendApi>,
        endpoint_base: impl Into<String>,
        config: ControllerConfig,
    ) -> Self {
        Self {
            frontends,
            secrets,
            api,
            endpoint_base: endpoint_base.into().trim_end_matches('/').to_string(),
            config,
            backoff_states: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Clear the error backoff of a resource after a successful run.
    /// Returns true when the resource had been failing.
    pub fn reset_backoff(&self, resource_key: &str) -> bool {
        let Ok(mut states) = self.backoff_states.lock() else {
            return false;
        };
        match states.get_mut(resource_key) {
            Some(state) => {
                let had_errors = state.error_count > 0;
                state.reset();
                had_errors
            }
            None => false,
        }
    }

    /// Advance the error backoff of a resource and return the delay to wait
    pub fn next_backoff(&self, resource_key: &str) -> Duration {
        let min = self.config.backoff_min_secs;
        let max = self.config.backoff_max_secs;
        let Ok(mut states) = self.backoff_states.lock() else {
            return Duration::from_secs(min);
        };
        let state = states
            .entry(resource_key.to_string())
            .or_insert_with(|| BackoffState::new(min, max));
        state.increment_error();
        state.backoff.next_backoff()
    }
}
