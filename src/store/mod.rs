//! # Stores
//!
//! Kubernetes-side collaborators of the reconciler:
//!
//! - [`FrontendStore`]: reads and writes `BBBFrontend` objects and their status
//! - [`SecretStore`]: reads user secrets and manages generated connection secrets
//!
//! All writes are full-object writes guarded by `metadata.resourceVersion`; a
//! stale write fails with [`StoreError::Conflict`] and is never merged.

use crate::crd::BBBFrontend;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use thiserror::Error;

mod kubernetes;

pub use kubernetes::{KubeFrontendStore, KubeSecretStore};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} {key} not found")]
    NotFound { kind: &'static str, key: String },
    #[error("{kind} {key} was modified concurrently")]
    Conflict { kind: &'static str, key: String },
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),
}

impl StoreError {
    /// Classify a client error for the object `kind` identified by `key`
    #[must_use]
    pub fn from_kube(error: kube::Error, kind: &'static str, key: impl Into<String>) -> Self {
        match error {
            kube::Error::Api(ref e) if e.code == 404 => StoreError::NotFound {
                kind,
                key: key.into(),
            },
            kube::Error::Api(ref e) if e.code == 409 => StoreError::Conflict {
                kind,
                key: key.into(),
            },
            other => StoreError::Kube(other),
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}

/// Access to `BBBFrontend` objects
#[async_trait]
pub trait FrontendStore: Send + Sync {
    /// Fetch the current object
    async fn get(&self, namespace: &str, name: &str) -> Result<BBBFrontend, StoreError>;

    /// Replace metadata and spec. Returns the stored object with its new resourceVersion.
    async fn update(&self, frontend: &BBBFrontend) -> Result<BBBFrontend, StoreError>;

    /// Replace the status subresource
    async fn update_status(&self, frontend: &BBBFrontend) -> Result<BBBFrontend, StoreError>;
}

/// Access to core `Secret` objects
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetch a secret; `Ok(None)` when it does not exist
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<Secret>, StoreError>;

    async fn create(&self, secret: &Secret) -> Result<Secret, StoreError>;

    async fn update(&self, secret: &Secret) -> Result<Secret, StoreError>;
}
