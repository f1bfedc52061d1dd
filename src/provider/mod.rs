//! # Provider Modules
//!
//! The b3scale frontend API as consumed by the reconciler.
//!
//! `FrontendApi` is the seam between the reconciliation engine and the remote
//! b3scale service: the REST implementation lives in [`b3scale`], tests plug in
//! in-memory fakes.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

pub mod b3scale;

pub use b3scale::B3ScaleREST;

/// Errors returned by the b3scale API
#[derive(Debug, Error)]
pub enum ApiError {
    /// The frontend does not exist (HTTP 404)
    #[error("frontend not found")]
    NotFound,
    /// Any other non-success response
    #[error("b3scale API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    /// Transport failure (connect, timeout, TLS)
    #[error("b3scale API request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The response body did not match the expected schema
    #[error("invalid b3scale API payload: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound)
    }
}

/// Remote frontend entity (`store.FrontendState` in b3scale)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrontendState {
    /// Opaque id assigned by b3scale at creation
    #[serde(deserialize_with = "non_empty")]
    pub id: String,
    #[serde(default)]
    pub active: bool,
    pub frontend: FrontendKeys,
    #[serde(default, deserialize_with = "null_as_default")]
    pub settings: ApiFrontendSettings,
}

/// Desired state of a frontend that does not exist yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewFrontend {
    pub active: bool,
    pub frontend: FrontendKeys,
    pub settings: ApiFrontendSettings,
}

/// Frontend key and secret as the BBB API clients use them
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct FrontendKeys {
    pub key: String,
    pub secret: String,
}

impl std::fmt::Debug for FrontendKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrontendKeys")
            .field("key", &self.key)
            .field("secret", &"***")
            .finish()
    }
}

/// Frontend settings in the b3scale wire schema (snake_case)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiFrontendSettings {
    #[serde(default, deserialize_with = "null_as_default")]
    pub required_tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_presentation: Option<ApiDefaultPresentation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_default_params: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_override_params: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiDefaultPresentation {
    pub url: String,
    #[serde(default)]
    pub force: bool,
}

fn non_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    if value.is_empty() {
        return Err(serde::de::Error::custom("frontend id must not be empty"));
    }
    Ok(value)
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Operations on remote frontends
///
/// Implementations perform exactly one remote call per method; retries are left
/// to the caller's outer retry loop.
#[async_trait]
pub trait FrontendApi: Send + Sync {
    /// Create a frontend. `idempotency_key` is stable for the owning resource so
    /// the server can de-duplicate repeated attempts.
    async fn create(
        &self,
        desired: &NewFrontend,
        idempotency_key: &str,
    ) -> Result<FrontendState, ApiError>;

    /// Fetch a frontend by id
    async fn retrieve(&self, id: &str) -> Result<FrontendState, ApiError>;

    /// List frontends registered under `key`
    async fn find_by_key(&self, key: &str) -> Result<Vec<FrontendState>, ApiError>;

    /// Replace only the settings of a frontend; key and secret are left untouched
    async fn update_settings(&self, id: &str, settings: &ApiFrontendSettings)
        -> Result<(), ApiError>;

    /// Delete a frontend. A missing frontend yields `ApiError::NotFound`.
    async fn delete(&self, frontend: &FrontendState) -> Result<(), ApiError>;
}
