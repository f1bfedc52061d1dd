//! # Finalizer Management
//!
//! The operator's finalizer keeps a `BBBFrontend` around until its b3scale
//! frontend has been released. Every change is a full-object update of the
//! freshest copy, so a stale copy fails with a conflict instead of dropping
//! concurrent edits.

use crate::crd::BBBFrontend;
use crate::store::{FrontendStore, StoreError};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum FinalizerError {
    #[error("finalizer {0} is already present")]
    AlreadyPresent(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[must_use]
pub fn has_finalizer(frontend: &BBBFrontend, token: &str) -> bool {
    frontend
        .metadata
        .finalizers
        .as_ref()
        .is_some_and(|finalizers| finalizers.iter().any(|f| f == token))
}

/// Append `token` and persist
///
/// # Errors
/// `AlreadyPresent` if the resource carries the token, or the store error of the update.
pub async fn add_finalizer(
    store: &dyn FrontendStore,
    frontend: &BBBFrontend,
    token: &str,
) -> Result<BBBFrontend, FinalizerError> {
    if has_finalizer(frontend, token) {
        return Err(FinalizerError::AlreadyPresent(token.to_string()));
    }

    let mut updated = frontend.clone();
    updated
        .metadata
        .finalizers
        .get_or_insert_with(Vec::new)
        .push(token.to_string());

    let stored = store.update(&updated).await?;
    debug!("Added finalizer {} to {}", token, frontend.resource_key());
    Ok(stored)
}

/// Add `token` unless present. On a write, `frontend` is replaced by the stored object.
///
/// Returns whether a write happened.
///
/// # Errors
/// Returns the store error of the update.
pub async fn ensure_finalizer(
    store: &dyn FrontendStore,
    frontend: &mut BBBFrontend,
    token: &str,
) -> Result<bool, StoreError> {
    match add_finalizer(store, frontend, token).await {
        Ok(stored) => {
            *frontend = stored;
            Ok(true)
        }
        Err(FinalizerError::AlreadyPresent(_)) => Ok(false),
        Err(FinalizerError::Store(e)) => Err(e),
    }
}

/// Remove only `token`, preserving all other finalizers. No write when it is absent.
///
/// Returns whether a write happened.
///
/// # Errors
/// Returns the store error of the update.
pub async fn remove_finalizer(
    store: &dyn FrontendStore,
    frontend: &mut BBBFrontend,
    token: &str,
) -> Result<bool, StoreError> {
    if !has_finalizer(frontend, token) {
        return Ok(false);
    }

    let mut updated = frontend.clone();
    if let Some(finalizers) = updated.metadata.finalizers.as_mut() {
        finalizers.retain(|f| f != token);
    }

    *frontend = store.update(&updated).await?;
    debug!("Removed finalizer {} from {}", token, updated.resource_key());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_finalizer() {
        let mut frontend = BBBFrontend::new("room1", Default::default());
        assert!(!has_finalizer(&frontend, "b3scale.infra.run/finalizer"));

        frontend.metadata.finalizers = Some(vec![
            "other.io/keep".to_string(),
            "b3scale.infra.run/finalizer".to_string(),
        ]);
        assert!(has_finalizer(&frontend, "b3scale.infra.run/finalizer"));
        assert!(!has_finalizer(&frontend, "b3scale.infra.run/other"));
    }
}
