//! # Status Reporting
//!
//! Maintains the `Ready` condition. A write only happens when status,
//! observedGeneration, reason or message differ from the stored condition.

use crate::constants::{READY_CONDITION, READY_MESSAGE, REASON_ERROR, REASON_SUCCESS};
use crate::crd::{BBBFrontend, Condition};
use crate::observability::metrics;
use crate::store::{FrontendStore, StoreError};
use tracing::debug;

/// The `Ready` condition for an outcome. `cause` is the error message of a failed run.
#[must_use]
pub fn ready_condition(frontend: &BBBFrontend, cause: Option<&str>) -> Condition {
    let (status, reason, message) = match cause {
        None => ("True", REASON_SUCCESS, READY_MESSAGE.to_string()),
        Some(cause) => ("False", REASON_ERROR, cause.to_string()),
    };

    Condition {
        r#type: READY_CONDITION.to_string(),
        status: status.to_string(),
        observed_generation: frontend.metadata.generation,
        last_transition_time: None,
        reason: reason.to_string(),
        message,
    }
}

fn is_unchanged(existing: &Condition, candidate: &Condition) -> bool {
    existing.status == candidate.status
        && existing.observed_generation == candidate.observed_generation
        && existing.reason == candidate.reason
        && existing.message == candidate.message
}

/// Persist the `Ready` condition for an outcome
///
/// Returns the stored object, or `None` when the write was skipped.
/// Other condition types are preserved.
///
/// # Errors
/// Returns the store error of the status update.
pub async fn set_ready(
    store: &dyn FrontendStore,
    frontend: &BBBFrontend,
    cause: Option<&str>,
) -> Result<Option<BBBFrontend>, StoreError> {
    let mut candidate = ready_condition(frontend, cause);
    let existing = frontend
        .status
        .as_ref()
        .and_then(|status| status.condition(READY_CONDITION));

    if let Some(existing) = existing {
        if is_unchanged(existing, &candidate) {
            debug!("Ready condition of {} unchanged, skipping status write", frontend.resource_key());
            metrics::increment_status_writes_skipped();
            return Ok(None);
        }
    }

    candidate.last_transition_time = match existing {
        Some(existing) if existing.status == candidate.status => {
            existing.last_transition_time.clone()
        }
        _ => None,
    }
    .or_else(|| Some(chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)));

    let mut updated = frontend.clone();
    updated
        .status
        .get_or_insert_with(Default::default)
        .set_condition(candidate);

    let stored = store.update_status(&updated).await?;
    metrics::increment_status_writes();
    debug!("Updated Ready condition of {}", frontend.resource_key());
    Ok(Some(stored))
}
