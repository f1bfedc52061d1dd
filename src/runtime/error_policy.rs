//! # Error Policy
//!
//! Requeue decisions for failed reconciliations.
//!
//! Retryable failures (b3scale or Kubernetes unavailable, write conflicts,
//! timeouts) use a per-resource Fibonacci backoff that is reset by the next
//! success. Failures that need someone to edit the resource use the long fixed
//! requeue so unchanged input is not hammered.

use crate::controller::reconciler::{Reconciler, ReconcilerError};
use crate::crd::BBBFrontend;
use kube_runtime::controller::Action;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Requeue delay for `error` on the resource `resource_key`
pub fn requeue_after(error: &ReconcilerError, resource_key: &str, ctx: &Reconciler) -> Duration {
    if error.is_retryable() {
        ctx.next_backoff(resource_key)
    } else {
        ctx.config.invalid_requeue()
    }
}

/// `error_policy` of the controller
pub fn handle_reconciliation_error(
    obj: Arc<BBBFrontend>,
    error: &ReconcilerError,
    ctx: Arc<Reconciler>,
) -> Action {
    let resource_key = obj.resource_key();

    let error_span = tracing::span!(
        tracing::Level::ERROR,
        "controller.reconciliation_error",
        resource.key = resource_key.as_str(),
        error = %error
    );
    let _error_guard = error_span.enter();

    let delay = requeue_after(error, &resource_key, &ctx);
    if error.is_retryable() {
        warn!("Reconciliation of {} failed: {}", resource_key, error);
        info!("Retrying with Fibonacci backoff in {}s", delay.as_secs());
    } else {
        error!(
            "Reconciliation of {} failed and needs a change to the resource: {}",
            resource_key, error
        );
        info!("Checking again in {}s", delay.as_secs());
    }

    Action::requeue(delay)
}
