//! # Reconcile
//!
//! The `BBBFrontend` state machine. States live in the object itself:
//!
//! - **Deleting**: `deletionTimestamp` set. Release the b3scale frontend (unless
//!   protected), then the finalizer. No status write.
//! - **Unlinked**: no `spec.frontendID`. Create the frontend and link it.
//! - **Linked**: `spec.frontendID` set. Push settings to the existing frontend.
//!
//! Every run starts from a fresh read and threads the stored object through its
//! writes, so each write carries the latest resourceVersion.

mod create;
mod delete;
mod update;

pub use create::{has_create_attempt, idempotency_key};

use crate::controller::reconciler::secrets::resolve_frontend_secret;
use crate::controller::reconciler::status::set_ready;
use crate::controller::reconciler::types::{Reconciler, ReconcilerError};
use crate::controller::reconciler::validation::validate_credentials;
use crate::crd::BBBFrontend;
use crate::observability::metrics;
use crate::store::StoreError;
use kube::ResourceExt;
use kube_runtime::controller::Action;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, info_span, warn, Instrument};

/// Reconcile the `BBBFrontend` `namespace/name` once
///
/// # Errors
/// Returns the failure of the run. On failure the Ready condition has already
/// been updated (unless the resource is being deleted).
pub async fn reconcile_frontend(
    ctx: &Reconciler,
    namespace: &str,
    name: &str,
) -> Result<(), ReconcilerError> {
    let mut frontend = match ctx.frontends.get(namespace, name).await {
        Ok(frontend) => frontend,
        Err(e) if e.is_not_found() => {
            debug!("BBBFrontend {}/{} no longer exists", namespace, name);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if frontend.is_deleting() {
        return delete::delete_frontend(ctx, &mut frontend).await;
    }

    let outcome = link_or_update(ctx, &mut frontend).await;
    let cause = outcome.as_ref().err().map(ToString::to_string);

    match (set_ready(ctx.frontends.as_ref(), &frontend, cause.as_deref()).await, outcome) {
        (Ok(_), outcome) => outcome,
        (Err(status_error), Ok(())) => Err(status_error.into()),
        (Err(status_error), Err(e)) => {
            error!("Failed to record failure on Ready condition: {}", status_error);
            Err(e)
        }
    }
}

async fn link_or_update(ctx: &Reconciler, frontend: &mut BBBFrontend) -> Result<(), ReconcilerError> {
    let credentials = validate_credentials(&frontend.spec)?.clone();
    let namespace = frontend.namespace().unwrap_or_default();
    let secret =
        resolve_frontend_secret(ctx.secrets.as_ref(), &namespace, &credentials.secret_ref).await?;

    match frontend.frontend_id().map(str::to_owned) {
        Some(id) => update::update_frontend(ctx, frontend, &id).await,
        None => create::create_frontend(ctx, frontend, &credentials, &secret).await,
    }
}

/// Write an abandoned run's failure on the Ready condition
///
/// The timed-out run was dropped before it could record its outcome. Starts
/// from a fresh read and is bounded by the API timeout.
async fn record_timeout(ctx: &Reconciler, namespace: &str, name: &str, err: &ReconcilerError) {
    let cause = err.to_string();
    let write = mark_not_ready(ctx, namespace, name, &cause);

    match tokio::time::timeout(ctx.config.api_timeout(), write).await {
        Ok(Ok(_)) => {}
        Ok(Err(e)) if e.is_not_found() => {}
        Ok(Err(e)) => error!("Failed to record timeout on Ready condition: {}", e),
        Err(_elapsed) => warn!("Recording timeout on Ready condition did not finish in time"),
    }
}

async fn mark_not_ready(
    ctx: &Reconciler,
    namespace: &str,
    name: &str,
    cause: &str,
) -> Result<Option<BBBFrontend>, StoreError> {
    let frontend = ctx.frontends.get(namespace, name).await?;
    if frontend.is_deleting() {
        return Ok(None);
    }
    set_ready(ctx.frontends.as_ref(), &frontend, Some(cause)).await
}

/// Controller entry point: one deadline-bounded run for a watched object
///
/// # Errors
/// Returns the failure of the run, or `Timeout` when the deadline passed.
pub async fn reconcile(
    frontend: Arc<BBBFrontend>,
    ctx: Arc<Reconciler>,
) -> Result<Action, ReconcilerError> {
    let namespace = frontend.namespace().unwrap_or_default();
    let name = frontend.name_any();
    let resource_key = frontend.resource_key();

    let span = info_span!(
        "reconcile",
        resource.namespace = namespace.as_str(),
        resource.name = name.as_str(),
        resource.kind = "BBBFrontend",
        resource.generation = frontend.metadata.generation.unwrap_or(0),
    );

    async move {
        let start = Instant::now();
        metrics::increment_reconciliations();

        let timeout = ctx.config.reconcile_timeout();
        let result = match tokio::time::timeout(
            timeout,
            reconcile_frontend(&ctx, &namespace, &name),
        )
        .await
        {
            Ok(result) => result,
            Err(_elapsed) => {
                let err = ReconcilerError::Timeout(timeout);
                record_timeout(&ctx, &namespace, &name, &err).await;
                Err(err)
            }
        };

        metrics::observe_reconciliation_duration(start.elapsed().as_secs_f64());

        match result {
            Ok(()) => {
                if ctx.reset_backoff(&resource_key) {
                    info!("Backoff reset after successful reconciliation");
                }
                info!(
                    "Reconciliation complete (duration: {:.2}s)",
                    start.elapsed().as_secs_f64()
                );
                Ok(Action::requeue(ctx.config.resync_interval()))
            }
            Err(e) => {
                metrics::increment_reconciliation_errors();
                Err(e)
            }
        }
    }
    .instrument(span)
    .await
}
