//! # Create Path
//!
//! Links an unlinked `BBBFrontend` to a new b3scale frontend.
//!
//! The external create and the local `frontendID` write cannot be made atomic.
//! A create-attempt annotation (value: the idempotency key) is written before
//! calling b3scale and removed together with the `frontendID` write. A run that
//! finds the annotation without a `frontendID` looks the key up in b3scale and
//! refuses to create a duplicate when a frontend already exists.

use crate::constants::{CREATE_ATTEMPT_ANNOTATION, FINALIZER};
use crate::controller::reconciler::dependents::{connection_secret, sync_secret};
use crate::controller::reconciler::finalizer::ensure_finalizer;
use crate::controller::reconciler::types::{Reconciler, ReconcilerError};
use crate::crd::{BBBFrontend, Credentials};
use crate::observability::metrics;
use crate::provider::{FrontendKeys, NewFrontend};
use kube::ResourceExt;
use tracing::{info, warn};
use uuid::Uuid;

/// Stable idempotency key of the frontend creation for `frontend`
#[must_use]
pub fn idempotency_key(frontend: &BBBFrontend) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, frontend.resource_key().as_bytes()).to_string()
}

#[must_use]
pub fn has_create_attempt(frontend: &BBBFrontend) -> bool {
    frontend.annotations().contains_key(CREATE_ATTEMPT_ANNOTATION)
}

pub(super) async fn create_frontend(
    ctx: &Reconciler,
    frontend: &mut BBBFrontend,
    credentials: &Credentials,
    secret: &str,
) -> Result<(), ReconcilerError> {
    let key = idempotency_key(frontend);

    if has_create_attempt(frontend) {
        let existing = ctx.api.find_by_key(&credentials.frontend_key).await?;
        if let Some(found) = existing.first() {
            warn!(
                frontend.id = %found.id,
                "Frontend key '{}' already exists in b3scale but is not linked",
                credentials.frontend_key
            );
            return Err(ReconcilerError::LinkLost {
                id: found.id.clone(),
                key: credentials.frontend_key.clone(),
            });
        }
        info!("Earlier create attempt did not reach b3scale, creating frontend");
    } else {
        let mut marked = frontend.clone();
        marked
            .annotations_mut()
            .insert(CREATE_ATTEMPT_ANNOTATION.to_string(), key.clone());
        *frontend = ctx.frontends.update(&marked).await?;
    }

    let desired = NewFrontend {
        active: true,
        frontend: FrontendKeys {
            key: credentials.frontend_key.clone(),
            secret: secret.to_owned(),
        },
        settings: frontend.spec.settings.to_api_settings(),
    };
    let created = ctx.api.create(&desired, &key).await?;
    metrics::increment_frontends_created();
    info!(frontend.id = %created.id, "Created b3scale frontend for {}", frontend.resource_key());

    let mut linked = frontend.clone();
    linked.spec.frontend_id = Some(created.id.clone());
    linked.annotations_mut().remove(CREATE_ATTEMPT_ANNOTATION);
    *frontend = ctx.frontends.update(&linked).await?;

    ensure_finalizer(ctx.frontends.as_ref(), frontend, FINALIZER).await?;

    let desired_secret = connection_secret(frontend, &created, &ctx.endpoint_base);
    sync_secret(ctx.secrets.as_ref(), &desired_secret).await?;

    Ok(())
}
