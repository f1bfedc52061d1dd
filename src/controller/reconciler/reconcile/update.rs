//! # Update Path
//!
//! Pushes the settings of a linked `BBBFrontend` to its b3scale frontend.
//! Key and secret are never sent; a vanished frontend is reported, not recreated.

use crate::constants::{CREATE_ATTEMPT_ANNOTATION, FINALIZER};
use crate::controller::reconciler::dependents::{connection_secret, sync_secret};
use crate::controller::reconciler::finalizer::ensure_finalizer;
use crate::controller::reconciler::types::{Reconciler, ReconcilerError};
use crate::crd::BBBFrontend;
use kube::ResourceExt;
use tracing::{debug, info};

pub(super) async fn update_frontend(
    ctx: &Reconciler,
    frontend: &mut BBBFrontend,
    id: &str,
) -> Result<(), ReconcilerError> {
    let entity = match ctx.api.retrieve(id).await {
        Ok(entity) => entity,
        Err(e) if e.is_not_found() => {
            return Err(ReconcilerError::ExternalEntityMissing { id: id.to_string() })
        }
        Err(e) => return Err(e.into()),
    };

    let settings = frontend.spec.settings.to_api_settings();
    ctx.api.update_settings(&entity.id, &settings).await?;
    debug!(frontend.id = %entity.id, "Pushed settings to b3scale");

    // Left behind when the id was adopted by hand after a lost link
    if frontend.annotations().contains_key(CREATE_ATTEMPT_ANNOTATION) {
        let mut cleared = frontend.clone();
        cleared.annotations_mut().remove(CREATE_ATTEMPT_ANNOTATION);
        *frontend = ctx.frontends.update(&cleared).await?;
    }

    if ensure_finalizer(ctx.frontends.as_ref(), frontend, FINALIZER).await? {
        info!("Restored missing finalizer on {}", frontend.resource_key());
    }

    let desired_secret = connection_secret(frontend, &entity, &ctx.endpoint_base);
    sync_secret(ctx.secrets.as_ref(), &desired_secret).await?;

    Ok(())
}
