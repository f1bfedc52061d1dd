//! # Delete Path
//!
//! Releases the b3scale frontend, then the finalizer. Never the reverse: any
//! failure other than "already gone" keeps the finalizer in place.

use crate::constants::FINALIZER;
use crate::controller::reconciler::finalizer::remove_finalizer;
use crate::controller::reconciler::types::{Reconciler, ReconcilerError};
use crate::crd::BBBFrontend;
use crate::observability::metrics;
use crate::provider::{ApiError, FrontendApi};
use tracing::info;

pub(super) async fn delete_frontend(
    ctx: &Reconciler,
    frontend: &mut BBBFrontend,
) -> Result<(), ReconcilerError> {
    if let Some(id) = frontend.frontend_id().map(str::to_owned) {
        if frontend.spec.deletion_protection {
            info!(frontend.id = %id, "Deletion protection enabled, keeping b3scale frontend");
        } else {
            release_frontend(ctx.api.as_ref(), &id).await?;
        }
    }

    remove_finalizer(ctx.frontends.as_ref(), frontend, FINALIZER).await?;
    Ok(())
}

async fn release_frontend(api: &dyn FrontendApi, id: &str) -> Result<(), ApiError> {
    let entity = match api.retrieve(id).await {
        Ok(entity) => entity,
        Err(e) if e.is_not_found() => {
            info!(frontend.id = %id, "b3scale frontend already gone");
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    match api.delete(&entity).await {
        Ok(()) => {
            metrics::increment_frontends_deleted();
            info!(frontend.id = %id, "Deleted b3scale frontend");
            Ok(())
        }
        Err(e) if e.is_not_found() => {
            info!(frontend.id = %id, "b3scale frontend already gone");
            Ok(())
        }
        Err(e) => Err(e),
    }
}
