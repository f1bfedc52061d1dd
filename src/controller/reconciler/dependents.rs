//! # Dependent Resources
//!
//! The generated connection secret `b3o-{namespace}-{name}` publishes the id,
//! key, secret and endpoint of a linked frontend next to its `BBBFrontend`.
//! It carries a controller owner reference, so garbage collection removes it
//! together with its owner.

use crate::constants::{FRONTEND_LABEL, GENERATED_NAME_PREFIX, MANAGED_BY_LABEL, MANAGED_BY_VALUE};
use crate::crd::BBBFrontend;
use crate::provider::FrontendState;
use crate::store::{SecretStore, StoreError};
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::ByteString;
use kube::{Resource, ResourceExt};
use std::collections::BTreeMap;
use tracing::{debug, info};

pub const FRONTEND_ID_KEY: &str = "FRONTEND_ID";
pub const FRONTEND_KEY_KEY: &str = "FRONTEND_KEY";
pub const FRONTEND_SECRET_KEY: &str = "FRONTEND_SECRET";
pub const FRONTEND_ENDPOINT_KEY: &str = "FRONTEND_ENDPOINT";

/// What a sync did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Created,
    Updated,
    Unchanged,
}

#[must_use]
pub fn connection_secret_name(frontend: &BBBFrontend) -> String {
    format!(
        "{}-{}-{}",
        GENERATED_NAME_PREFIX,
        frontend.namespace().unwrap_or_default(),
        frontend.name_any()
    )
}

/// Desired connection secret of `frontend`, linked to `entity`
#[must_use]
pub fn connection_secret(frontend: &BBBFrontend, entity: &FrontendState, endpoint_base: &str) -> Secret {
    let labels = BTreeMap::from([
        (MANAGED_BY_LABEL.to_string(), MANAGED_BY_VALUE.to_string()),
        (FRONTEND_LABEL.to_string(), frontend.name_any()),
    ]);

    let bytes = |value: &str| ByteString(value.as_bytes().to_vec());
    let endpoint = format!(
        "{}/bbb/{}",
        endpoint_base.trim_end_matches('/'),
        entity.frontend.key
    );
    let data = BTreeMap::from([
        (FRONTEND_ID_KEY.to_string(), bytes(&entity.id)),
        (FRONTEND_KEY_KEY.to_string(), bytes(&entity.frontend.key)),
        (FRONTEND_SECRET_KEY.to_string(), bytes(&entity.frontend.secret)),
        (FRONTEND_ENDPOINT_KEY.to_string(), bytes(&endpoint)),
    ]);

    Secret {
        metadata: ObjectMeta {
            name: Some(connection_secret_name(frontend)),
            namespace: frontend.namespace(),
            labels: Some(labels),
            owner_references: frontend.controller_owner_ref(&()).map(|owner| vec![owner]),
            ..Default::default()
        },
        data: Some(data),
        type_: Some("Opaque".to_string()),
        ..Default::default()
    }
}

/// Fields of a generated secret this operator owns
fn owned_fields_match(current: &Secret, desired: &Secret) -> bool {
    current.metadata.labels == desired.metadata.labels
        && current.metadata.annotations == desired.metadata.annotations
        && current.data == desired.data
        && current.string_data == desired.string_data
        && current.immutable == desired.immutable
}

/// Create `desired` if absent, otherwise overwrite the owned fields when they differ
///
/// # Errors
/// Returns the store error of the read or write.
pub async fn sync_secret(store: &dyn SecretStore, desired: &Secret) -> Result<SyncOutcome, StoreError> {
    let namespace = desired.namespace().unwrap_or_default();
    let name = desired.name_any();

    let Some(mut current) = store.get(&namespace, &name).await? else {
        store.create(desired).await?;
        info!("Created connection secret {}/{}", namespace, name);
        return Ok(SyncOutcome::Created);
    };

    if owned_fields_match(&current, desired) {
        debug!("Connection secret {}/{} is up to date", namespace, name);
        return Ok(SyncOutcome::Unchanged);
    }

    current.metadata.labels.clone_from(&desired.metadata.labels);
    current
        .metadata
        .annotations
        .clone_from(&desired.metadata.annotations);
    current.data.clone_from(&desired.data);
    current.string_data.clone_from(&desired.string_data);
    current.immutable = desired.immutable;

    store.update(&current).await?;
    info!("Updated connection secret {}/{}", namespace, name);
    Ok(SyncOutcome::Updated)
}
