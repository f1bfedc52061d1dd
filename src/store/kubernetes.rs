//! Kubernetes API backed stores

use super::{FrontendStore, SecretStore, StoreError};
use crate::crd::BBBFrontend;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::api::{Api, Patch, PatchParams, PostParams};
use kube::{Client, ResourceExt};
use tracing::debug;

const FRONTEND_KIND: &str = "BBBFrontend";
const SECRET_KIND: &str = "Secret";

fn object_key(namespace: &str, name: &str) -> String {
    format!("{namespace}/{name}")
}

/// [`FrontendStore`] on the Kubernetes API
#[derive(Clone)]
pub struct KubeFrontendStore {
    client: Client,
}

impl std::fmt::Debug for KubeFrontendStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeFrontendStore").finish_non_exhaustive()
    }
}

impl KubeFrontendStore {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api(&self, namespace: &str) -> Api<BBBFrontend> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl FrontendStore for KubeFrontendStore {
    async fn get(&self, namespace: &str, name: &str) -> Result<BBBFrontend, StoreError> {
        self.api(namespace)
            .get(name)
            .await
            .map_err(|e| StoreError::from_kube(e, FRONTEND_KIND, object_key(namespace, name)))
    }

    async fn update(&self, frontend: &BBBFrontend) -> Result<BBBFrontend, StoreError> {
        let namespace = frontend.namespace().unwrap_or_default();
        let name = frontend.name_any();

        let updated = self
            .api(&namespace)
            .replace(&name, &PostParams::default(), frontend)
            .await
            .map_err(|e| StoreError::from_kube(e, FRONTEND_KIND, object_key(&namespace, &name)))?;

        debug!(
            "Updated BBBFrontend {}/{} (resourceVersion {:?})",
            namespace,
            name,
            updated.metadata.resource_version
        );
        Ok(updated)
    }

    async fn update_status(&self, frontend: &BBBFrontend) -> Result<BBBFrontend, StoreError> {
        let namespace = frontend.namespace().unwrap_or_default();
        let name = frontend.name_any();

        // resourceVersion turns the merge patch into a conditional write
        let patch = serde_json::json!({
            "metadata": {
                "resourceVersion": frontend.metadata.resource_version,
            },
            "status": frontend.status,
        });

        self.api(&namespace)
            .patch_status(&name, &PatchParams::default(), &Patch::Merge(&patch))
            .await
            .map_err(|e| StoreError::from_kube(e, FRONTEND_KIND, object_key(&namespace, &name)))
    }
}

/// [`SecretStore`] on the Kubernetes API
#[derive(Clone)]
pub struct KubeSecretStore {
    client: Client,
}

impl std::fmt::Debug for KubeSecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeSecretStore").finish_non_exhaustive()
    }
}

impl KubeSecretStore {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api(&self, namespace: &str) -> Api<Secret> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl SecretStore for KubeSecretStore {
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<Secret>, StoreError> {
        self.api(namespace)
            .get_opt(name)
            .await
            .map_err(|e| StoreError::from_kube(e, SECRET_KIND, object_key(namespace, name)))
    }

    async fn create(&self, secret: &Secret) -> Result<Secret, StoreError> {
        let namespace = secret.namespace().unwrap_or_default();
        let name = secret.name_any();
        self.api(&namespace)
            .create(&PostParams::default(), secret)
            .await
            .map_err(|e| StoreError::from_kube(e, SECRET_KIND, object_key(&namespace, &name)))
    }

    async fn update(&self, secret: &Secret) -> Result<Secret, StoreError> {
        let namespace = secret.namespace().unwrap_or_default();
        let name = secret.name_any();
        self.api(&namespace)
            .replace(&name, &PostParams::default(), secret)
            .await
            .map_err(|e| StoreError::from_kube(e, SECRET_KIND, object_key(&namespace, &name)))
    }
}
