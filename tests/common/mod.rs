//! Common test utilities
//!
//! Rustls initialization for the Pact tests and in-memory implementations of
//! the store and b3scale API traits for reconciler tests.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use async_trait::async_trait;
use b3scale_operator::crd::BBBFrontend;
use b3scale_operator::provider::b3scale::UpdateSettingsRequest;
use b3scale_operator::provider::{
    ApiError, ApiFrontendSettings, FrontendApi, FrontendState, NewFrontend,
};
use b3scale_operator::store::{FrontendStore, SecretStore, StoreError};
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::ByteString;
use kube::ResourceExt;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, Once};
use std::time::Duration;

static RUSTLS_INIT: Once = Once::new();

/// Initialize rustls crypto provider for tests
///
/// Uses a `Once` so it runs a single time across all tests of a binary.
pub fn init_rustls() {
    RUSTLS_INIT.call_once(|| {
        rustls::crypto::ring::default_provider()
            .install_default()
            .expect("Failed to install rustls crypto provider");
    });
}

type ObjectKey = (String, String);

fn object_key(namespace: &str, name: &str) -> ObjectKey {
    (namespace.to_string(), name.to_string())
}

// ---------------------------------------------------------------------------
// BBBFrontend store
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct FrontendStoreState {
    objects: HashMap<ObjectKey, BBBFrontend>,
    resource_version: u64,
    updates: usize,
    status_writes: usize,
    /// 1-based index of the `update` call that fails with a conflict
    conflict_on_update: Option<usize>,
}

impl FrontendStoreState {
    fn next_version(&mut self) -> String {
        self.resource_version += 1;
        self.resource_version.to_string()
    }
}

/// `BBBFrontend` store with resourceVersion checks, generation bumps on spec
/// changes and removal once a deleted object has no finalizers left
#[derive(Debug, Default)]
pub struct FakeFrontendStore {
    state: Mutex<FrontendStoreState>,
}

impl FakeFrontendStore {
    pub fn insert(&self, mut frontend: BBBFrontend) {
        let mut state = self.state.lock().unwrap();
        frontend.metadata.resource_version = Some(state.next_version());
        frontend.metadata.generation.get_or_insert(1);
        let key = object_key(&frontend.namespace().unwrap(), &frontend.name_any());
        state.objects.insert(key, frontend);
    }

    /// Current stored object, if any
    pub fn object(&self, namespace: &str, name: &str) -> Option<BBBFrontend> {
        self.state
            .lock()
            .unwrap()
            .objects
            .get(&object_key(namespace, name))
            .cloned()
    }

    /// Apply a user edit to the stored object (bumps generation when the spec changes)
    pub fn edit(&self, namespace: &str, name: &str, edit: impl FnOnce(&mut BBBFrontend)) {
        let mut state = self.state.lock().unwrap();
        let version = state.next_version();
        let stored = state
            .objects
            .get_mut(&object_key(namespace, name))
            .expect("object to edit");
        let before = stored.spec.clone();
        edit(stored);
        if stored.spec != before {
            stored.metadata.generation = Some(stored.metadata.generation.unwrap_or(0) + 1);
        }
        stored.metadata.resource_version = Some(version);
    }

    /// Request deletion the way the API server does while finalizers are present
    pub fn mark_deleted(&self, namespace: &str, name: &str) {
        self.edit(namespace, name, |frontend| {
            frontend.metadata.deletion_timestamp = Some(
                k8s_openapi::apimachinery::pkg::apis::meta::v1::Time(
                    "2024-01-01T00:00:00Z".parse().unwrap(),
                ),
            );
        });
    }

    pub fn fail_update_with_conflict(&self, nth: usize) {
        let mut state = self.state.lock().unwrap();
        state.conflict_on_update = Some(state.updates + nth);
    }

    pub fn updates(&self) -> usize {
        self.state.lock().unwrap().updates
    }

    pub fn status_writes(&self) -> usize {
        self.state.lock().unwrap().status_writes
    }
}

fn conflict(frontend: &BBBFrontend) -> StoreError {
    StoreError::Conflict {
        kind: "BBBFrontend",
        key: frontend.resource_key(),
    }
}

#[async_trait]
impl FrontendStore for FakeFrontendStore {
    async fn get(&self, namespace: &str, name: &str) -> Result<BBBFrontend, StoreError> {
        self.object(namespace, name).ok_or_else(|| StoreError::NotFound {
            kind: "BBBFrontend",
            key: format!("{namespace}/{name}"),
        })
    }

    async fn update(&self, frontend: &BBBFrontend) -> Result<BBBFrontend, StoreError> {
        let mut state = self.state.lock().unwrap();
        state.updates += 1;
        if state.conflict_on_update == Some(state.updates) {
            return Err(conflict(frontend));
        }

        let key = object_key(&frontend.namespace().unwrap(), &frontend.name_any());
        let stored = state.objects.get(&key).cloned().ok_or_else(|| StoreError::NotFound {
            kind: "BBBFrontend",
            key: frontend.resource_key(),
        })?;
        if stored.metadata.resource_version != frontend.metadata.resource_version {
            return Err(conflict(frontend));
        }

        let mut next = frontend.clone();
        // The main resource endpoint ignores status
        next.status = stored.status.clone();
        next.metadata.deletion_timestamp = stored.metadata.deletion_timestamp.clone();
        if next.spec != stored.spec {
            next.metadata.generation = Some(stored.metadata.generation.unwrap_or(0) + 1);
        } else {
            next.metadata.generation = stored.metadata.generation;
        }
        next.metadata.resource_version = Some(state.next_version());

        let released = next.metadata.deletion_timestamp.is_some()
            && next.finalizers().is_empty();
        if released {
            state.objects.remove(&key);
        } else {
            state.objects.insert(key, next.clone());
        }
        Ok(next)
    }

    async fn update_status(&self, frontend: &BBBFrontend) -> Result<BBBFrontend, StoreError> {
        let mut state = self.state.lock().unwrap();
        let key = object_key(&frontend.namespace().unwrap(), &frontend.name_any());
        let mut stored = state.objects.get(&key).cloned().ok_or_else(|| StoreError::NotFound {
            kind: "BBBFrontend",
            key: frontend.resource_key(),
        })?;
        if stored.metadata.resource_version != frontend.metadata.resource_version {
            return Err(conflict(frontend));
        }

        state.status_writes += 1;
        stored.status = frontend.status.clone();
        stored.metadata.resource_version = Some(state.next_version());
        state.objects.insert(key, stored.clone());
        Ok(stored)
    }
}

// ---------------------------------------------------------------------------
// Secret store
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct SecretStoreState {
    objects: HashMap<ObjectKey, Secret>,
    creates: usize,
    updates: usize,
}

#[derive(Debug, Default)]
pub struct FakeSecretStore {
    state: Mutex<SecretStoreState>,
}

impl FakeSecretStore {
    /// Store a user secret with a single key
    pub fn insert_value(&self, namespace: &str, name: &str, key: &str, value: &[u8]) {
        let secret = Secret {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some(namespace.to_string()),
                ..Default::default()
            },
            data: Some(BTreeMap::from([(key.to_string(), ByteString(value.to_vec()))])),
            ..Default::default()
        };
        self.state
            .lock()
            .unwrap()
            .objects
            .insert(object_key(namespace, name), secret);
    }

    pub fn object(&self, namespace: &str, name: &str) -> Option<Secret> {
        self.state
            .lock()
            .unwrap()
            .objects
            .get(&object_key(namespace, name))
            .cloned()
    }

    /// Value of `key` in the stored secret as text
    pub fn value(&self, namespace: &str, name: &str, key: &str) -> Option<String> {
        let secret = self.object(namespace, name)?;
        let bytes = secret.data?.get(key)?.0.clone();
        String::from_utf8(bytes).ok()
    }

    pub fn creates(&self) -> usize {
        self.state.lock().unwrap().creates
    }

    pub fn updates(&self) -> usize {
        self.state.lock().unwrap().updates
    }
}

#[async_trait]
impl SecretStore for FakeSecretStore {
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<Secret>, StoreError> {
        Ok(self.object(namespace, name))
    }

    async fn create(&self, secret: &Secret) -> Result<Secret, StoreError> {
        let mut state = self.state.lock().unwrap();
        let key = object_key(&secret.namespace().unwrap(), &secret.name_any());
        if state.objects.contains_key(&key) {
            return Err(StoreError::Conflict {
                kind: "Secret",
                key: format!("{}/{}", key.0, key.1),
            });
        }
        state.creates += 1;
        state.objects.insert(key, secret.clone());
        Ok(secret.clone())
    }

    async fn update(&self, secret: &Secret) -> Result<Secret, StoreError> {
        let mut state = self.state.lock().unwrap();
        let key = object_key(&secret.namespace().unwrap(), &secret.name_any());
        state.updates += 1;
        state.objects.insert(key, secret.clone());
        Ok(secret.clone())
    }
}

// ---------------------------------------------------------------------------
// b3scale API
// ---------------------------------------------------------------------------

/// One call received by [`FakeFrontendApi`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    Create { key: String, idempotency_key: String },
    Retrieve(String),
    FindByKey(String),
    UpdateSettings { id: String, settings: ApiFrontendSettings },
    Delete(String),
}

#[derive(Debug, Default)]
struct ApiState {
    entities: BTreeMap<String, FrontendState>,
    idempotency_keys: HashMap<String, String>,
    next_id: u32,
    calls: Vec<ApiCall>,
    failures: HashMap<&'static str, u16>,
    delay: Option<Duration>,
}

/// In-memory b3scale that de-duplicates creates on the idempotency key
#[derive(Debug, Default)]
pub struct FakeFrontendApi {
    state: Mutex<ApiState>,
}

impl FakeFrontendApi {
    /// Add a frontend that exists independently of any resource
    pub fn insert(&self, id: &str, key: &str, secret: &str) {
        let entity = FrontendState {
            id: id.to_string(),
            active: true,
            frontend: b3scale_operator::provider::FrontendKeys {
                key: key.to_string(),
                secret: secret.to_string(),
            },
            settings: ApiFrontendSettings::default(),
        };
        self.state
            .lock()
            .unwrap()
            .entities
            .insert(id.to_string(), entity);
    }

    /// Remove a frontend behind the operator's back
    pub fn remove(&self, id: &str) {
        self.state.lock().unwrap().entities.remove(id);
    }

    pub fn entity(&self, id: &str) -> Option<FrontendState> {
        self.state.lock().unwrap().entities.get(id).cloned()
    }

    pub fn entities(&self) -> Vec<FrontendState> {
        self.state.lock().unwrap().entities.values().cloned().collect()
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn creates(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, ApiCall::Create { .. }))
            .count()
    }

    /// Make every call of `operation` fail with HTTP `status`
    pub fn fail(&self, operation: &'static str, status: u16) {
        self.state.lock().unwrap().failures.insert(operation, status);
    }

    pub fn heal(&self) {
        self.state.lock().unwrap().failures.clear();
    }

    /// Delay every call by `delay`
    pub fn slow_down(&self, delay: Duration) {
        self.state.lock().unwrap().delay = Some(delay);
    }

    async fn enter(&self, operation: &'static str, call: ApiCall) -> Result<(), ApiError> {
        let (delay, failure) = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(call);
            (state.delay, state.failures.get(operation).copied())
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match failure {
            Some(status) => Err(ApiError::Status {
                status,
                body: format!("{operation} failed"),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl FrontendApi for FakeFrontendApi {
    async fn create(
        &self,
        desired: &NewFrontend,
        idempotency_key: &str,
    ) -> Result<FrontendState, ApiError> {
        self.enter(
            "create",
            ApiCall::Create {
                key: desired.frontend.key.clone(),
                idempotency_key: idempotency_key.to_string(),
            },
        )
        .await?;

        let mut state = self.state.lock().unwrap();
        if let Some(id) = state.idempotency_keys.get(idempotency_key) {
            if let Some(existing) = state.entities.get(id) {
                return Ok(existing.clone());
            }
        }

        state.next_id += 1;
        let id = format!("fe-{}", state.next_id);
        let entity = FrontendState {
            id: id.clone(),
            active: desired.active,
            frontend: desired.frontend.clone(),
            settings: desired.settings.clone(),
        };
        state.entities.insert(id.clone(), entity.clone());
        state
            .idempotency_keys
            .insert(idempotency_key.to_string(), id);
        Ok(entity)
    }

    async fn retrieve(&self, id: &str) -> Result<FrontendState, ApiError> {
        self.enter("retrieve", ApiCall::Retrieve(id.to_string()))
            .await?;
        self.entity(id).ok_or(ApiError::NotFound)
    }

    async fn find_by_key(&self, key: &str) -> Result<Vec<FrontendState>, ApiError> {
        self.enter("find_by_key", ApiCall::FindByKey(key.to_string()))
            .await?;
        Ok(self
            .entities()
            .into_iter()
            .filter(|entity| entity.frontend.key == key)
            .collect())
    }

    async fn update_settings(
        &self,
        id: &str,
        settings: &ApiFrontendSettings,
    ) -> Result<(), ApiError> {
        self.enter(
            "update_settings",
            ApiCall::UpdateSettings {
                id: id.to_string(),
                settings: settings.clone(),
            },
        )
        .await?;

        // Same body the REST client sends, applied the way b3scale applies a PATCH
        let body = serde_json::to_value(UpdateSettingsRequest::from(settings))?;

        let mut state = self.state.lock().unwrap();
        let entity = state.entities.get_mut(id).ok_or(ApiError::NotFound)?;
        let mut stored = serde_json::to_value(&entity.settings)?;
        merge_patch(&mut stored, &body["settings"]);
        entity.settings = serde_json::from_value(stored)?;
        Ok(())
    }

    async fn delete(&self, frontend: &FrontendState) -> Result<(), ApiError> {
        self.enter("delete", ApiCall::Delete(frontend.id.clone()))
            .await?;
        self.state
            .lock()
            .unwrap()
            .entities
            .remove(&frontend.id)
            .map(|_| ())
            .ok_or(ApiError::NotFound)
    }
}

/// JSON merge patch (RFC 7386): `null` removes a key, objects merge, anything else replaces
pub fn merge_patch(target: &mut serde_json::Value, patch: &serde_json::Value) {
    let serde_json::Value::Object(patch) = patch else {
        *target = patch.clone();
        return;
    };
    if !target.is_object() {
        *target = serde_json::Value::Object(serde_json::Map::new());
    }
    if let serde_json::Value::Object(target) = target {
        for (key, value) in patch {
            if value.is_null() {
                target.remove(key);
            } else {
                merge_patch(
                    target.entry(key.clone()).or_insert(serde_json::Value::Null),
                    value,
                );
            }
        }
    }
}
