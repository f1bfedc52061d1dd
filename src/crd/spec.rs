//! # BBBFrontend Spec
//!
//! Main CRD specification types.

use serde::{Deserialize, Serialize};

/// BBBFrontend Custom Resource Definition
///
/// Declares one b3scale frontend. The operator creates the frontend through the
/// b3scale API, records its id in `spec.frontendID` and keeps its settings in sync.
///
/// # Example
///
/// ```yaml
/// apiVersion: b3scale.infra.run/v1
/// kind: BBBFrontend
/// metadata:
///   name: room1
///   namespace: default
/// spec:
///   credentials:
///     frontend: room1
///     secretRef:
///       name: s1
///       key: secret
///   settings:
///     requiredTags: ["hd"]
/// ```
#[derive(kube::CustomResource, Debug, Clone, Default, PartialEq, Deserialize, Serialize, schemars::JsonSchema)]
#[kube(
    kind = "BBBFrontend",
    group = "b3scale.infra.run",
    version = "v1",
    plural = "bbbfrontends",
    namespaced,
    status = "crate::crd::BBBFrontendStatus",
    shortname = "bbbfe",
    printcolumn = r#"{"name":"Ready", "type":"string", "jsonPath":".status.conditions[?(@.type==\"Ready\")].status"}, {"name":"FrontendID", "type":"string", "jsonPath":".spec.frontendID"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct BBBFrontendSpec {
    /// Settings pushed to the b3scale frontend on every reconciliation
    #[serde(default)]
    pub settings: crate::crd::FrontendSettings,
    /// Frontend key and a reference to the secret holding the frontend secret.
    /// Required to create the frontend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Credentials>,
    /// When true, the b3scale frontend is kept when this resource is deleted
    #[serde(default)]
    pub deletion_protection: bool,
    /// Id of the b3scale frontend backing this resource.
    /// Written by the operator once the frontend exists; never changes afterwards.
    #[serde(
        default,
        rename = "frontendID",
        skip_serializing_if = "Option::is_none"
    )]
    pub frontend_id: Option<String>,
}

/// Frontend credentials
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    /// External-facing frontend key (the BBB "frontend" name)
    #[serde(rename = "frontend", alias = "frontendKey")]
    pub frontend_key: String,
    /// Secret field holding the frontend secret (at least 32 characters)
    pub secret_ref: SecretKeyRef,
}

/// Pointer to one key of a Secret in the resource's namespace
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
pub struct SecretKeyRef {
    pub name: String,
    pub key: String,
}

impl BBBFrontend {
    /// True once the platform has requested deletion
    #[must_use]
    pub fn is_deleting(&self) -> bool {
        self.metadata.deletion_timestamp.is_some()
    }

    /// Linked frontend id, ignoring empty strings
    #[must_use]
    pub fn frontend_id(&self) -> Option<&str> {
        self.spec.frontend_id.as_deref().filter(|id| !id.is_empty())
    }

    /// `namespace/name` key used for logging and per-resource bookkeeping
    #[must_use]
    pub fn resource_key(&self) -> String {
        format!(
            "{}/{}",
            self.metadata.namespace.as_deref().unwrap_or("default"),
            self.metadata.name.as_deref().unwrap_or("unknown")
        )
    }
}
