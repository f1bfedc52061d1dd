//! # Frontend Settings
//!
//! Settings declared on a `BBBFrontend` and their translation to the b3scale API schema.
//!
//! Every optional field keeps its presence explicit: an overlay map that is absent
//! and one that is present but empty are different declarations, and translation
//! decides what reaches the wire.

use crate::provider::{ApiDefaultPresentation, ApiFrontendSettings};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Frontend settings as declared on the custom resource (camelCase)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FrontendSettings {
    /// Tags a BBB backend must carry to host meetings of this frontend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_tags: Option<Vec<String>>,
    /// Presentation loaded into every meeting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_presentation: Option<DefaultPresentation>,
    /// `create` parameters applied when the client did not send them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_default_params: Option<BTreeMap<String, String>>,
    /// `create` parameters that always replace the client's values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_override_params: Option<BTreeMap<String, String>>,
}

/// Default presentation settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
pub struct DefaultPresentation {
    pub url: String,
    #[serde(default)]
    pub force: bool,
}

impl FrontendSettings {
    /// Translate to the settings schema of the b3scale API
    ///
    /// - `requiredTags` becomes an empty list when unset, never null
    /// - `defaultPresentation` is carried through or omitted
    /// - overlay maps are sent only when they hold at least one entry
    #[must_use]
    pub fn to_api_settings(&self) -> ApiFrontendSettings {
        let mut required_tags: Vec<String> = Vec::new();
        for tag in self.required_tags.iter().flatten() {
            if !required_tags.contains(tag) {
                required_tags.push(tag.clone());
            }
        }

        ApiFrontendSettings {
            required_tags,
            default_presentation: self.default_presentation.as_ref().map(|p| {
                ApiDefaultPresentation {
                    url: p.url.clone(),
                    force: p.force,
                }
            }),
            create_default_params: non_empty(self.create_default_params.as_ref()),
            create_override_params: non_empty(self.create_override_params.as_ref()),
        }
    }
}

fn non_empty(params: Option<&BTreeMap<String, String>>) -> Option<BTreeMap<String, String>> {
    params.filter(|p| !p.is_empty()).cloned()
}
