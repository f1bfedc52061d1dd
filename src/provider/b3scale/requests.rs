//! # Request Types
//!
//! Request payloads of the b3scale admin API that differ from the entity
//! itself. Frontend creation posts a [`NewFrontend`](crate::provider::NewFrontend)
//! directly.

use crate::provider::{ApiDefaultPresentation, ApiFrontendSettings};
use serde::Serialize;
use std::collections::BTreeMap;

/// Body of a settings-only `PATCH /api/v1/frontends/{id}`
///
/// b3scale applies the body as a JSON merge, so leaving `frontend` out keeps
/// the stored key and secret untouched. Inside `settings` every field is sent:
/// an unset field goes out as `null`, which clears the stored value.
#[derive(Debug, Serialize)]
pub struct UpdateSettingsRequest<'a> {
    pub settings: MergeSettings<'a>,
}

/// Settings as a merge document (no omitted keys)
#[derive(Debug, Serialize)]
pub struct MergeSettings<'a> {
    pub required_tags: &'a [String],
    pub default_presentation: Option<&'a ApiDefaultPresentation>,
    pub create_default_params: Option<&'a BTreeMap<String, String>>,
    pub create_override_params: Option<&'a BTreeMap<String, String>>,
}

impl<'a> From<&'a ApiFrontendSettings> for UpdateSettingsRequest<'a> {
    fn from(settings: &'a ApiFrontendSettings) -> Self {
        Self {
            settings: MergeSettings {
                required_tags: &settings.required_tags,
                default_presentation: settings.default_presentation.as_ref(),
                create_default_params: settings.create_default_params.as_ref(),
                create_override_params: settings.create_override_params.as_ref(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_update_settings_request_never_carries_frontend() {
        let settings = ApiFrontendSettings {
            required_tags: vec!["hd".into(), "record".into()],
            ..Default::default()
        };
        let body = serde_json::to_value(UpdateSettingsRequest::from(&settings)).unwrap();

        assert!(body.get("frontend").is_none());
        assert_eq!(body["settings"]["required_tags"], json!(["hd", "record"]));
    }

    #[test]
    fn test_unset_settings_are_sent_as_null() {
        let settings = ApiFrontendSettings {
            required_tags: vec!["hd".into()],
            ..Default::default()
        };
        let body = serde_json::to_value(UpdateSettingsRequest::from(&settings)).unwrap();

        assert_eq!(
            body,
            json!({
                "settings": {
                    "required_tags": ["hd"],
                    "default_presentation": null,
                    "create_default_params": null,
                    "create_override_params": null
                }
            })
        );
    }

    #[test]
    fn test_set_settings_are_carried_through() {
        let settings = ApiFrontendSettings {
            required_tags: Vec::new(),
            default_presentation: Some(ApiDefaultPresentation {
                url: "https://example.org/a.pdf".into(),
                force: true,
            }),
            create_default_params: None,
            create_override_params: Some(BTreeMap::from([("record".into(), "false".into())])),
        };
        let body = serde_json::to_value(UpdateSettingsRequest::from(&settings)).unwrap();

        assert_eq!(
            body["settings"],
            json!({
                "required_tags": [],
                "default_presentation": { "url": "https://example.org/a.pdf", "force": true },
                "create_default_params": null,
                "create_override_params": { "record": "false" }
            })
        );
    }
}
