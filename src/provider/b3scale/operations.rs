//! # Frontend Operations
//!
//! Implementation of [`FrontendApi`] for the b3scale REST API.
//!
//! Each method issues exactly one HTTP call inside its own span and records the
//! outcome through [`OperationTracker`].

use async_trait::async_trait;
use reqwest::Method;
use tracing::{debug, info, info_span, Instrument};

use super::requests::UpdateSettingsRequest;
use super::{B3ScaleREST, OperationTracker};
use crate::provider::{ApiError, ApiFrontendSettings, FrontendApi, FrontendState, NewFrontend};

const FRONTENDS: &str = "frontends";

#[async_trait]
impl FrontendApi for B3ScaleREST {
    async fn create(
        &self,
        desired: &NewFrontend,
        idempotency_key: &str,
    ) -> Result<FrontendState, ApiError> {
        let span = info_span!(
            "b3scale.frontend.create",
            frontend.key = %desired.frontend.key,
            idempotency.key = idempotency_key,
            operation.duration_ms = tracing::field::Empty,
            operation.success = tracing::field::Empty,
            error.message = tracing::field::Empty,
        );
        let tracker = OperationTracker::new("create", span.clone());

        async move {
            let request = self
                .make_request(Method::POST, FRONTENDS, Some(serde_json::to_value(desired)?))
                .header("Idempotency-Key", idempotency_key);

            let result = match self.execute(request).await {
                Ok(text) => serde_json::from_str::<FrontendState>(&text).map_err(ApiError::from),
                Err(e) => Err(e),
            };
            let created = tracker.finish(result)?;

            info!(frontend.id = %created.id, "Created b3scale frontend");
            Ok(created)
        }
        .instrument(span)
        .await
    }

    async fn retrieve(&self, id: &str) -> Result<FrontendState, ApiError> {
        let span = info_span!(
            "b3scale.frontend.retrieve",
            frontend.id = id,
            operation.duration_ms = tracing::field::Empty,
            operation.success = tracing::field::Empty,
            error.message = tracing::field::Empty,
        );
        let tracker = OperationTracker::new("retrieve", span.clone());

        async move {
            let request = self.make_request(Method::GET, &format!("{FRONTENDS}/{id}"), None);
            let result = match self.execute(request).await {
                Ok(text) => serde_json::from_str::<FrontendState>(&text).map_err(ApiError::from),
                Err(e) => Err(e),
            };
            tracker.finish(result)
        }
        .instrument(span)
        .await
    }

    async fn find_by_key(&self, key: &str) -> Result<Vec<FrontendState>, ApiError> {
        let span = info_span!(
            "b3scale.frontend.find_by_key",
            frontend.key = key,
            operation.duration_ms = tracing::field::Empty,
            operation.success = tracing::field::Empty,
            error.message = tracing::field::Empty,
        );
        let tracker = OperationTracker::new("find_by_key", span.clone());

        async move {
            let request = self
                .make_request(Method::GET, FRONTENDS, None)
                .query(&[("key", key)]);
            let result = match self.execute(request).await {
                Ok(text) => {
                    serde_json::from_str::<Vec<FrontendState>>(&text).map_err(ApiError::from)
                }
                Err(e) => Err(e),
            };
            let found = tracker.finish(result)?;
            debug!("Found {} b3scale frontend(s) with key {}", found.len(), key);
            Ok(found)
        }
        .instrument(span)
        .await
    }

    async fn update_settings(
        &self,
        id: &str,
        settings: &ApiFrontendSettings,
    ) -> Result<(), ApiError> {
        let span = info_span!(
            "b3scale.frontend.update_settings",
            frontend.id = id,
            operation.duration_ms = tracing::field::Empty,
            operation.success = tracing::field::Empty,
            error.message = tracing::field::Empty,
        );
        let tracker = OperationTracker::new("update_settings", span.clone());

        async move {
            let body = serde_json::to_value(UpdateSettingsRequest::from(settings))?;
            let request = self.make_request(Method::PATCH, &format!("{FRONTENDS}/{id}"), Some(body));
            tracker.finish(self.execute(request).await.map(|_| ()))?;
            debug!("Updated settings of b3scale frontend {}", id);
            Ok(())
        }
        .instrument(span)
        .await
    }

    async fn delete(&self, frontend: &FrontendState) -> Result<(), ApiError> {
        let span = info_span!(
            "b3scale.frontend.delete",
            frontend.id = %frontend.id,
            operation.duration_ms = tracing::field::Empty,
            operation.success = tracing::field::Empty,
            error.message = tracing::field::Empty,
        );
        let tracker = OperationTracker::new("delete", span.clone());

        async move {
            let request = self.make_request(
                Method::DELETE,
                &format!("{FRONTENDS}/{}", frontend.id),
                None,
            );
            tracker.finish(self.execute(request).await.map(|_| ()))?;
            info!(base_url = self.base_url(), "Deleted b3scale frontend {}", frontend.id);
            Ok(())
        }
        .instrument(span)
        .await
    }
}
