//! # Watch Loop
//!
//! Runs the `BBBFrontend` controller over all namespaces. Generated connection
//! secrets are owned objects, so changes to them trigger their owner.

use crate::constants::{MANAGED_BY_LABEL, MANAGED_BY_VALUE};
use crate::controller::reconciler::{reconcile, Reconciler};
use crate::crd::BBBFrontend;
use crate::runtime::error_policy::handle_reconciliation_error;
use crate::server::ServerState;
use futures::StreamExt;
use k8s_openapi::api::core::v1::Secret;
use kube::api::Api;
use kube::Client;
use kube_runtime::{watcher, Controller};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Run the controller until a shutdown signal arrives
pub async fn run_watch_loop(client: Client, reconciler: Arc<Reconciler>, server_state: Arc<ServerState>) {
    let frontends: Api<BBBFrontend> = Api::all(client.clone());
    let secrets: Api<Secret> = Api::all(client);

    info!("Starting controller watch loop...");

    Controller::new(frontends, watcher::Config::default().any_semantic())
        .owns(
            secrets,
            watcher::Config::default().labels(&format!("{MANAGED_BY_LABEL}={MANAGED_BY_VALUE}")),
        )
        .shutdown_on_signal()
        .run(reconcile, handle_reconciliation_error, reconciler)
        .for_each(|result| async move {
            match result {
                Ok((object, _action)) => {
                    debug!(
                        resource.namespace = object.namespace.as_deref().unwrap_or_default(),
                        resource.name = object.name.as_str(),
                        "watch.event.success"
                    );
                }
                Err(e) => warn!("Controller stream error: {}", e),
            }
        })
        .await;

    server_state.set_ready(false);
    info!("Controller stopped gracefully");
}
