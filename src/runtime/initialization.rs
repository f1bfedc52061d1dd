//! # Initialization
//!
//! Process bootstrap: rustls, logging, metrics, the health server, the
//! Kubernetes client and the b3scale client.

use crate::config::{ControllerConfig, OperatorConfig};
use crate::controller::reconciler::Reconciler;
use crate::observability::{self, logging::LogFormat};
use crate::provider::B3ScaleREST;
use crate::server::{start_server, ServerState};
use crate::store::{KubeFrontendStore, KubeSecretStore};
use anyhow::{Context, Result};
use kube::Client;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

const SERVER_STARTUP_TIMEOUT: Duration = Duration::from_secs(10);
const SERVER_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Everything the watch loop needs
pub struct InitializationResult {
    pub client: Client,
    pub reconciler: Arc<Reconciler>,
    pub server_state: Arc<ServerState>,
}

impl std::fmt::Debug for InitializationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InitializationResult")
            .field("server_ready", &self.server_state.ready())
            .finish_non_exhaustive()
    }
}

/// Initialize the operator runtime
///
/// # Errors
/// Returns an error if configuration is invalid or a client cannot be created.
pub async fn initialize(config_path: Option<&Path>) -> Result<InitializationResult> {
    let controller_config = ControllerConfig::from_env();

    let log_format = controller_config
        .log_format
        .parse::<LogFormat>()
        .unwrap_or_default();
    if let Err(e) = observability::logging::init_logging(log_format) {
        warn!("Tracing subscriber init returned error (may already be initialized): {}", e);
    }

    // Must run before anything opens a TLS connection
    install_crypto_provider();

    info!("Starting b3scale operator");
    info!(
        "Build info: datetime={}, git_hash={}",
        env!("BUILD_DATETIME"),
        env!("BUILD_GIT_HASH")
    );

    let operator_config =
        OperatorConfig::load(config_path).context("Failed to load operator configuration")?;
    info!(
        b3scale.host = operator_config.b3_scale.host.as_str(),
        "Loaded operator configuration"
    );

    observability::metrics::register_metrics().context("Failed to register metrics")?;

    let server_state = Arc::new(ServerState::default());
    let server_state_clone = Arc::clone(&server_state);
    let port = controller_config.metrics_port;
    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(port, server_state_clone).await {
            error!("HTTP server error: {}", e);
        }
    });
    wait_for_server_ready(&server_state, &server_handle).await?;

    let kube_config = operator_config
        .kube_config()
        .await
        .context("Failed to build Kubernetes client configuration")?;
    let client = Client::try_from(kube_config).context("Failed to create Kubernetes client")?;

    let base_url = operator_config.b3scale_base_url(&controller_config.b3scale_scheme);
    let api = B3ScaleREST::new(
        base_url.clone(),
        operator_config.b3_scale.access_token.clone(),
        controller_config.api_timeout(),
    )
    .context("Failed to create b3scale API client")?;
    info!("Using b3scale API at {}", base_url);

    let reconciler = Arc::new(Reconciler::new(
        Arc::new(KubeFrontendStore::new(client.clone())),
        Arc::new(KubeSecretStore::new(client.clone())),
        Arc::new(api),
        base_url,
        controller_config,
    ));

    server_state.set_ready(true);
    info!("Operator initialized, starting watch loop...");

    Ok(InitializationResult {
        client,
        reconciler,
        server_state,
    })
}

/// Install the ring provider as the process-wide rustls default
///
/// Returns `false` (and warns) when a provider was already installed.
fn install_crypto_provider() -> bool {
    let installed = rustls::crypto::ring::default_provider()
        .install_default()
        .is_ok();
    if !installed {
        warn!("rustls crypto provider was already installed");
    }
    installed
}

/// Wait until the server is bound, failing if its task exits or the timeout passes
async fn wait_for_server_ready(
    server_state: &ServerState,
    server_handle: &tokio::task::JoinHandle<()>,
) -> Result<()> {
    let start_time = std::time::Instant::now();

    loop {
        if server_handle.is_finished() {
            return Err(anyhow::anyhow!("HTTP server failed to start"));
        }
        if server_state.listening() {
            info!("HTTP server is accepting connections");
            return Ok(());
        }
        if start_time.elapsed() > SERVER_STARTUP_TIMEOUT {
            return Err(anyhow::anyhow!(
                "HTTP server failed to start within {} seconds",
                SERVER_STARTUP_TIMEOUT.as_secs()
            ));
        }
        tokio::time::sleep(SERVER_POLL_INTERVAL).await;
    }
}
