//! # b3scale Operator
//!
//! Kubernetes operator that provisions b3scale frontends from `BBBFrontend`
//! custom resources.
//!
//! ## Usage
//!
//! ```bash
//! b3scale-operator --config b3scale-operator-config.yaml
//! ```
//!
//! Settings not in the file come from the environment (`B3SCALE_HOST`,
//! `B3SCALE_ACCESS_TOKEN`, `KUBECONFIG`, `RECONCILE_TIMEOUT_SECS`, ...).

use anyhow::Result;
use b3scale_operator::runtime::{initialization::initialize, watch_loop::run_watch_loop};
use clap::Parser;
use std::path::PathBuf;

/// b3scale operator
#[derive(Debug, Parser)]
#[command(name = "b3scale-operator", version, about, long_about = None)]
struct Cli {
    /// Path of the YAML configuration file
    /// (defaults to ./b3scale-operator-config.yaml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let init = initialize(cli.config.as_deref()).await?;
    run_watch_loop(init.client, init.reconciler, init.server_state).await;

    Ok(())
}
