//! # Delegate-Ledger Node Runtime
//!
//! Entry point of a single node.
//!
//! ## Startup Sequence
//!
//! 1. Install the tracing subscriber (`RUST_LOG`, default `info`)
//! 2. Load configuration (file from `DL_CONFIG` or the first argument,
//!    secrets from `DL_FORGING_SECRETS`)
//! 3. Bootstrap the ledger container and apply the genesis block
//! 4. Start the forging loop and the event logger
//! 5. Run until Ctrl+C, then disable forging and stop the loops

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use dl_02_slots::SystemTimeSource;
use dl_05_forging::ForgingHandle;
use node_runtime::container::{CONFIG_PATH_ENV, FORGING_SECRETS_ENV};
use node_runtime::{LedgerContainer, NodeConfig};
use shared_bus::EventFilter;

/// A running node.
struct NodeRuntime {
    forging: ForgingHandle,
    tasks: Vec<JoinHandle<()>>,
    shutdown_tx: watch::Sender<bool>,
}

impl NodeRuntime {
    async fn start(config: NodeConfig) -> Result<Self> {
        info!("===========================================");
        info!("  Delegate-Ledger Node Runtime v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");

        let container = LedgerContainer::bootstrap(config, Arc::new(SystemTimeSource))
            .await
            .context("Failed to bootstrap the ledger")?;
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let mut events = container.event_bus.subscribe(EventFilter::all());
        let mut events_shutdown = shutdown_rx.clone();
        let logger = tokio::spawn(async move {
            loop {
                tokio::select! {
                    event = events.recv() => match event {
                        Some(event) => info!(?event, "Ledger event"),
                        None => break,
                    },
                    _ = events_shutdown.changed() => break,
                }
            }
        });

        let (forging, commands) = ForgingHandle::channel(16);
        let scheduler = container.forging_scheduler();
        let forging_loop = tokio::spawn(scheduler.run(commands, shutdown_rx));

        info!(
            delegates = container.config.forging.secrets.len(),
            epoch = container.clock.config().epoch_time,
            "Node started"
        );

        Ok(Self {
            forging,
            tasks: vec![forging_loop, logger],
            shutdown_tx,
        })
    }

    async fn shutdown(self) {
        info!("Initiating graceful shutdown...");

        if let Err(e) = self.forging.disable(None).await {
            warn!(error = %e, "Forging loop already stopped");
        }
        if self.shutdown_tx.send(true).is_err() {
            warn!("No task listening for shutdown");
        }

        for task in self.tasks {
            if tokio::time::timeout(Duration::from_secs(2), task).await.is_err() {
                warn!("Task did not stop in time");
            }
        }

        info!("Shutdown complete");
    }
}

fn load_config() -> Result<NodeConfig> {
    let path = std::env::var_os(CONFIG_PATH_ENV)
        .or_else(|| std::env::args_os().nth(1))
        .map(PathBuf::from);
    let mut config =
        NodeConfig::load(path.as_deref()).context("Failed to load configuration")?;

    if let Ok(secrets) = std::env::var(FORGING_SECRETS_ENV) {
        config.override_secrets(&secrets);
        info!(
            count = config.forging.secrets.len(),
            "Loaded forging secrets from environment"
        );
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = load_config()?;
    let runtime = NodeRuntime::start(config).await?;

    info!("Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    runtime.shutdown().await;
    Ok(())
}
