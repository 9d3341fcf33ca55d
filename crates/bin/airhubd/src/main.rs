//! # airhubd — airhub daemon
//!
//! Composition root that wires the adapters together and runs the
//! automation core against one station.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Construct the HTTP control-plane client and the WebSocket connector
//! - Construct the state store, device directory, ingestor and engine
//! - Feed every published snapshot through the threshold engine
//! - Handle graceful shutdown (SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;

use anyhow::Context;
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

use airhub_adapter_control_reqwest::RemoteControlPlane;
use airhub_adapter_ws_tungstenite::ReconnectingTransport;
use airhub_app::device_directory::DeviceDirectory;
use airhub_app::ingestor::{IngestorConfig, TelemetryIngestor};
use airhub_app::state_store::DeviceStateStore;
use airhub_app::threshold_engine::ThresholdEngine;

use crate::config::Config;

const STATE_CHANNEL_CAPACITY: usize = 256;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("loading configuration")?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Adapters
    let control = Arc::new(
        RemoteControlPlane::new(config.base_url()?, config.station.id.clone())
            .context("building control-plane client")?,
    );
    let connector = Arc::new(
        ReconnectingTransport::new(config.ws_url()?)
            .with_reconnect_delay(config.reconnect_delay()),
    );

    // Core services
    let store = Arc::new(DeviceStateStore::new(STATE_CHANNEL_CAPACITY));
    let directory = DeviceDirectory::new(Arc::clone(&control), Arc::clone(&store));
    let mut engine = ThresholdEngine::new(Arc::clone(&store));

    match directory.refresh().await {
        Ok(descriptors) => {
            tracing::info!(devices = descriptors.len(), "device registry loaded");
            engine.set_registry(descriptors);
        }
        // The registry can be refreshed later; an empty one just means no
        // automation until the server is reachable.
        Err(err) => tracing::warn!(error = %err, "starting with an empty device registry"),
    }

    let mut ingestor = TelemetryIngestor::new(
        Arc::clone(&control),
        connector,
        IngestorConfig {
            simulation_interval: config.simulation_interval(),
            simulation_seed: config.telemetry.simulation_seed,
        },
    );
    let mut snapshots = ingestor.subscribe();
    let mode = config.telemetry_mode();
    ingestor.set_mode(mode).await;
    tracing::info!(station = %config.station.id, ?mode, "airhubd running");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutdown signal received");
                break;
            }
            snapshot = snapshots.recv() => match snapshot {
                Ok(snapshot) => {
                    let applied = engine.process(&snapshot);
                    if !applied.is_empty() {
                        tracing::debug!(changes = applied.len(), "automation applied");
                    }
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "snapshot consumer lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }

    ingestor.shutdown().await;
    tracing::info!("airhubd stopped");
    Ok(())
}
