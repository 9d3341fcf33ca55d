//! Telemetry ingestor — canonical snapshot sourcing with clean teardown.
//!
//! Snapshots come either from the live transport (seeded by one
//! point-in-time fetch) or from the synthetic generator on a fixed
//! interval. Exactly one source is active at a time: switching modes or
//! shutting down cancels the active task *and awaits it*, so no snapshot
//! can be delivered afterwards.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use airhub_domain::snapshot::{ConnectionStatus, SensorSnapshot};

use crate::ports::control_plane::ControlPlane;
use crate::ports::telemetry::{TelemetryConnector, TransportEvent};
use crate::simulation::SnapshotGenerator;

/// Where snapshots come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelemetryMode {
    /// Seed fetch plus streaming transport.
    Live,
    /// Synthetic generator on a fixed interval.
    Simulation,
}

/// Tunables for the ingestor.
#[derive(Debug, Clone)]
pub struct IngestorConfig {
    /// Tick period of simulation mode.
    pub simulation_interval: Duration,
    /// Fixed generator seed; `None` seeds from the clock.
    pub simulation_seed: Option<u64>,
}

impl Default for IngestorConfig {
    fn default() -> Self {
        Self {
            simulation_interval: Duration::from_millis(3000),
            simulation_seed: None,
        }
    }
}

/// State shared between the ingestor surface and its source task.
struct Shared {
    latest: Mutex<Option<SensorSnapshot>>,
    status: Mutex<ConnectionStatus>,
    publisher: broadcast::Sender<SensorSnapshot>,
}

impl Shared {
    fn record(&self, snapshot: SensorSnapshot) {
        *self.latest.lock().expect("latest lock poisoned") = Some(snapshot.clone());
        // Send fails only with zero receivers, which is fine.
        let _ = self.publisher.send(snapshot);
    }

    fn set_status(&self, status: ConnectionStatus) {
        *self.status.lock().expect("status lock poisoned") = status;
    }
}

struct ActiveSource {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Canonical source of sensor snapshots.
pub struct TelemetryIngestor<C, T> {
    control: Arc<C>,
    connector: Arc<T>,
    shared: Arc<Shared>,
    config: IngestorConfig,
    active: Option<ActiveSource>,
}

impl<C, T> TelemetryIngestor<C, T>
where
    C: ControlPlane + 'static,
    T: TelemetryConnector + 'static,
{
    /// Create an idle ingestor; call [`set_mode`](Self::set_mode) to start.
    #[must_use]
    pub fn new(control: Arc<C>, connector: Arc<T>, config: IngestorConfig) -> Self {
        let (publisher, _) = broadcast::channel(64);
        Self {
            control,
            connector,
            shared: Arc::new(Shared {
                latest: Mutex::new(None),
                status: Mutex::new(ConnectionStatus::Checking),
                publisher,
            }),
            config,
            active: None,
        }
    }

    /// The most recent snapshot, if any has been observed.
    #[must_use]
    pub fn latest(&self) -> Option<SensorSnapshot> {
        self.shared.latest.lock().expect("latest lock poisoned").clone()
    }

    /// Connectivity of the live source. Not meaningful in simulation mode.
    #[must_use]
    pub fn connection_status(&self) -> ConnectionStatus {
        *self.shared.status.lock().expect("status lock poisoned")
    }

    /// Subscribe to snapshots published after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SensorSnapshot> {
        self.shared.publisher.subscribe()
    }

    /// Activate a source, fully tearing down the previous one first.
    /// No two sources are ever active concurrently.
    pub async fn set_mode(&mut self, mode: TelemetryMode) {
        self.shutdown().await;

        let cancel = CancellationToken::new();
        let task = match mode {
            TelemetryMode::Live => tokio::spawn(live_source(
                Arc::clone(&self.control),
                Arc::clone(&self.connector),
                Arc::clone(&self.shared),
                cancel.clone(),
            )),
            TelemetryMode::Simulation => {
                let generator = match self.config.simulation_seed {
                    Some(seed) => SnapshotGenerator::new(seed),
                    None => SnapshotGenerator::from_entropy(),
                };
                tokio::spawn(simulation_source(
                    Arc::clone(&self.shared),
                    cancel.clone(),
                    self.config.simulation_interval,
                    generator,
                ))
            }
        };
        self.active = Some(ActiveSource { cancel, task });
    }

    /// Cancel the active source and wait for it to finish. Idempotent.
    /// After this returns, no subscriber callback fires again until a new
    /// mode is set.
    pub async fn shutdown(&mut self) {
        if let Some(active) = self.active.take() {
            active.cancel.cancel();
            // The task only ends by observing the cancellation; a join
            // error here means it panicked, which tests surface loudly.
            let _ = active.task.await;
        }
    }
}

/// Live mode: one seed fetch, then the reconnecting stream.
async fn live_source<C, T>(
    control: Arc<C>,
    connector: Arc<T>,
    shared: Arc<Shared>,
    cancel: CancellationToken,
) where
    C: ControlPlane,
    T: TelemetryConnector,
{
    tokio::select! {
        biased;
        () = cancel.cancelled() => return,
        result = control.fetch_latest() => match result {
            Ok(snapshot) => {
                shared.set_status(ConnectionStatus::Connected);
                shared.record(snapshot);
            }
            Err(err) => {
                tracing::warn!(error = %err, "seed fetch failed");
                shared.set_status(ConnectionStatus::Disconnected);
            }
        },
    }

    let mut stream = tokio::select! {
        biased;
        () = cancel.cancelled() => return,
        result = connector.open() => match result {
            Ok(stream) => stream,
            Err(err) => {
                tracing::warn!(error = %err, "failed to open telemetry stream");
                shared.set_status(ConnectionStatus::Disconnected);
                return;
            }
        },
    };

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                stream.close();
                break;
            }
            event = stream.next_event() => match event {
                Some(TransportEvent::Snapshot(snapshot)) => {
                    shared.set_status(ConnectionStatus::Connected);
                    shared.record(snapshot);
                }
                Some(TransportEvent::Status(status)) => shared.set_status(status),
                // Stream gave up; status stays whatever it last was.
                None => break,
            },
        }
    }
}

/// Simulation mode: synthetic snapshot every tick.
async fn simulation_source(
    shared: Arc<Shared>,
    cancel: CancellationToken,
    interval: Duration,
    mut generator: SnapshotGenerator,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(interval) => {
                shared.record(generator.next_snapshot());
            }
        }
    }
}
