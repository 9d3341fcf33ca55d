//! Telemetry transport port — a duplex stream of snapshots and status.
//!
//! The connector owns reconnection: a single opened stream survives
//! connection drops internally and keeps delivering events until it is
//! closed. Closing is idempotent and ends the stream — no event is
//! observable afterwards.

use std::future::Future;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use airhub_domain::error::AirHubError;
use airhub_domain::snapshot::{ConnectionStatus, SensorSnapshot};

/// One event delivered by an open telemetry stream.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// A normalized sensor reading.
    Snapshot(SensorSnapshot),
    /// A connectivity transition. Emitted on change only, never per retry.
    Status(ConnectionStatus),
}

/// An open telemetry stream: an event receiver plus its teardown handle.
///
/// Dropping the stream cancels the backing task, so an aborted consumer
/// cannot leak a connection.
#[derive(Debug)]
pub struct TelemetryStream {
    events: mpsc::Receiver<TransportEvent>,
    cancel: CancellationToken,
}

impl TelemetryStream {
    /// Assemble a stream from its channel half and cancellation token.
    /// Adapters call this; consumers only receive.
    #[must_use]
    pub fn new(events: mpsc::Receiver<TransportEvent>, cancel: CancellationToken) -> Self {
        Self { events, cancel }
    }

    /// Wait for the next event. Returns `None` once the stream has ended
    /// (closed, or the backing task gave up). Events still buffered when
    /// the stream is closed are discarded, not delivered.
    pub async fn next_event(&mut self) -> Option<TransportEvent> {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => None,
            event = self.events.recv() => event,
        }
    }

    /// Tear the stream down. Idempotent; cancels any pending reconnect in
    /// the backing task.
    pub fn close(&self) {
        self.cancel.cancel();
    }
}

impl Drop for TelemetryStream {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Factory for telemetry streams.
///
/// This is a **port** — the `ws_tungstenite` adapter provides the real
/// reconnecting WebSocket implementation; tests provide channel-backed
/// fakes.
pub trait TelemetryConnector: Send + Sync {
    /// Open a stream. The returned stream reconnects internally on drops;
    /// `open` itself only fails for unrecoverable setup problems (e.g. an
    /// invalid endpoint).
    fn open(&self) -> impl Future<Output = Result<TelemetryStream, AirHubError>> + Send;
}
