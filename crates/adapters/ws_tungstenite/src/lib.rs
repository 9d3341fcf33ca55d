//! Reconnecting WebSocket implementation of the telemetry port.
//!
//! Connects to the station server's `/ws` endpoint and streams normalized
//! snapshots. A dropped connection is retried forever on a fixed delay;
//! the stream stays open across drops and only ends when the consumer
//! closes it. Connectivity transitions are reported on change, never once
//! per retry attempt.

use std::time::Duration;

use futures_util::StreamExt;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite;
use tokio_util::sync::CancellationToken;
use url::Url;

use airhub_app::ports::telemetry::{TelemetryConnector, TelemetryStream, TransportEvent};
use airhub_domain::error::{AirHubError, TransportError};
use airhub_domain::rule::GAS_AIR_VALUE;
use airhub_domain::snapshot::{ConnectionStatus, SensorSnapshot};

const EVENT_CHANNEL_CAPACITY: usize = 64;
const RECONNECT_DELAY: Duration = Duration::from_millis(5000);

/// WebSocket connector with a fixed-delay reconnect loop.
pub struct ReconnectingTransport {
    url: Url,
    reconnect_delay: Duration,
}

impl ReconnectingTransport {
    /// Create a connector for a `ws://` or `wss://` endpoint.
    #[must_use]
    pub fn new(url: Url) -> Self {
        Self {
            url,
            reconnect_delay: RECONNECT_DELAY,
        }
    }

    /// Override the fixed delay between reconnect attempts.
    #[must_use]
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }
}

impl TelemetryConnector for ReconnectingTransport {
    async fn open(&self) -> Result<TelemetryStream, AirHubError> {
        if !matches!(self.url.scheme(), "ws" | "wss") {
            return Err(TransportError {
                message: format!("unsupported endpoint scheme: {}", self.url),
            }
            .into());
        }

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let cancel = CancellationToken::new();
        tokio::spawn(run_loop(
            self.url.clone(),
            tx,
            self.reconnect_delay,
            cancel.clone(),
        ));
        Ok(TelemetryStream::new(rx, cancel))
    }
}

// ── Background reconnection loop ─────────────────────────────────────

/// Main loop: connect → read until drop → report → wait → reconnect.
async fn run_loop(
    url: Url,
    tx: mpsc::Sender<TransportEvent>,
    reconnect_delay: Duration,
    cancel: CancellationToken,
) {
    let mut last_status = None;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = connect_and_read(&url, &tx, &cancel, &mut last_status) => {
                if cancel.is_cancelled() {
                    break;
                }
                match result {
                    Ok(()) => tracing::info!("telemetry connection closed, reconnecting"),
                    Err(err) => tracing::warn!(error = %err.message, "telemetry connection failed"),
                }
                if !emit_status(&tx, &mut last_status, ConnectionStatus::Disconnected).await {
                    break;
                }
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    () = tokio::time::sleep(reconnect_delay) => {}
                }
            }
        }
    }

    tracing::debug!("telemetry loop exiting");
}

/// Establish a single connection and read frames until it drops.
async fn connect_and_read(
    url: &Url,
    tx: &mpsc::Sender<TransportEvent>,
    cancel: &CancellationToken,
    last_status: &mut Option<ConnectionStatus>,
) -> Result<(), TransportError> {
    tracing::debug!(url = %url, "connecting telemetry stream");

    let (ws_stream, _response) = tokio_tungstenite::connect_async(url.as_str())
        .await
        .map_err(|err| TransportError {
            message: err.to_string(),
        })?;

    tracing::info!(url = %url, "telemetry stream connected");
    if !emit_status(tx, last_status, ConnectionStatus::Connected).await {
        return Ok(());
    }

    let (_write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => return Ok(()),
            frame = read.next() => {
                match frame {
                    Some(Ok(tungstenite::Message::Text(text))) => {
                        if let Some(snapshot) = parse_frame(&text) {
                            if tx.send(TransportEvent::Snapshot(snapshot)).await.is_err() {
                                return Ok(());
                            }
                        }
                    }
                    Some(Ok(tungstenite::Message::Ping(_))) => {
                        // tungstenite replies with pong automatically
                        tracing::trace!("telemetry ping");
                    }
                    Some(Ok(tungstenite::Message::Close(_))) => return Ok(()),
                    Some(Err(err)) => {
                        return Err(TransportError {
                            message: err.to_string(),
                        });
                    }
                    // stream ended without a close frame
                    None => return Ok(()),
                    _ => {
                        // Binary, Pong, Frame: nothing to do
                    }
                }
            }
        }
    }
}

/// Deliver a status event only when it differs from the last one sent.
/// Returns `false` once the consumer is gone.
async fn emit_status(
    tx: &mpsc::Sender<TransportEvent>,
    last: &mut Option<ConnectionStatus>,
    status: ConnectionStatus,
) -> bool {
    if *last == Some(status) {
        return true;
    }
    *last = Some(status);
    tx.send(TransportEvent::Status(status)).await.is_ok()
}

// ── Frame parsing ────────────────────────────────────────────────────

/// Outer shape of every server frame: `{ "type": ..., "data": ... }`.
#[derive(Debug, Deserialize)]
struct FrameEnvelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: serde_json::Value,
}

/// Raw sensor payload of a `sensor_update` frame.
#[derive(Debug, Deserialize)]
struct RawReading {
    temperature: f64,
    humidity: f64,
    dust_density: f64,
    air_value: f64,
    #[serde(default)]
    aqi: i64,
}

/// Parse one text frame into a snapshot.
///
/// Frames of other types are ignored quietly; malformed payloads are
/// dropped with a diagnostic and never tear the connection down.
fn parse_frame(text: &str) -> Option<SensorSnapshot> {
    let envelope: FrameEnvelope = match serde_json::from_str(text) {
        Ok(envelope) => envelope,
        Err(err) => {
            tracing::warn!(error = %err, "dropping malformed telemetry frame");
            return None;
        }
    };

    if envelope.kind != "sensor_update" {
        tracing::debug!(kind = %envelope.kind, "ignoring telemetry frame");
        return None;
    }

    match serde_json::from_value::<RawReading>(envelope.data) {
        Ok(reading) => Some(SensorSnapshot::new(
            reading.temperature,
            reading.humidity,
            reading.dust_density,
            reading.air_value > GAS_AIR_VALUE,
            reading.aqi,
        )),
        Err(err) => {
            tracing::warn!(error = %err, "dropping sensor_update with malformed payload");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_sensor_update_frame() {
        let snap = parse_frame(
            r#"{
                "type": "sensor_update",
                "data": {
                    "temperature": 29.5,
                    "humidity": 48.0,
                    "dust_density": 33.0,
                    "air_value": 320.0,
                    "aqi": 72
                }
            }"#,
        )
        .unwrap();
        assert_eq!(snap.temperature, 29.5);
        assert_eq!(snap.pm25, 33.0);
        assert!(snap.gas_detected);
        assert_eq!(snap.aqi, 72);
    }

    #[test]
    fn should_default_missing_aqi() {
        let snap = parse_frame(
            r#"{
                "type": "sensor_update",
                "data": {
                    "temperature": 29.5,
                    "humidity": 48.0,
                    "dust_density": 33.0,
                    "air_value": 120.0
                }
            }"#,
        )
        .unwrap();
        assert_eq!(snap.aqi, 0);
        assert!(!snap.gas_detected);
    }

    #[test]
    fn should_ignore_frames_of_other_types() {
        assert!(parse_frame(r#"{"type": "heartbeat", "data": {}}"#).is_none());
    }

    #[test]
    fn should_drop_malformed_json() {
        assert!(parse_frame("not json at all").is_none());
    }

    #[test]
    fn should_drop_sensor_update_with_wrong_payload_shape() {
        assert!(parse_frame(r#"{"type": "sensor_update", "data": {"temperature": "hot"}}"#).is_none());
    }

    #[tokio::test]
    async fn should_reject_non_websocket_scheme() {
        let transport = ReconnectingTransport::new(Url::parse("http://localhost/ws").unwrap());
        assert!(matches!(
            transport.open().await,
            Err(AirHubError::Transport(_))
        ));
    }
}
