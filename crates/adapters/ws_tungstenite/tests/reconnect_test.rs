// Integration tests for `ReconnectingTransport` against a local
// WebSocket server.

use std::time::Duration;

use futures_util::SinkExt;
use serde_json::json;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{WebSocketStream, accept_async};
use url::Url;

use airhub_adapter_ws_tungstenite::ReconnectingTransport;
use airhub_app::ports::telemetry::{TelemetryConnector, TelemetryStream, TransportEvent};
use airhub_domain::snapshot::ConnectionStatus;

// ── Helpers ─────────────────────────────────────────────────────────

async fn bind() -> (TcpListener, Url) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let url = Url::parse(&format!("ws://{addr}/ws")).unwrap();
    (listener, url)
}

async fn accept(listener: &TcpListener) -> WebSocketStream<TcpStream> {
    let (socket, _) = listener.accept().await.unwrap();
    accept_async(socket).await.unwrap()
}

fn sensor_frame(temperature: f64) -> Message {
    Message::text(
        json!({
            "type": "sensor_update",
            "data": {
                "temperature": temperature,
                "humidity": 48.0,
                "dust_density": 33.0,
                "air_value": 120.0,
                "aqi": 50
            }
        })
        .to_string(),
    )
}

async fn next(stream: &mut TelemetryStream) -> TransportEvent {
    tokio::time::timeout(Duration::from_secs(5), stream.next_event())
        .await
        .expect("timed out waiting for event")
        .expect("stream ended unexpectedly")
}

fn transport(url: Url) -> ReconnectingTransport {
    ReconnectingTransport::new(url).with_reconnect_delay(Duration::from_millis(50))
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn should_report_connected_then_stream_snapshots() {
    let (listener, url) = bind().await;
    let mut stream = transport(url).open().await.unwrap();

    let mut server = accept(&listener).await;
    assert_eq!(
        next(&mut stream).await,
        TransportEvent::Status(ConnectionStatus::Connected)
    );

    server.send(sensor_frame(29.5)).await.unwrap();
    match next(&mut stream).await {
        TransportEvent::Snapshot(snap) => {
            assert_eq!(snap.temperature, 29.5);
            assert_eq!(snap.pm25, 33.0);
            assert!(!snap.gas_detected);
        }
        other => panic!("expected snapshot, got {other:?}"),
    }
}

#[tokio::test]
async fn should_reconnect_after_server_drop() {
    let (listener, url) = bind().await;
    let mut stream = transport(url).open().await.unwrap();

    let server = accept(&listener).await;
    assert_eq!(
        next(&mut stream).await,
        TransportEvent::Status(ConnectionStatus::Connected)
    );

    // Kill the connection; the client reports the drop once, then comes
    // back on its own after the reconnect delay.
    drop(server);
    assert_eq!(
        next(&mut stream).await,
        TransportEvent::Status(ConnectionStatus::Disconnected)
    );

    let mut server = accept(&listener).await;
    assert_eq!(
        next(&mut stream).await,
        TransportEvent::Status(ConnectionStatus::Connected)
    );

    server.send(sensor_frame(31.0)).await.unwrap();
    match next(&mut stream).await {
        TransportEvent::Snapshot(snap) => assert_eq!(snap.temperature, 31.0),
        other => panic!("expected snapshot, got {other:?}"),
    }
}

#[tokio::test]
async fn should_skip_malformed_frames_without_dropping_connection() {
    let (listener, url) = bind().await;
    let mut stream = transport(url).open().await.unwrap();

    let mut server = accept(&listener).await;
    assert_eq!(
        next(&mut stream).await,
        TransportEvent::Status(ConnectionStatus::Connected)
    );

    server.send(Message::text("not json")).await.unwrap();
    server
        .send(Message::text(r#"{"type": "heartbeat", "data": {}}"#))
        .await
        .unwrap();
    server.send(sensor_frame(29.5)).await.unwrap();

    // Only the well-formed sensor_update makes it through.
    match next(&mut stream).await {
        TransportEvent::Snapshot(snap) => assert_eq!(snap.temperature, 29.5),
        other => panic!("expected snapshot, got {other:?}"),
    }
}

#[tokio::test]
async fn should_not_reconnect_when_closed_during_pending_delay() {
    let (listener, url) = bind().await;
    let mut stream = ReconnectingTransport::new(url)
        .with_reconnect_delay(Duration::from_millis(200))
        .open()
        .await
        .unwrap();

    let server = accept(&listener).await;
    assert_eq!(
        next(&mut stream).await,
        TransportEvent::Status(ConnectionStatus::Connected)
    );

    drop(server);
    assert_eq!(
        next(&mut stream).await,
        TransportEvent::Status(ConnectionStatus::Disconnected)
    );

    // Close while the reconnect sleep is still pending; the retry must
    // never happen.
    stream.close();
    let reconnected = tokio::time::timeout(Duration::from_millis(600), listener.accept()).await;
    assert!(reconnected.is_err(), "transport reconnected after close");
}

#[tokio::test]
async fn should_end_stream_after_close() {
    let (listener, url) = bind().await;
    let mut stream = transport(url).open().await.unwrap();

    let _server = accept(&listener).await;
    assert_eq!(
        next(&mut stream).await,
        TransportEvent::Status(ConnectionStatus::Connected)
    );

    stream.close();
    // close is idempotent
    stream.close();

    let ended = tokio::time::timeout(Duration::from_secs(5), async {
        while stream.next_event().await.is_some() {}
    })
    .await;
    assert!(ended.is_ok(), "stream kept delivering after close");
}
