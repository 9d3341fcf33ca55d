//! # airhub-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `ControlPlane` — remote device registry and command dispatch
//!   - `TelemetryConnector` — streaming telemetry with reconnect handled below
//! - Provide the core automation pipeline:
//!   - `DeviceStateStore` — authoritative local on/off ledger with subscribe/notify
//!   - `ThresholdEngine` — edge-triggered crossing detection over snapshot pairs
//!   - `ActuationGateway` — optimistic manual toggles with revert-on-failure
//!   - `TelemetryIngestor` — live/simulation snapshot sourcing with clean teardown
//!   - `DeviceDirectory` — registry refresh and device lifecycle pass-through
//! - Orchestrate domain objects without knowing *how* the network works
//!
//! ## Dependency rule
//! Depends on `airhub-domain` only (plus `tokio::sync`/`tokio::time` for
//! channels and timers). Never imports adapter crates. Adapters depend on
//! *this* crate, not the reverse.

pub mod actuation;
pub mod device_directory;
pub mod ingestor;
pub mod ports;
pub mod simulation;
pub mod state_store;
pub mod threshold_engine;
