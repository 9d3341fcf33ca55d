//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside
//! world. They are defined here (in `app`) so that both the use-case layer
//! and the adapter layer can depend on them without creating circular
//! dependencies, and so tests can substitute fakes.

pub mod control_plane;
pub mod telemetry;

pub use control_plane::{ControlPlane, DevicePatch, NewDevice, RegisteredDevice};
pub use telemetry::{TelemetryConnector, TelemetryStream, TransportEvent};
