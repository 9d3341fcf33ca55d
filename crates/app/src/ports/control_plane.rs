//! Control-plane port — remote device registry and command dispatch.
//!
//! The remote control plane is the source of truth for device records and
//! the destination for actuator commands. Request failures come back as
//! typed errors; the call sites (gateway, directory, ingestor) decide how
//! to compensate — they never let a network error escape as a panic.

use std::future::Future;

use airhub_domain::device::{DeviceDescriptor, DeviceId, DeviceKind};
use airhub_domain::error::AirHubError;
use airhub_domain::snapshot::SensorSnapshot;

/// A device record as the remote registry knows it: the read-only
/// descriptor plus the remote on/off truth at fetch time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredDevice {
    pub descriptor: DeviceDescriptor,
    pub is_on: bool,
}

/// Payload for registering a new device.
#[derive(Debug, Clone)]
pub struct NewDevice {
    pub name: String,
    pub kind: DeviceKind,
    pub automation_eligible: bool,
}

/// Partial update for an existing device. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct DevicePatch {
    pub name: Option<String>,
    pub automation_eligible: Option<bool>,
}

/// Remote registry and command dispatch.
///
/// This is a **port** — the `control_reqwest` adapter provides the HTTP
/// implementation; tests provide in-memory fakes.
pub trait ControlPlane: Send + Sync {
    /// One point-in-time fetch of the latest sensor reading.
    fn fetch_latest(&self) -> impl Future<Output = Result<SensorSnapshot, AirHubError>> + Send;

    /// Fetch all registered devices for the configured station.
    fn list_devices(
        &self,
    ) -> impl Future<Output = Result<Vec<RegisteredDevice>, AirHubError>> + Send;

    /// Register a new device.
    fn create_device(
        &self,
        device: NewDevice,
    ) -> impl Future<Output = Result<RegisteredDevice, AirHubError>> + Send;

    /// Update mutable metadata of an existing device.
    fn update_device(
        &self,
        id: &DeviceId,
        patch: DevicePatch,
    ) -> impl Future<Output = Result<RegisteredDevice, AirHubError>> + Send;

    /// Remove a device from the registry.
    fn delete_device(&self, id: &DeviceId) -> impl Future<Output = Result<(), AirHubError>> + Send;

    /// Dispatch an on/off command for a device.
    fn send_toggle(
        &self,
        id: &DeviceId,
        is_on: bool,
    ) -> impl Future<Output = Result<(), AirHubError>> + Send;
}
