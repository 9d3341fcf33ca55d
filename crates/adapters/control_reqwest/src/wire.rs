//! Wire representations of the station server's JSON payloads.
//!
//! The server speaks in raw sensor values (`dust_density`, `air_value`)
//! and flat device records; everything is normalized into domain types at
//! this boundary so nothing downstream ever sees a wire field name.

use serde::{Deserialize, Serialize};

use airhub_app::ports::control_plane::{DevicePatch, NewDevice, RegisteredDevice};
use airhub_domain::device::{DeviceDescriptor, DeviceId, DeviceKind};
use airhub_domain::rule::GAS_AIR_VALUE;
use airhub_domain::snapshot::SensorSnapshot;

/// Envelope of `GET /data/latest`: `{ "status": "...", "data": { ... } }`.
#[derive(Debug, Deserialize)]
pub(crate) struct LatestEnvelope {
    #[allow(dead_code)]
    pub status: String,
    pub data: RawReading,
}

/// One raw reading as the station reports it.
#[derive(Debug, Deserialize)]
pub(crate) struct RawReading {
    pub temperature: f64,
    pub humidity: f64,
    pub dust_density: f64,
    pub air_value: f64,
    /// Stations without an AQI sensor omit the field.
    #[serde(default)]
    pub aqi: i64,
}

impl RawReading {
    /// Normalize into a snapshot observed now.
    pub(crate) fn into_snapshot(self) -> SensorSnapshot {
        SensorSnapshot::new(
            self.temperature,
            self.humidity,
            self.dust_density,
            self.air_value > GAS_AIR_VALUE,
            self.aqi,
        )
    }
}

/// A device record as the registry returns it.
#[derive(Debug, Deserialize)]
pub(crate) struct DeviceRecord {
    pub device_id: String,
    #[allow(dead_code)]
    pub station_id: String,
    pub name: String,
    /// Server-side display hints; the core resolves its own icon tag
    /// from the device kind instead.
    #[allow(dead_code)]
    #[serde(default)]
    pub icon: String,
    #[allow(dead_code)]
    #[serde(default)]
    pub color: String,
    pub device_type: String,
    pub is_on: bool,
    pub auto_control_enabled: bool,
    #[allow(dead_code)]
    #[serde(default)]
    pub created_at: Option<String>,
    #[allow(dead_code)]
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl DeviceRecord {
    /// Normalize into the port's registered-device shape. Unknown
    /// `device_type` values resolve to the custom kind.
    pub(crate) fn into_registered(self) -> RegisteredDevice {
        let kind = DeviceKind::parse(&self.device_type);
        RegisteredDevice {
            descriptor: DeviceDescriptor::new(
                DeviceId::new(self.device_id),
                self.name,
                kind,
                self.auto_control_enabled,
            ),
            is_on: self.is_on,
        }
    }
}

/// Body of `POST /devices`.
#[derive(Debug, Serialize)]
pub(crate) struct CreateDeviceBody {
    pub station_id: String,
    pub name: String,
    pub icon: &'static str,
    pub color: &'static str,
    pub device_type: String,
    pub auto_control_enabled: bool,
}

impl CreateDeviceBody {
    pub(crate) fn from_new(device: NewDevice, station_id: &str) -> Self {
        Self {
            station_id: station_id.to_string(),
            name: device.name,
            icon: icon_name(device.kind),
            color: default_color(device.kind),
            device_type: device.kind.to_string(),
            auto_control_enabled: device.automation_eligible,
        }
    }
}

/// Body of `PUT /devices/{id}`; absent fields are left untouched.
#[derive(Debug, Serialize)]
pub(crate) struct UpdateDeviceBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_control_enabled: Option<bool>,
}

impl UpdateDeviceBody {
    pub(crate) fn from_patch(patch: DevicePatch) -> Self {
        Self {
            name: patch.name,
            auto_control_enabled: patch.automation_eligible,
        }
    }
}

/// Body of `PUT /devices/{id}/toggle`.
#[derive(Debug, Serialize)]
pub(crate) struct ToggleBody {
    pub is_on: bool,
}

fn icon_name(kind: DeviceKind) -> &'static str {
    match kind {
        DeviceKind::Fan => "fan",
        DeviceKind::Humidifier => "droplets",
        DeviceKind::Purifier => "wind",
        DeviceKind::Alarm => "flame",
        DeviceKind::Custom => "zap",
    }
}

fn default_color(kind: DeviceKind) -> &'static str {
    match kind {
        DeviceKind::Fan => "#3b82f6",
        DeviceKind::Humidifier => "#06b6d4",
        DeviceKind::Purifier => "#10b981",
        DeviceKind::Alarm => "#ef4444",
        DeviceKind::Custom => "#8b5cf6",
    }
}
