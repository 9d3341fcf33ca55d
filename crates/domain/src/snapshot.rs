//! Sensor snapshot — one immutable, timestamped reading of all tracked
//! environmental metrics.
//!
//! A new snapshot always *replaces* the previous one; nothing ever mutates
//! a snapshot in place. Threshold rules are evaluated over consecutive
//! `(previous, current)` snapshot pairs.

use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// One reading of every tracked environmental metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSnapshot {
    /// Ambient temperature in °C.
    pub temperature: f64,
    /// Relative humidity in %.
    pub humidity: f64,
    /// Fine particulate density in µg/m³.
    pub pm25: f64,
    /// Whether combustible gas or smoke is currently detected.
    pub gas_detected: bool,
    /// Air-quality index.
    pub aqi: i64,
    /// When this reading was observed.
    pub observed_at: Timestamp,
}

impl SensorSnapshot {
    /// Build a snapshot observed now.
    #[must_use]
    pub fn new(temperature: f64, humidity: f64, pm25: f64, gas_detected: bool, aqi: i64) -> Self {
        Self {
            temperature,
            humidity,
            pm25,
            gas_detected,
            aqi,
            observed_at: crate::time::now(),
        }
    }

    /// Whether the two snapshots carry the same metric values,
    /// ignoring the observation time.
    #[must_use]
    pub fn same_readings(&self, other: &Self) -> bool {
        self.temperature == other.temperature
            && self.humidity == other.humidity
            && self.pm25 == other.pm25
            && self.gas_detected == other.gas_detected
            && self.aqi == other.aqi
    }
}

/// Connectivity of the live telemetry source.
///
/// Status reflects the last *completed* attempt; it does not flicker on
/// every retry of the reconnect loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    /// A fetch or stream message has succeeded.
    Connected,
    /// The last fetch failed or the stream dropped.
    Disconnected,
    /// No attempt has completed yet.
    Checking,
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connected => f.write_str("connected"),
            Self::Disconnected => f.write_str("disconnected"),
            Self::Checking => f.write_str("checking"),
        }
    }
}
