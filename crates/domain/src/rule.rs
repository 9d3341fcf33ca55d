//! Threshold rules — edge-triggered crossing predicates keyed by device kind.
//!
//! A rule is a pure function of two *consecutive* snapshots. It fires on
//! the transition across its boundary value, never while a value merely
//! remains on one side of it: a device already on because of automation is
//! not re-toggled while the metric stays on the "on" side across ticks.

use crate::device::DeviceKind;
use crate::snapshot::SensorSnapshot;

/// Temperature above which a fan turns on (°C).
pub const FAN_TEMPERATURE: f64 = 30.0;
/// Humidity below which a humidifier turns on (%).
pub const HUMIDIFIER_HUMIDITY: f64 = 40.0;
/// Particulate density above which a purifier turns on (µg/m³).
pub const PURIFIER_PM25: f64 = 35.0;
/// Raw gas-sensor reading above which gas counts as detected.
///
/// This is a wire-normalization boundary, not a rule of its own: both
/// transports apply it when mapping `air_value` into `gas_detected`.
pub const GAS_AIR_VALUE: f64 = 300.0;

/// The metric condition a rule watches.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Condition {
    TemperatureAbove(f64),
    HumidityBelow(f64),
    Pm25Above(f64),
    GasDetected,
}

/// Edge-triggered threshold rule for one device kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdRule {
    condition: Condition,
}

impl ThresholdRule {
    /// Look up the canonical rule for a device kind.
    ///
    /// [`DeviceKind::Custom`] has no rule: such devices are ignored by the
    /// threshold engine and only toggled manually.
    #[must_use]
    pub fn for_kind(kind: DeviceKind) -> Option<Self> {
        let condition = match kind {
            DeviceKind::Fan => Condition::TemperatureAbove(FAN_TEMPERATURE),
            DeviceKind::Humidifier => Condition::HumidityBelow(HUMIDIFIER_HUMIDITY),
            DeviceKind::Purifier => Condition::Pm25Above(PURIFIER_PM25),
            DeviceKind::Alarm => Condition::GasDetected,
            DeviceKind::Custom => return None,
        };
        Some(Self { condition })
    }

    /// Whether the snapshot sits on the "on" side of the boundary.
    fn active(&self, snapshot: &SensorSnapshot) -> bool {
        match self.condition {
            Condition::TemperatureAbove(limit) => snapshot.temperature > limit,
            Condition::HumidityBelow(limit) => snapshot.humidity < limit,
            Condition::Pm25Above(limit) => snapshot.pm25 > limit,
            Condition::GasDetected => snapshot.gas_detected,
        }
    }

    /// True only when the metric crosses onto the "on" side between
    /// `prev` and `curr`.
    #[must_use]
    pub fn on_crossed(&self, prev: &SensorSnapshot, curr: &SensorSnapshot) -> bool {
        !self.active(prev) && self.active(curr)
    }

    /// True only when the metric crosses back off the "on" side between
    /// `prev` and `curr`.
    #[must_use]
    pub fn off_crossed(&self, prev: &SensorSnapshot, curr: &SensorSnapshot) -> bool {
        self.active(prev) && !self.active(curr)
    }
}
