//! Threshold engine — turns consecutive snapshot pairs into state changes.
//!
//! The engine owns the previous snapshot explicitly (no ambient global)
//! and a read-only registry of descriptors. Each new snapshot is compared
//! against the previous one; automation-eligible devices whose rule
//! crosses its boundary get an automatic write to the state store.
//! Devices without a rule are ignored — they can still be toggled
//! manually.

use std::sync::Arc;

use airhub_domain::device::{DeviceDescriptor, DeviceId};
use airhub_domain::rule::ThresholdRule;
use airhub_domain::snapshot::SensorSnapshot;

use crate::state_store::{DeviceStateStore, WriteOrigin};

/// One state change the engine applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChange {
    pub device_id: DeviceId,
    pub is_on: bool,
}

/// Edge-triggered automation engine.
pub struct ThresholdEngine {
    prev: Option<SensorSnapshot>,
    registry: Vec<DeviceDescriptor>,
    store: Arc<DeviceStateStore>,
}

impl ThresholdEngine {
    /// Create an engine with an empty registry.
    #[must_use]
    pub fn new(store: Arc<DeviceStateStore>) -> Self {
        Self {
            prev: None,
            registry: Vec::new(),
            store,
        }
    }

    /// Replace the device registry (refreshed on demand by the caller).
    pub fn set_registry(&mut self, registry: Vec<DeviceDescriptor>) {
        self.registry = registry;
    }

    /// Process one snapshot in arrival order.
    ///
    /// The very first snapshot only seeds the previous-snapshot state and
    /// produces no events. Afterwards, for every automation-eligible
    /// device whose rule crosses between the previous and current
    /// snapshot, the desired state is written to the store with automatic
    /// origin. Returns the changes that were actually applied.
    pub fn process(&mut self, curr: &SensorSnapshot) -> Vec<StateChange> {
        let Some(prev) = self.prev.replace(curr.clone()) else {
            return Vec::new();
        };

        let mut applied = Vec::new();
        for device in &self.registry {
            if !device.automation_eligible {
                continue;
            }
            let Some(rule) = ThresholdRule::for_kind(device.kind) else {
                continue;
            };

            let already_on = self.store.get(&device.id).unwrap_or(false);
            let desired = if rule.on_crossed(&prev, curr) && !already_on {
                Some(true)
            } else if rule.off_crossed(&prev, curr) && already_on {
                Some(false)
            } else {
                None
            };

            if let Some(is_on) = desired {
                if self.store.set(&device.id, is_on, WriteOrigin::Automatic) {
                    tracing::info!(device_id = %device.id, kind = %device.kind, is_on, "threshold crossing");
                    applied.push(StateChange {
                        device_id: device.id.clone(),
                        is_on,
                    });
                }
            }
        }
        applied
    }
}
