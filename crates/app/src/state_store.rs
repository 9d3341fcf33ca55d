//! Device state store — the authoritative local on/off ledger.
//!
//! One boolean per known device id, never partial. All value writes go
//! through [`DeviceStateStore::set`], which applies them in arrival order
//! and notifies subscribers only when the value actually changed. The
//! store holds no precedence policy between manual and automatic origins;
//! that lives at the call sites.

use std::collections::HashMap;
use std::sync::Mutex;

use tokio::sync::broadcast;

use airhub_domain::device::DeviceId;

/// Who requested a state write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOrigin {
    /// A user-initiated toggle (or its revert).
    Manual,
    /// The threshold engine.
    Automatic,
}

/// Notification for an applied value change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChanged {
    pub device_id: DeviceId,
    pub is_on: bool,
    pub origin: WriteOrigin,
}

/// Local ledger of every known device's on/off state.
///
/// The lock is only ever held across plain map operations, so no two
/// mutations interleave at sub-operation granularity.
pub struct DeviceStateStore {
    states: Mutex<HashMap<DeviceId, bool>>,
    notifier: broadcast::Sender<StateChanged>,
}

impl DeviceStateStore {
    /// Create an empty store with the given notification capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (notifier, _) = broadcast::channel(capacity);
        Self {
            states: Mutex::new(HashMap::new()),
            notifier,
        }
    }

    /// Current state of a device, `None` if the device is not tracked.
    #[must_use]
    pub fn get(&self, id: &DeviceId) -> Option<bool> {
        self.states.lock().expect("state lock poisoned").get(id).copied()
    }

    /// Whether the device has an entry.
    #[must_use]
    pub fn is_tracked(&self, id: &DeviceId) -> bool {
        self.states.lock().expect("state lock poisoned").contains_key(id)
    }

    /// Apply a value write. The single mutation entry point for state
    /// values: overwrites unconditionally, returns whether the value
    /// changed, and notifies subscribers only on change.
    ///
    /// Writes to untracked ids are dropped with a diagnostic — entries are
    /// created and removed by the registry lifecycle, not by value writes.
    pub fn set(&self, id: &DeviceId, is_on: bool, origin: WriteOrigin) -> bool {
        let changed = {
            let mut states = self.states.lock().expect("state lock poisoned");
            match states.get_mut(id) {
                Some(slot) if *slot == is_on => false,
                Some(slot) => {
                    *slot = is_on;
                    true
                }
                None => {
                    tracing::warn!(device_id = %id, "dropping write for untracked device");
                    return false;
                }
            }
        };
        if changed {
            // Send fails only with zero receivers, which is fine.
            let _ = self.notifier.send(StateChanged {
                device_id: id.clone(),
                is_on,
                origin,
            });
        }
        changed
    }

    /// Subscribe to applied value changes.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StateChanged> {
        self.notifier.subscribe()
    }

    /// Reconcile tracked entries with the current registry: create entries
    /// for newly observed devices (seeded with the remote value), drop
    /// entries for removed devices, and keep locally-known values for
    /// devices that persist.
    pub fn sync_registry<I>(&self, known: I)
    where
        I: IntoIterator<Item = (DeviceId, bool)>,
    {
        let mut states = self.states.lock().expect("state lock poisoned");
        let mut next: HashMap<DeviceId, bool> = HashMap::new();
        for (id, remote_is_on) in known {
            let value = states.get(&id).copied().unwrap_or(remote_is_on);
            next.insert(id, value);
        }
        *states = next;
    }

    /// Start tracking a single device (e.g. after creation).
    pub fn track(&self, id: DeviceId, initial_is_on: bool) {
        self.states
            .lock()
            .expect("state lock poisoned")
            .entry(id)
            .or_insert(initial_is_on);
    }

    /// Stop tracking a single device (e.g. after deletion).
    pub fn untrack(&self, id: &DeviceId) {
        self.states.lock().expect("state lock poisoned").remove(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(entries: &[(&str, bool)]) -> DeviceStateStore {
        let store = DeviceStateStore::new(16);
        store.sync_registry(
            entries
                .iter()
                .map(|(id, on)| (DeviceId::new(*id), *on)),
        );
        store
    }

    #[test]
    fn should_seed_entries_from_registry_sync() {
        let store = store_with(&[("fan_01", true), ("alarm_01", false)]);
        assert_eq!(store.get(&DeviceId::new("fan_01")), Some(true));
        assert_eq!(store.get(&DeviceId::new("alarm_01")), Some(false));
        assert_eq!(store.get(&DeviceId::new("ghost")), None);
    }

    #[test]
    fn should_apply_writes_in_arrival_order() {
        let store = store_with(&[("fan_01", false)]);
        let id = DeviceId::new("fan_01");

        assert!(store.set(&id, true, WriteOrigin::Automatic));
        assert!(store.set(&id, false, WriteOrigin::Manual));
        // last-applied value is current truth, regardless of origin
        assert_eq!(store.get(&id), Some(false));
    }

    #[test]
    fn should_not_notify_when_value_unchanged() {
        let store = store_with(&[("fan_01", false)]);
        let id = DeviceId::new("fan_01");
        let mut rx = store.subscribe();

        assert!(!store.set(&id, false, WriteOrigin::Manual));
        assert!(rx.try_recv().is_err());

        assert!(store.set(&id, true, WriteOrigin::Manual));
        let change = rx.try_recv().unwrap();
        assert_eq!(change.device_id, id);
        assert!(change.is_on);
        assert_eq!(change.origin, WriteOrigin::Manual);
    }

    #[test]
    fn should_drop_writes_for_untracked_devices() {
        let store = store_with(&[]);
        let id = DeviceId::new("ghost");
        let mut rx = store.subscribe();

        assert!(!store.set(&id, true, WriteOrigin::Manual));
        assert_eq!(store.get(&id), None);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn should_keep_local_values_across_registry_resync() {
        let store = store_with(&[("fan_01", false)]);
        let id = DeviceId::new("fan_01");
        store.set(&id, true, WriteOrigin::Manual);

        // Remote still claims off; local truth survives the refresh.
        store.sync_registry([(id.clone(), false)]);
        assert_eq!(store.get(&id), Some(true));
    }

    #[test]
    fn should_drop_entries_removed_from_registry() {
        let store = store_with(&[("fan_01", true), ("old_01", true)]);
        store.sync_registry([(DeviceId::new("fan_01"), true)]);
        assert!(store.is_tracked(&DeviceId::new("fan_01")));
        assert!(!store.is_tracked(&DeviceId::new("old_01")));
    }

    #[test]
    fn should_track_and_untrack_single_devices() {
        let store = store_with(&[]);
        let id = DeviceId::new("new_01");

        store.track(id.clone(), true);
        assert_eq!(store.get(&id), Some(true));

        // tracking again does not clobber the known value
        store.track(id.clone(), false);
        assert_eq!(store.get(&id), Some(true));

        store.untrack(&id);
        assert_eq!(store.get(&id), None);
    }
}
