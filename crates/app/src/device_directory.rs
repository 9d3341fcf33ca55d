//! Device directory — registry refresh and lifecycle pass-through.
//!
//! Device metadata is owned by the remote registry; this service forwards
//! lifecycle calls and keeps the local state store's entry set in step
//! with what the registry knows.

use std::sync::Arc;

use airhub_domain::device::{DeviceDescriptor, DeviceId};
use airhub_domain::error::AirHubError;

use crate::ports::control_plane::{ControlPlane, DevicePatch, NewDevice};
use crate::state_store::DeviceStateStore;

/// Registry facade over the control plane.
pub struct DeviceDirectory<C> {
    control: Arc<C>,
    store: Arc<DeviceStateStore>,
}

impl<C: ControlPlane> DeviceDirectory<C> {
    /// Create a directory over an injected control plane and store.
    pub fn new(control: Arc<C>, store: Arc<DeviceStateStore>) -> Self {
        Self { control, store }
    }

    /// Fetch the current registry and reconcile the store's entry set:
    /// new devices get tracked (seeded with the remote state), removed
    /// devices get dropped, surviving devices keep their local value.
    ///
    /// # Errors
    ///
    /// Propagates control-plane failures; the store is left untouched then.
    #[tracing::instrument(skip(self))]
    pub async fn refresh(&self) -> Result<Vec<DeviceDescriptor>, AirHubError> {
        let registered = self.control.list_devices().await?;
        self.store.sync_registry(
            registered
                .iter()
                .map(|r| (r.descriptor.id.clone(), r.is_on)),
        );
        Ok(registered.into_iter().map(|r| r.descriptor).collect())
    }

    /// Register a new device and start tracking its state locally.
    ///
    /// # Errors
    ///
    /// Propagates control-plane failures.
    #[tracing::instrument(skip(self, device), fields(device_name = %device.name))]
    pub async fn create(&self, device: NewDevice) -> Result<DeviceDescriptor, AirHubError> {
        let registered = self.control.create_device(device).await?;
        self.store
            .track(registered.descriptor.id.clone(), registered.is_on);
        Ok(registered.descriptor)
    }

    /// Update mutable metadata of a device.
    ///
    /// # Errors
    ///
    /// Propagates control-plane failures.
    #[tracing::instrument(skip(self, patch))]
    pub async fn update(
        &self,
        id: &DeviceId,
        patch: DevicePatch,
    ) -> Result<DeviceDescriptor, AirHubError> {
        let registered = self.control.update_device(id, patch).await?;
        Ok(registered.descriptor)
    }

    /// Remove a device and stop tracking it.
    ///
    /// # Errors
    ///
    /// Propagates control-plane failures; the entry stays tracked then.
    #[tracing::instrument(skip(self))]
    pub async fn remove(&self, id: &DeviceId) -> Result<(), AirHubError> {
        self.control.delete_device(id).await?;
        self.store.untrack(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::sync::Mutex;

    use airhub_domain::device::{DeviceDescriptor, DeviceKind};
    use airhub_domain::error::ControlPlaneError;
    use airhub_domain::snapshot::SensorSnapshot;

    use crate::ports::control_plane::RegisteredDevice;

    struct FakeRegistry {
        devices: Mutex<Vec<RegisteredDevice>>,
        fail: bool,
    }

    impl FakeRegistry {
        fn with(devices: Vec<RegisteredDevice>) -> Self {
            Self {
                devices: Mutex::new(devices),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                devices: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        fn error() -> AirHubError {
            ControlPlaneError {
                status: Some(503),
                message: "unavailable".to_string(),
            }
            .into()
        }
    }

    impl ControlPlane for FakeRegistry {
        fn fetch_latest(
            &self,
        ) -> impl Future<Output = Result<SensorSnapshot, AirHubError>> + Send {
            async { Ok(SensorSnapshot::new(28.0, 50.0, 20.0, false, 45)) }
        }
        fn list_devices(
            &self,
        ) -> impl Future<Output = Result<Vec<RegisteredDevice>, AirHubError>> + Send {
            let result = if self.fail {
                Err(Self::error())
            } else {
                Ok(self.devices.lock().unwrap().clone())
            };
            async { result }
        }
        fn create_device(
            &self,
            device: NewDevice,
        ) -> impl Future<Output = Result<RegisteredDevice, AirHubError>> + Send {
            let result = if self.fail {
                Err(Self::error())
            } else {
                let registered = RegisteredDevice {
                    descriptor: DeviceDescriptor::new(
                        DeviceId::new(format!("{}_01", device.kind)),
                        device.name,
                        device.kind,
                        device.automation_eligible,
                    ),
                    is_on: false,
                };
                self.devices.lock().unwrap().push(registered.clone());
                Ok(registered)
            };
            async { result }
        }
        fn update_device(
            &self,
            id: &DeviceId,
            patch: DevicePatch,
        ) -> impl Future<Output = Result<RegisteredDevice, AirHubError>> + Send {
            let result = if self.fail {
                Err(Self::error())
            } else {
                let mut devices = self.devices.lock().unwrap();
                let found = devices
                    .iter_mut()
                    .find(|r| &r.descriptor.id == id)
                    .map(|r| {
                        if let Some(name) = patch.name {
                            r.descriptor.name = name;
                        }
                        if let Some(eligible) = patch.automation_eligible {
                            r.descriptor.automation_eligible = eligible;
                        }
                        r.clone()
                    });
                found.ok_or_else(Self::error)
            };
            async { result }
        }
        fn delete_device(
            &self,
            id: &DeviceId,
        ) -> impl Future<Output = Result<(), AirHubError>> + Send {
            let result = if self.fail {
                Err(Self::error())
            } else {
                self.devices.lock().unwrap().retain(|r| &r.descriptor.id != id);
                Ok(())
            };
            async { result }
        }
        fn send_toggle(
            &self,
            _id: &DeviceId,
            _is_on: bool,
        ) -> impl Future<Output = Result<(), AirHubError>> + Send {
            async { Ok(()) }
        }
    }

    fn registered(id: &str, kind: DeviceKind, is_on: bool) -> RegisteredDevice {
        RegisteredDevice {
            descriptor: DeviceDescriptor::new(DeviceId::new(id), id.to_string(), kind, true),
            is_on,
        }
    }

    fn directory_with(
        registry: FakeRegistry,
    ) -> (DeviceDirectory<FakeRegistry>, Arc<DeviceStateStore>) {
        let store = Arc::new(DeviceStateStore::new(64));
        let directory = DeviceDirectory::new(Arc::new(registry), Arc::clone(&store));
        (directory, store)
    }

    #[tokio::test]
    async fn should_track_remote_devices_on_refresh() {
        let registry = FakeRegistry::with(vec![
            registered("fan_01", DeviceKind::Fan, true),
            registered("alarm_01", DeviceKind::Alarm, false),
        ]);
        let (directory, store) = directory_with(registry);

        let descriptors = directory.refresh().await.unwrap();
        assert_eq!(descriptors.len(), 2);
        assert_eq!(store.get(&DeviceId::new("fan_01")), Some(true));
        assert_eq!(store.get(&DeviceId::new("alarm_01")), Some(false));
    }

    #[tokio::test]
    async fn should_leave_store_untouched_when_refresh_fails() {
        let (directory, store) = directory_with(FakeRegistry::failing());
        store.track(DeviceId::new("fan_01"), true);

        let result = directory.refresh().await;
        assert!(matches!(result, Err(AirHubError::ControlPlane(_))));
        assert_eq!(store.get(&DeviceId::new("fan_01")), Some(true));
    }

    #[tokio::test]
    async fn should_track_created_device() {
        let (directory, store) = directory_with(FakeRegistry::with(Vec::new()));

        let descriptor = directory
            .create(NewDevice {
                name: "Bedroom Fan".to_string(),
                kind: DeviceKind::Fan,
                automation_eligible: true,
            })
            .await
            .unwrap();
        assert_eq!(store.get(&descriptor.id), Some(false));
    }

    #[tokio::test]
    async fn should_untrack_removed_device() {
        let registry = FakeRegistry::with(vec![registered("fan_01", DeviceKind::Fan, false)]);
        let (directory, store) = directory_with(registry);
        directory.refresh().await.unwrap();

        directory.remove(&DeviceId::new("fan_01")).await.unwrap();
        assert!(!store.is_tracked(&DeviceId::new("fan_01")));
    }

    #[tokio::test]
    async fn should_apply_patch_through_update() {
        let registry = FakeRegistry::with(vec![registered("fan_01", DeviceKind::Fan, false)]);
        let (directory, _store) = directory_with(registry);

        let descriptor = directory
            .update(
                &DeviceId::new("fan_01"),
                DevicePatch {
                    name: Some("Renamed".to_string()),
                    automation_eligible: Some(false),
                },
            )
            .await
            .unwrap();
        assert_eq!(descriptor.name, "Renamed");
        assert!(!descriptor.automation_eligible);
    }
}
