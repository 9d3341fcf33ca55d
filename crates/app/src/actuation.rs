//! Actuation gateway — optimistic manual toggles with revert-on-failure.
//!
//! A toggle applies the desired state locally first, then dispatches the
//! remote command. Remote failure is compensated by writing back the value
//! captured before the toggle and surfaced as a typed outcome, never as a
//! propagated network error.
//!
//! Overlapping toggles on the same device are not deduplicated or queued;
//! each call captures its own pre-toggle value, so interleaved failures
//! can restore a stale value. Known race, kept as-is.

use std::sync::Arc;

use airhub_domain::device::DeviceId;
use airhub_domain::error::{AirHubError, NotFoundError};

use crate::ports::ControlPlane;
use crate::state_store::{DeviceStateStore, WriteOrigin};

/// Result of a toggle attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The remote accepted the command; `is_on` is the new state.
    Confirmed { is_on: bool },
    /// The remote failed; the store was reverted to `is_on`.
    RolledBack { is_on: bool },
}

/// Manual actuation path: local optimistic write plus remote dispatch.
pub struct ActuationGateway<C> {
    control: Arc<C>,
    store: Arc<DeviceStateStore>,
}

impl<C: ControlPlane> ActuationGateway<C> {
    /// Create a gateway over an injected control plane and store.
    pub fn new(control: Arc<C>, store: Arc<DeviceStateStore>) -> Self {
        Self { control, store }
    }

    /// Toggle a device.
    ///
    /// # Errors
    ///
    /// Returns [`AirHubError::NotFound`] when the device is not tracked.
    /// Remote command failure is *not* an error — it comes back as
    /// [`ToggleOutcome::RolledBack`] after the local revert.
    #[tracing::instrument(skip(self))]
    pub async fn toggle(&self, device_id: &DeviceId) -> Result<ToggleOutcome, AirHubError> {
        let current = self.store.get(device_id).ok_or_else(|| NotFoundError {
            entity: "Device",
            id: device_id.to_string(),
        })?;
        let desired = !current;

        self.store.set(device_id, desired, WriteOrigin::Manual);

        match self.control.send_toggle(device_id, desired).await {
            Ok(()) => Ok(ToggleOutcome::Confirmed { is_on: desired }),
            Err(err) => {
                tracing::warn!(device_id = %device_id, error = %err, "remote toggle failed, reverting");
                self.store.set(device_id, current, WriteOrigin::Manual);
                Ok(ToggleOutcome::RolledBack { is_on: current })
            }
        }
    }
}
