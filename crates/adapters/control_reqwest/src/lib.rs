//! HTTP implementation of the control-plane port.
//!
//! Talks to the station server's REST API with [`reqwest`]: one
//! point-in-time reading fetch plus the device registry CRUD and the
//! toggle command. Wire payloads are normalized in [`wire`] so the rest
//! of the workspace only ever sees domain types.

mod wire;

use std::time::Duration;

use serde::de::DeserializeOwned;
use url::Url;

use airhub_app::ports::control_plane::{ControlPlane, DevicePatch, NewDevice, RegisteredDevice};
use airhub_domain::device::DeviceId;
use airhub_domain::error::{AirHubError, ControlPlaneError};
use airhub_domain::snapshot::SensorSnapshot;

use crate::wire::{CreateDeviceBody, DeviceRecord, LatestEnvelope, ToggleBody, UpdateDeviceBody};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Control-plane client bound to one station.
pub struct RemoteControlPlane {
    http: reqwest::Client,
    base_url: Url,
    station_id: String,
}

impl RemoteControlPlane {
    /// Build a client with its own connection pool and a request timeout.
    ///
    /// # Errors
    ///
    /// Fails when the TLS backend cannot be initialized.
    pub fn new(base_url: Url, station_id: impl Into<String>) -> Result<Self, AirHubError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| ControlPlaneError {
                status: None,
                message: err.to_string(),
            })?;
        Ok(Self::with_client(http, base_url, station_id))
    }

    /// Build a client around a pre-configured [`reqwest::Client`].
    #[must_use]
    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        station_id: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url,
            station_id: station_id.into(),
        }
    }

    /// The station this client is scoped to.
    #[must_use]
    pub fn station_id(&self) -> &str {
        &self.station_id
    }

    fn endpoint(&self, path: &str) -> Result<Url, AirHubError> {
        let full = format!("{}/{path}", self.base_url.as_str().trim_end_matches('/'));
        Url::parse(&full).map_err(|err| {
            ControlPlaneError {
                status: None,
                message: format!("invalid endpoint {full}: {err}"),
            }
            .into()
        })
    }

    async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, AirHubError> {
        let status = expect_success(&resp)?;
        resp.json::<T>().await.map_err(|err| {
            ControlPlaneError {
                status: Some(status),
                message: format!("invalid response body: {err}"),
            }
            .into()
        })
    }
}

/// Map a reqwest transport failure into the typed control-plane error.
fn request_error(err: reqwest::Error) -> AirHubError {
    ControlPlaneError {
        status: err.status().map(|s| s.as_u16()),
        message: err.to_string(),
    }
    .into()
}

fn expect_success(resp: &reqwest::Response) -> Result<u16, AirHubError> {
    let status = resp.status();
    if status.is_success() {
        Ok(status.as_u16())
    } else {
        Err(ControlPlaneError {
            status: Some(status.as_u16()),
            message: format!("server answered {status}"),
        }
        .into())
    }
}

impl ControlPlane for RemoteControlPlane {
    async fn fetch_latest(&self) -> Result<SensorSnapshot, AirHubError> {
        let url = self.endpoint("data/latest")?;
        tracing::debug!(%url, station_id = %self.station_id, "fetching latest reading");
        let resp = self
            .http
            .get(url)
            .query(&[("station_id", self.station_id.as_str())])
            .send()
            .await
            .map_err(request_error)?;
        let envelope: LatestEnvelope = Self::read_json(resp).await?;
        Ok(envelope.data.into_snapshot())
    }

    async fn list_devices(&self) -> Result<Vec<RegisteredDevice>, AirHubError> {
        let url = self.endpoint("devices")?;
        tracing::debug!(%url, station_id = %self.station_id, "listing devices");
        let resp = self
            .http
            .get(url)
            .query(&[("station_id", self.station_id.as_str())])
            .send()
            .await
            .map_err(request_error)?;
        let records: Vec<DeviceRecord> = Self::read_json(resp).await?;
        Ok(records.into_iter().map(DeviceRecord::into_registered).collect())
    }

    async fn create_device(&self, device: NewDevice) -> Result<RegisteredDevice, AirHubError> {
        let url = self.endpoint("devices")?;
        let body = CreateDeviceBody::from_new(device, &self.station_id);
        tracing::debug!(%url, name = %body.name, "creating device");
        let resp = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(request_error)?;
        let record: DeviceRecord = Self::read_json(resp).await?;
        Ok(record.into_registered())
    }

    async fn update_device(
        &self,
        id: &DeviceId,
        patch: DevicePatch,
    ) -> Result<RegisteredDevice, AirHubError> {
        let url = self.endpoint(&format!("devices/{id}"))?;
        tracing::debug!(%url, device_id = %id, "updating device");
        let resp = self
            .http
            .put(url)
            .json(&UpdateDeviceBody::from_patch(patch))
            .send()
            .await
            .map_err(request_error)?;
        let record: DeviceRecord = Self::read_json(resp).await?;
        Ok(record.into_registered())
    }

    async fn delete_device(&self, id: &DeviceId) -> Result<(), AirHubError> {
        let url = self.endpoint(&format!("devices/{id}"))?;
        tracing::debug!(%url, device_id = %id, "deleting device");
        let resp = self.http.delete(url).send().await.map_err(request_error)?;
        expect_success(&resp)?;
        Ok(())
    }

    async fn send_toggle(&self, id: &DeviceId, is_on: bool) -> Result<(), AirHubError> {
        let url = self.endpoint(&format!("devices/{id}/toggle"))?;
        tracing::debug!(%url, device_id = %id, is_on, "dispatching toggle");
        let resp = self
            .http
            .put(url)
            .json(&ToggleBody { is_on })
            .send()
            .await
            .map_err(request_error)?;
        expect_success(&resp)?;
        Ok(())
    }
}
