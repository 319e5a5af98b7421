// ── Client facade ──
//
// Owns one shared `Session` and hands out device handles built on it. Every
// handle from the same client shares credentials, cookies, and re-login.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use nestly_api::{BucketType, CameraSummary, Session};

use crate::config::ClientConfig;
use crate::device::{Camera, TemperatureSensor, Thermostat};
use crate::error::CoreError;

/// Ids of every device on the account, grouped by kind.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceInventory {
    pub thermostats: Vec<String>,
    pub sensors: Vec<String>,
    pub cameras: Vec<CameraSummary>,
}

/// Entry point for consumers.
///
/// Cheaply cloneable; clones share the session.
#[derive(Clone)]
pub struct NestClient {
    session: Arc<Session>,
}

impl NestClient {
    /// Build a client from configuration. Does not log in.
    pub fn new(config: ClientConfig) -> Result<Self, CoreError> {
        let transport = config.transport();
        let session = Session::new(config.auth.into(), config.endpoints, &transport, config.retry)?;
        Ok(Self::with_session(Arc::new(session)))
    }

    /// Wrap an existing session, e.g. one shared with other components.
    pub fn with_session(session: Arc<Session>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Log in now rather than on the first request.
    pub async fn connect(&self) -> Result<(), CoreError> {
        self.session.ensure_logged_in().await?;
        info!("connected to Nest");
        Ok(())
    }

    /// Abort every in-flight and future request made through this client.
    pub fn cancel(&self) {
        self.session.cancel();
    }

    // ── Discovery ────────────────────────────────────────────────────

    pub async fn thermostat_ids(&self) -> Result<Vec<String>, CoreError> {
        Ok(self.session.list_device_ids(BucketType::Device).await?)
    }

    pub async fn sensor_ids(&self) -> Result<Vec<String>, CoreError> {
        Ok(self.session.list_device_ids(BucketType::Kryptonite).await?)
    }

    pub async fn cameras(&self) -> Result<Vec<CameraSummary>, CoreError> {
        let session = &self.session;
        Ok(session
            .with_relogin("list cameras", || async {
                session.ensure_camera_login().await?;
                session.list_cameras().await
            })
            .await?)
    }

    /// Every thermostat, sensor, and camera on the account.
    pub async fn devices(&self) -> Result<DeviceInventory, CoreError> {
        Ok(DeviceInventory {
            thermostats: self.thermostat_ids().await?,
            sensors: self.sensor_ids().await?,
            cameras: self.cameras().await?,
        })
    }

    // ── Device handles ───────────────────────────────────────────────

    /// A synced thermostat handle.
    pub async fn thermostat(&self, device_id: &str) -> Result<Thermostat, CoreError> {
        Thermostat::connect(Arc::clone(&self.session), device_id).await
    }

    /// A synced temperature sensor handle.
    pub async fn temperature_sensor(&self, device_id: &str) -> Result<TemperatureSensor, CoreError> {
        TemperatureSensor::connect(Arc::clone(&self.session), device_id).await
    }

    /// A synced camera handle.
    pub async fn camera(&self, uuid: &str) -> Result<Camera, CoreError> {
        Camera::connect(Arc::clone(&self.session), uuid).await
    }
}
