// ── Temperature sensor domain types ──

use chrono::{DateTime, Utc};
use serde::Serialize;

use nestly_api::models::KryptoniteBucket;
use nestly_api::{AppLaunchResponse, BucketType};

/// Last-known state of a remote temperature sensor (`kryptonite.<id>`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperatureSensorState {
    pub device_id: String,
    pub current_temperature: f64,
    pub battery_level: f64,
    pub synced_at: DateTime<Utc>,
}

impl TemperatureSensorState {
    /// Build a fresh state from the sensor's own bucket; other keys are skipped.
    pub fn from_launch(
        device_id: &str,
        launch: &AppLaunchResponse,
        now: DateTime<Utc>,
    ) -> Result<Self, nestly_api::Error> {
        let bucket: KryptoniteBucket = launch
            .buckets_for(BucketType::Kryptonite, device_id)
            .last()
            .ok_or_else(|| {
                nestly_api::Error::decode(format!("no kryptonite.{device_id} bucket"))
            })?
            .decode()?;

        Ok(Self {
            device_id: device_id.to_owned(),
            current_temperature: bucket.current_temperature,
            battery_level: bucket.battery_level,
            synced_at: now,
        })
    }
}
