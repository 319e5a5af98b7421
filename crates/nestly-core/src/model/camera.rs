// ── Camera domain types ──

use chrono::{DateTime, Utc};
use serde::Serialize;

use nestly_api::CameraProperties;

/// Name reported for a camera until its properties have been fetched.
pub const DEFAULT_CAMERA_NAME: &str = "Nest Camera";

/// Last-known camera state from the dropcam properties endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CameraState {
    pub uuid: String,
    pub name: String,
    pub location: Option<String>,
    pub is_online: bool,
    pub is_streaming: bool,
    pub battery_voltage: Option<f64>,
    pub ac_voltage: Option<f64>,
    pub data_tier: Option<i64>,
    pub synced_at: DateTime<Utc>,
}

impl CameraState {
    pub fn from_properties(uuid: &str, props: CameraProperties, now: DateTime<Utc>) -> Self {
        let data_tier = props.data_tier();
        Self {
            uuid: uuid.to_owned(),
            name: if props.name.is_empty() {
                DEFAULT_CAMERA_NAME.to_owned()
            } else {
                props.name
            },
            location: props.location,
            is_online: props.is_online,
            is_streaming: props.is_streaming,
            battery_voltage: props.rq_battery_battery_volt,
            ac_voltage: props.rq_battery_vbridge_volt,
            data_tier,
            synced_at: now,
        }
    }
}
