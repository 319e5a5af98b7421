// Wire types for the Nest session, bucket store, and camera APIs.
//
// Bucket records use required fields: a missing key fails decoding, which is
// treated as a stale session. Camera listings use `#[serde(default)]`; their
// field set varies across camera models.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::sync::BucketType;

// ── Authentication ───────────────────────────────────────────────────

/// `POST /session` response.
#[derive(Debug, Deserialize)]
pub(crate) struct PasswordLoginResponse {
    pub userid: String,
    pub access_token: String,
}

/// Google `issue_token` response.
#[derive(Debug, Deserialize)]
pub(crate) struct IssueTokenResponse {
    pub access_token: String,
}

/// Auth-proxy `issue_jwt` response: `{ claims.subject.nestId.id, jwt }`.
#[derive(Debug, Deserialize)]
pub(crate) struct JwtResponse {
    pub claims: JwtClaims,
    pub jwt: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JwtClaims {
    pub subject: JwtSubject,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JwtSubject {
    #[serde(rename = "nestId")]
    pub nest_id: NestId,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NestId {
    pub id: String,
}

// ── Bucket store ─────────────────────────────────────────────────────

/// `POST /api/0.1/user/{id}/app_launch` response.
#[derive(Debug, Clone, Deserialize)]
pub struct AppLaunchResponse {
    #[serde(default)]
    pub service_urls: Option<ServiceUrls>,
    pub updated_buckets: Vec<Bucket>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceUrls {
    pub urls: ServiceUrlSet,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceUrlSet {
    pub czfe_url: String,
}

impl AppLaunchResponse {
    /// The command-write host advertised by this response.
    pub fn czfe_url(&self) -> Result<&str, Error> {
        self.service_urls
            .as_ref()
            .map(|s| s.urls.czfe_url.as_str())
            .ok_or_else(|| Error::decode("app_launch response lacks service_urls.urls.czfe_url"))
    }

    /// Buckets addressed to `{namespace}.{device_id}`, in response order.
    pub fn buckets_for<'a>(
        &'a self,
        namespace: BucketType,
        device_id: &'a str,
    ) -> impl Iterator<Item = &'a Bucket> + 'a {
        self.updated_buckets
            .iter()
            .filter(move |b| b.belongs_to(namespace, device_id))
    }
}

/// One versioned slice of remote state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub object_key: String,
    #[serde(default)]
    pub object_revision: Option<i64>,
    #[serde(default)]
    pub object_timestamp: Option<i64>,
    pub value: serde_json::Value,
}

impl Bucket {
    /// Split the key into `(namespace, id)`.
    pub fn key_parts(&self) -> Option<(&str, &str)> {
        self.object_key.split_once('.')
    }

    /// Whether this bucket is `{namespace}.{device_id}` exactly.
    pub fn belongs_to(&self, namespace: BucketType, device_id: &str) -> bool {
        matches!(self.key_parts(), Some((ns, id)) if ns == namespace.as_ref() && id == device_id)
    }

    /// Decode the bucket value into a typed record.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, Error> {
        T::deserialize(&self.value)
            .map_err(|e| Error::decode(format!("bucket {}: {e}", self.object_key)))
    }
}

/// `shared.<id>`: setpoints, HVAC state, and capabilities.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SharedBucket {
    pub current_temperature: f64,
    pub target_temperature: f64,
    pub target_temperature_low: f64,
    pub target_temperature_high: f64,
    pub target_temperature_type: String,
    pub hvac_ac_state: bool,
    pub hvac_heater_state: bool,
    pub can_heat: bool,
    pub can_cool: bool,
    pub compressor_lockout_enabled: bool,
    pub compressor_lockout_timeout: i64,
}

/// `device.<id>`: fan timer, humidity, and eco settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeviceBucket {
    pub time_to_target: i64,
    pub fan_timer_timeout: i64,
    pub has_fan: bool,
    pub current_humidity: f64,
    pub eco: EcoSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EcoSettings {
    pub mode: String,
}

/// `kryptonite.<id>`: remote temperature sensor.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct KryptoniteBucket {
    pub current_temperature: f64,
    pub battery_level: f64,
}

/// The `buckets.<user>` index listing every object key on the account.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct BucketIndex {
    pub buckets: Vec<String>,
}

// ── Cameras ──────────────────────────────────────────────────────────

/// One element of `GET /dropcam/api/cameras/{id}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CameraProperties {
    pub name: String,
    pub is_online: bool,
    pub is_streaming: bool,
    pub location: Option<String>,
    pub rq_battery_battery_volt: Option<f64>,
    pub rq_battery_vbridge_volt: Option<f64>,
    pub properties: serde_json::Map<String, serde_json::Value>,
}

impl CameraProperties {
    /// `streaming.data-usage-tier` from the nested property map.
    pub fn data_tier(&self) -> Option<i64> {
        self.properties
            .get("streaming.data-usage-tier")
            .and_then(serde_json::Value::as_i64)
    }
}

/// Camera entry from `cameras.get_owned_and_member_of_with_properties`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraSummary {
    pub uuid: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub is_online: Option<bool>,
    #[serde(default)]
    pub is_streaming: Option<bool>,
    #[serde(default, rename = "where")]
    pub location: Option<String>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// `{ "items": [...] }` envelope used by the camera web API.
#[derive(Debug, Deserialize)]
pub(crate) struct ItemsEnvelope<T> {
    pub items: Vec<T>,
}
