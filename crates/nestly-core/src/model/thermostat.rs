// ── Thermostat domain types ──

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use nestly_api::models::{DeviceBucket, SharedBucket};
use nestly_api::{AppLaunchResponse, BucketType};

/// Eco modes that override the shared bucket's mode.
const ECO_MODES: [&str; 2] = ["manual-eco", "auto-eco"];

/// Operating mode, as written to `target_temperature_type`.
///
/// `Eco` is never written as a mode; it is derived from the device bucket and
/// toggled through the eco setting.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::VariantNames,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ThermostatMode {
    Off,
    Heat,
    Cool,
    /// Heat-cool: keep between the low and high setpoints.
    Range,
    Eco,
}

/// What the HVAC equipment is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum HvacAction {
    Off,
    Heating,
    Cooling,
}

/// Last-known thermostat state, merged from `shared.<id>` and `device.<id>`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThermostatState {
    pub device_id: String,
    pub current_temperature: f64,
    pub target_temperature: f64,
    pub target_temperature_low: f64,
    pub target_temperature_high: f64,
    /// `None` when the service reports a mode this client does not know.
    pub mode: Option<ThermostatMode>,
    pub action: HvacAction,
    pub can_heat: bool,
    pub can_cool: bool,
    pub has_fan: bool,
    /// Fan timer still running at sync time.
    pub fan: bool,
    /// When the fan timer ends; `None` if it was never set.
    pub fan_timer_timeout: Option<DateTime<Utc>>,
    pub current_humidity: f64,
    pub eco: bool,
    /// Unix time (seconds) the target temperature is expected to be
    /// reached, as stored in the bucket; 0 when no estimate exists.
    pub time_to_target: i64,
    pub compressor_lockout_enabled: bool,
    /// Unix time (seconds) the compressor lockout ends.
    pub compressor_lockout_timeout: i64,
    pub synced_at: DateTime<Utc>,
}

impl ThermostatState {
    /// Build a fresh state from one `app_launch` response.
    ///
    /// Only buckets keyed exactly `shared.<device_id>` and `device.<id>` are
    /// read; everything else is skipped. Both must be present and complete,
    /// otherwise a decode error is returned and nothing is produced.
    pub fn from_launch(
        device_id: &str,
        launch: &AppLaunchResponse,
        now: DateTime<Utc>,
    ) -> Result<Self, nestly_api::Error> {
        let shared: SharedBucket = launch
            .buckets_for(BucketType::Shared, device_id)
            .last()
            .ok_or_else(|| nestly_api::Error::decode(format!("no shared.{device_id} bucket")))?
            .decode()?;
        let device: DeviceBucket = launch
            .buckets_for(BucketType::Device, device_id)
            .last()
            .ok_or_else(|| nestly_api::Error::decode(format!("no device.{device_id} bucket")))?
            .decode()?;

        Ok(Self::merge(device_id, &shared, &device, now))
    }

    /// Combine the two bucket records.
    pub fn merge(
        device_id: &str,
        shared: &SharedBucket,
        device: &DeviceBucket,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            device_id: device_id.to_owned(),
            current_temperature: shared.current_temperature,
            target_temperature: shared.target_temperature,
            target_temperature_low: shared.target_temperature_low,
            target_temperature_high: shared.target_temperature_high,
            mode: derive_mode(&shared.target_temperature_type, &device.eco.mode),
            action: derive_action(shared.hvac_ac_state, shared.hvac_heater_state),
            can_heat: shared.can_heat,
            can_cool: shared.can_cool,
            has_fan: device.has_fan,
            fan: fan_active(device.fan_timer_timeout, now.timestamp()),
            fan_timer_timeout: (device.fan_timer_timeout > 0)
                .then(|| DateTime::from_timestamp(device.fan_timer_timeout, 0))
                .flatten(),
            current_humidity: device.current_humidity,
            eco: is_eco(&device.eco.mode),
            time_to_target: device.time_to_target,
            compressor_lockout_enabled: shared.compressor_lockout_enabled,
            compressor_lockout_timeout: shared.compressor_lockout_timeout,
            synced_at: now,
        }
    }
}

// ── Derivations ──────────────────────────────────────────────────────

fn is_eco(eco_mode: &str) -> bool {
    ECO_MODES.contains(&eco_mode)
}

/// Eco (`manual-eco` / `auto-eco`) wins over `target_temperature_type`.
pub fn derive_mode(target_temperature_type: &str, eco_mode: &str) -> Option<ThermostatMode> {
    if is_eco(eco_mode) {
        return Some(ThermostatMode::Eco);
    }
    match target_temperature_type.parse() {
        Ok(mode) => Some(mode),
        Err(_) => {
            warn!(target_temperature_type, "unrecognised thermostat mode");
            None
        }
    }
}

/// Cooling takes priority over heating.
pub fn derive_action(hvac_ac_state: bool, hvac_heater_state: bool) -> HvacAction {
    if hvac_ac_state {
        HvacAction::Cooling
    } else if hvac_heater_state {
        HvacAction::Heating
    } else {
        HvacAction::Off
    }
}

/// The fan runs while its timer ends strictly after `now` (Unix seconds).
pub fn fan_active(fan_timer_timeout: i64, now: i64) -> bool {
    fan_timer_timeout > now
}
