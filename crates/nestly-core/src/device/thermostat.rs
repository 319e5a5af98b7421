// ── Thermostat ──
//
// Reads come from `app_launch` with the `shared` and `device` bucket types;
// writes are single MERGE patches against `shared.<id>` (setpoints, mode) or
// `device.<id>` (fan, eco). Writes never touch the local state: the change
// shows up on the next sync.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tracing::{debug, info};
use url::Url;

use nestly_api::{BucketPatch, BucketType, Session};

use crate::error::CoreError;
use crate::model::{ThermostatMode, ThermostatState};

const ECO_ON: &str = "manual-eco";
const ECO_OFF: &str = "schedule";

/// A single thermostat backed by a (possibly shared) session.
///
/// Operations on one thermostat run one at a time; reads of the last synced
/// state never wait.
pub struct Thermostat {
    session: Arc<Session>,
    device_id: String,
    state: ArcSwapOption<ThermostatState>,
    czfe_url: ArcSwapOption<Url>,
    op_lock: Mutex<()>,
}

impl Thermostat {
    /// Create an unsynced handle. Commands fail with `NotSynced` until
    /// [`sync`](Self::sync) has succeeded once.
    pub fn new(session: Arc<Session>, device_id: impl Into<String>) -> Self {
        Self {
            session,
            device_id: device_id.into(),
            state: ArcSwapOption::empty(),
            czfe_url: ArcSwapOption::empty(),
            op_lock: Mutex::new(()),
        }
    }

    /// Create a handle and run the initial sync.
    pub async fn connect(
        session: Arc<Session>,
        device_id: impl Into<String>,
    ) -> Result<Self, CoreError> {
        let thermostat = Self::new(session, device_id);
        thermostat.sync().await?;
        Ok(thermostat)
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// The last successfully synced state.
    pub fn state(&self) -> Option<Arc<ThermostatState>> {
        self.state.load_full()
    }

    // ── Sync ─────────────────────────────────────────────────────────

    /// Fetch and decode fresh state.
    ///
    /// On failure the previous state is kept untouched.
    pub async fn sync(&self) -> Result<Arc<ThermostatState>, CoreError> {
        let _guard = self.op_lock.lock().await;
        let device_id = self.device_id.as_str();
        let session = &self.session;

        let (state, czfe_url) = session
            .with_relogin("thermostat sync", || async {
                let launch = session
                    .app_launch(&[BucketType::Shared, BucketType::Device])
                    .await?;
                let state = ThermostatState::from_launch(device_id, &launch, Utc::now())?;
                let czfe_url = Url::parse(launch.czfe_url()?)?;
                Ok((state, czfe_url))
            })
            .await?;

        debug!(
            device_id,
            mode = ?state.mode,
            action = %state.action,
            current = state.current_temperature,
            target = state.target_temperature,
            "thermostat synced"
        );
        let state = Arc::new(state);
        self.state.store(Some(Arc::clone(&state)));
        self.czfe_url.store(Some(Arc::new(czfe_url)));
        Ok(state)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Set the single target temperature.
    pub async fn set_temperature(&self, temperature: f64) -> Result<(), CoreError> {
        validate_temperature(temperature)?;
        self.write(
            BucketType::Shared,
            [("target_temperature", json!(temperature))],
        )
        .await
    }

    /// Set the low and high setpoints used in `range` mode.
    pub async fn set_temperature_range(&self, low: f64, high: f64) -> Result<(), CoreError> {
        validate_temperature(low)?;
        validate_temperature(high)?;
        if low >= high {
            return Err(CoreError::ValidationFailed {
                message: format!("low setpoint {low} must be below high setpoint {high}"),
            });
        }
        self.write(
            BucketType::Shared,
            [
                ("target_temperature_low", json!(low)),
                ("target_temperature_high", json!(high)),
            ],
        )
        .await
    }

    /// Change the operating mode. Eco is toggled with
    /// [`set_eco_mode`](Self::set_eco_mode) instead.
    pub async fn set_mode(&self, mode: ThermostatMode) -> Result<(), CoreError> {
        if mode == ThermostatMode::Eco {
            return Err(CoreError::ValidationFailed {
                message: "eco is not a target mode; use set_eco_mode".into(),
            });
        }
        self.write(
            BucketType::Shared,
            [("target_temperature_type", json!(mode.as_ref()))],
        )
        .await
    }

    /// Run the fan until `until`.
    pub async fn set_fan(&self, until: DateTime<Utc>) -> Result<(), CoreError> {
        self.write(
            BucketType::Device,
            [("fan_timer_timeout", json!(until.timestamp()))],
        )
        .await
    }

    /// Stop the fan timer.
    pub async fn stop_fan(&self) -> Result<(), CoreError> {
        self.write(BucketType::Device, [("fan_timer_timeout", json!(0))])
            .await
    }

    /// Turn manual eco on, or return to the schedule.
    pub async fn set_eco_mode(&self, enabled: bool) -> Result<(), CoreError> {
        let mode = if enabled { ECO_ON } else { ECO_OFF };
        self.write(BucketType::Device, [("eco", json!({ "mode": mode }))])
            .await
    }

    async fn write<const N: usize>(
        &self,
        namespace: BucketType,
        fields: [(&'static str, Value); N],
    ) -> Result<(), CoreError> {
        let _guard = self.op_lock.lock().await;
        let czfe_url = self
            .czfe_url
            .load_full()
            .ok_or_else(|| CoreError::NotSynced {
                device_id: self.device_id.clone(),
            })?;

        let patch = BucketPatch::merge(namespace, &self.device_id, fields);
        self.session
            .with_relogin("thermostat write", || {
                self.session.write_patch(&czfe_url, &patch)
            })
            .await?;

        info!(object_key = %patch.object_key, "thermostat updated");
        Ok(())
    }
}

fn validate_temperature(value: f64) -> Result<(), CoreError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(CoreError::ValidationFailed {
            message: format!("temperature must be a finite number, got {value}"),
        })
    }
}
