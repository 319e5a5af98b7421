// ── Temperature sensor ──
//
// Read-only; state comes from `app_launch` with the `kryptonite` bucket type.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::debug;

use nestly_api::{BucketType, Session};

use crate::error::CoreError;
use crate::model::TemperatureSensorState;

/// A remote temperature sensor.
pub struct TemperatureSensor {
    session: Arc<Session>,
    device_id: String,
    state: ArcSwapOption<TemperatureSensorState>,
    op_lock: Mutex<()>,
}

impl TemperatureSensor {
    pub fn new(session: Arc<Session>, device_id: impl Into<String>) -> Self {
        Self {
            session,
            device_id: device_id.into(),
            state: ArcSwapOption::empty(),
            op_lock: Mutex::new(()),
        }
    }

    /// Create a handle and run the initial sync.
    pub async fn connect(
        session: Arc<Session>,
        device_id: impl Into<String>,
    ) -> Result<Self, CoreError> {
        let sensor = Self::new(session, device_id);
        sensor.sync().await?;
        Ok(sensor)
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn state(&self) -> Option<Arc<TemperatureSensorState>> {
        self.state.load_full()
    }

    /// Fetch and decode fresh state; the previous state survives a failure.
    pub async fn sync(&self) -> Result<Arc<TemperatureSensorState>, CoreError> {
        let _guard = self.op_lock.lock().await;
        let device_id = self.device_id.as_str();
        let session = &self.session;

        let state = session
            .with_relogin("sensor sync", || async {
                let launch = session.app_launch(&[BucketType::Kryptonite]).await?;
                TemperatureSensorState::from_launch(device_id, &launch, Utc::now())
            })
            .await?;

        debug!(
            device_id,
            temperature = state.current_temperature,
            battery = state.battery_level,
            "sensor synced"
        );
        let state = Arc::new(state);
        self.state.store(Some(Arc::clone(&state)));
        Ok(state)
    }
}
