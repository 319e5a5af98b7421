// ── Camera ──
//
// Cameras live outside the bucket store. Every call first makes sure the
// cookie-based camera login matches the session's current credentials, so a
// main re-login is followed by a fresh camera login.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info};

use nestly_api::Session;

use crate::error::CoreError;
use crate::model::{CameraState, DEFAULT_CAMERA_NAME};

const STREAMING_ENABLED: &str = "streaming.enabled";

/// A Nest camera, addressed by its uuid.
pub struct Camera {
    session: Arc<Session>,
    uuid: String,
    state: ArcSwapOption<CameraState>,
    op_lock: Mutex<()>,
}

impl Camera {
    pub fn new(session: Arc<Session>, uuid: impl Into<String>) -> Self {
        Self {
            session,
            uuid: uuid.into(),
            state: ArcSwapOption::empty(),
            op_lock: Mutex::new(()),
        }
    }

    /// Create a handle, log in to the camera service, and fetch properties.
    pub async fn connect(session: Arc<Session>, uuid: impl Into<String>) -> Result<Self, CoreError> {
        let camera = Self::new(session, uuid);
        camera.sync().await?;
        Ok(camera)
    }

    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    pub fn state(&self) -> Option<Arc<CameraState>> {
        self.state.load_full()
    }

    /// Display name; a generic name until the first sync.
    pub fn name(&self) -> String {
        self.state
            .load()
            .as_ref()
            .map_or_else(|| DEFAULT_CAMERA_NAME.to_owned(), |s| s.name.clone())
    }

    /// Fetch fresh properties; the previous state survives a failure.
    pub async fn sync(&self) -> Result<Arc<CameraState>, CoreError> {
        let _guard = self.op_lock.lock().await;
        let uuid = self.uuid.as_str();
        let session = &self.session;

        let props = session
            .with_relogin("camera sync", || async {
                session.ensure_camera_login().await?;
                session.camera_properties(uuid).await
            })
            .await?;

        let state = Arc::new(CameraState::from_properties(uuid, props, Utc::now()));
        debug!(
            uuid,
            online = state.is_online,
            streaming = state.is_streaming,
            "camera synced"
        );
        self.state.store(Some(Arc::clone(&state)));
        Ok(state)
    }

    pub async fn turn_on(&self) -> Result<(), CoreError> {
        self.set_streaming(true).await
    }

    pub async fn turn_off(&self) -> Result<(), CoreError> {
        self.set_streaming(false).await
    }

    async fn set_streaming(&self, enabled: bool) -> Result<(), CoreError> {
        let _guard = self.op_lock.lock().await;
        let uuid = self.uuid.as_str();
        let session = &self.session;
        let value = if enabled { "true" } else { "false" };

        session
            .with_relogin("camera property write", || async {
                session.ensure_camera_login().await?;
                session
                    .set_camera_property(uuid, STREAMING_ENABLED, value)
                    .await
            })
            .await?;

        info!(uuid, enabled, "camera streaming changed");
        Ok(())
    }

    /// A still image; `now` busts intermediate caches.
    pub async fn image(&self, now: DateTime<Utc>) -> Result<Bytes, CoreError> {
        let _guard = self.op_lock.lock().await;
        let uuid = self.uuid.as_str();
        let session = &self.session;

        let image = session
            .with_relogin("camera image", || async {
                session.ensure_camera_login().await?;
                session.camera_image(uuid, now.timestamp()).await
            })
            .await?;
        Ok(image)
    }
}
