// Camera (dropcam) endpoints
//
// Cameras use a separate cookie-based sub-session: the bearer token is posted
// as form data to the dropcam login, which sets a cookie in the session's jar.
// All later camera calls rely on that cookie instead of the Authorization header.

use std::sync::atomic::Ordering;

use bytes::Bytes;
use secrecy::ExposeSecret;
use tracing::debug;

use crate::error::Error;
use crate::models::{CameraProperties, CameraSummary, ItemsEnvelope};
use crate::session::Session;
use crate::transport::read_json;

impl Session {
    /// Establish the camera sub-session.
    ///
    /// `POST /dropcam/api/login` with form field `access_token`.
    pub async fn camera_login(&self) -> Result<(), Error> {
        self.ensure_logged_in().await?;
        let credentials = self.credentials().ok_or_else(|| Error::Authentication {
            message: "no credentials for camera login".into(),
        })?;
        let url = self.endpoints().api_url("/dropcam/api/login")?;
        debug!("logging in to camera API");

        self.send_with_retry(|| {
            self.http().post(url.clone()).form(&[(
                "access_token",
                credentials.access_token.expose_secret(),
            )])
        })
        .await?;
        Ok(())
    }

    /// Run the camera login unless it already happened for the current
    /// credentials. A fresh main login invalidates the camera cookie.
    pub async fn ensure_camera_login(&self) -> Result<(), Error> {
        self.ensure_logged_in().await?;
        let generation = self.generation();
        if self.camera_generation.load(Ordering::Acquire) == generation {
            return Ok(());
        }
        self.camera_login().await?;
        self.camera_generation.store(generation, Ordering::Release);
        Ok(())
    }

    /// Properties of one camera.
    ///
    /// `GET /dropcam/api/cameras/{uuid}` -- the response is a one-element array.
    pub async fn camera_properties(&self, uuid: &str) -> Result<CameraProperties, Error> {
        let url = self
            .endpoints()
            .api_url(&format!("/dropcam/api/cameras/{uuid}"))?;
        debug!(uuid, "fetching camera properties");

        let resp = self
            .send_with_retry(|| self.http().get(url.clone()))
            .await?;
        let mut cameras: Vec<CameraProperties> = read_json(resp).await?;
        if cameras.is_empty() {
            return Err(Error::decode(format!("no properties returned for camera {uuid}")));
        }
        Ok(cameras.swap_remove(0))
    }

    /// Every camera the account owns or is a member of.
    ///
    /// `GET /api/cameras.get_owned_and_member_of_with_properties`
    pub async fn list_cameras(&self) -> Result<Vec<CameraSummary>, Error> {
        let url = self
            .endpoints()
            .camera_webapi_url("/api/cameras.get_owned_and_member_of_with_properties")?;
        debug!("listing cameras");

        let resp = self
            .send_with_retry(|| self.http().get(url.clone()))
            .await?;
        let envelope: ItemsEnvelope<CameraSummary> = read_json(resp).await?;
        Ok(envelope.items)
    }

    /// Set one camera property, e.g. `streaming.enabled`.
    ///
    /// `POST /api/dropcams.set_properties` with form `{property: value, uuid}`.
    pub async fn set_camera_property(
        &self,
        uuid: &str,
        property: &str,
        value: &str,
    ) -> Result<Vec<serde_json::Value>, Error> {
        let url = self
            .endpoints()
            .camera_webapi_url("/api/dropcams.set_properties")?;
        debug!(uuid, property, value, "setting camera property");

        let resp = self
            .send_with_retry(|| {
                self.http()
                    .post(url.clone())
                    .form(&[(property, value), ("uuid", uuid)])
            })
            .await?;
        let envelope: ItemsEnvelope<serde_json::Value> = read_json(resp).await?;
        Ok(envelope.items)
    }

    /// Fetch a still image. `cachebuster` is usually the current Unix time.
    ///
    /// `GET {camera}/get_image?uuid={uuid}&cachebuster={cachebuster}`
    pub async fn camera_image(&self, uuid: &str, cachebuster: i64) -> Result<Bytes, Error> {
        let url = self.endpoints().camera_url("/get_image")?;
        let cachebuster = cachebuster.to_string();
        debug!(uuid, "fetching camera image");

        let resp = self
            .send_with_retry(|| {
                self.http()
                    .get(url.clone())
                    .query(&[("uuid", uuid), ("cachebuster", cachebuster.as_str())])
            })
            .await?;
        Ok(resp.bytes().await?)
    }
}
