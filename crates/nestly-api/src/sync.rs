// Bucket store requests
//
// `app_launch` always asks for full state: the known-versions list is sent
// empty, so every matching bucket comes back on every call.

use reqwest::Method;
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use crate::error::Error;
use crate::models::{AppLaunchResponse, BucketIndex};
use crate::session::Session;
use crate::transport::read_json;

/// Bucket namespaces understood by `app_launch`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display, strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BucketType {
    /// Account-wide index of every object key.
    Buckets,
    /// Thermostat setpoints and HVAC state.
    Shared,
    /// Thermostat device settings.
    Device,
    /// Remote temperature sensors.
    Kryptonite,
}

impl Session {
    /// Fetch the current state of every bucket of the given types.
    ///
    /// `POST /api/0.1/user/{subject_id}/app_launch`
    pub async fn app_launch(&self, types: &[BucketType]) -> Result<AppLaunchResponse, Error> {
        let subject_id = self.subject_id().await?;
        let url = self
            .endpoints()
            .api_url(&format!("/api/0.1/user/{subject_id}/app_launch"))?;
        let body = json!({
            "known_bucket_types": types,
            "known_bucket_versions": [],
        });

        debug!(?types, "requesting buckets");
        let resp = self
            .send_authenticated(Method::POST, url, Some(&body))
            .await?;
        read_json(resp).await
    }

    /// List the device ids in one namespace, e.g. `device` for thermostats or
    /// `kryptonite` for sensors.
    ///
    /// Reads the `buckets` index, whose value lists every object key on the
    /// account.
    pub async fn list_device_ids(&self, namespace: BucketType) -> Result<Vec<String>, Error> {
        self.with_relogin("list devices", || async {
            let launch = self.app_launch(&[BucketType::Buckets]).await?;
            let index: BucketIndex = launch
                .updated_buckets
                .first()
                .ok_or_else(|| Error::decode("app_launch returned no bucket index"))?
                .decode()?;

            let prefix = format!("{namespace}.");
            Ok(index
                .buckets
                .iter()
                .filter_map(|key| key.strip_prefix(&prefix))
                .map(str::to_owned)
                .collect())
        })
        .await
    }
}
