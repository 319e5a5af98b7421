// Command writer
//
// A write is one MERGE patch against a single object key, sent as a
// one-element batch to `{czfe_url}/v5/put`. Only the transport outcome is
// checked; the new state becomes visible on the next sync.

use reqwest::Method;
use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::session::Session;
use crate::sync::BucketType;
use crate::transport::join;

/// Bucket write operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PatchOp {
    /// Change only the named fields.
    Merge,
}

/// A partial update of one bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketPatch {
    pub object_key: String,
    pub op: PatchOp,
    pub value: Map<String, Value>,
}

impl BucketPatch {
    /// MERGE `fields` into `{namespace}.{device_id}`.
    pub fn merge<K: Into<String>>(
        namespace: BucketType,
        device_id: &str,
        fields: impl IntoIterator<Item = (K, Value)>,
    ) -> Self {
        Self {
            object_key: format!("{namespace}.{device_id}"),
            op: PatchOp::Merge,
            value: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// The request body: `{"objects": [patch]}`.
    pub fn to_body(&self) -> Value {
        json!({ "objects": [self] })
    }
}

impl Session {
    /// Send one patch to the command host advertised by `app_launch`.
    ///
    /// `POST {czfe_url}/v5/put`
    pub async fn write_patch(&self, czfe_url: &Url, patch: &BucketPatch) -> Result<(), Error> {
        let url = join(czfe_url, "/v5/put")?;
        debug!(object_key = %patch.object_key, fields = ?patch.value.keys().collect::<Vec<_>>(), "writing bucket patch");
        self.send_authenticated(Method::POST, url, Some(&patch.to_body()))
            .await?;
        Ok(())
    }
}
