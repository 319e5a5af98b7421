// Shared transport configuration for building reqwest::Client instances.
//
// A session and its camera sub-session share one client, so the cookie jar,
// timeout, and default headers are configured in one place.

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, HeaderValue, REFERER};
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::Error;

pub const API_URL: &str = "https://home.nest.com";
pub const CAMERA_WEBAPI_URL: &str = "https://webapi.camera.home.nest.com";
pub const CAMERA_URL: &str = "https://nexusapi-us1.camera.home.nest.com";
pub const JWT_URL: &str = "https://nestauthproxyservice-pa.googleapis.com/v1/issue_jwt";

const DEFAULT_REFERER: &str = "https://home.nest.com/";

/// Base URLs for every service the client talks to.
///
/// Defaults point at the production Nest hosts. Tests and proxies override
/// them, typically with [`Endpoints::with_base`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Session login, app_launch, and dropcam login/properties.
    pub api: Url,
    /// Camera listing and property writes.
    pub camera_webapi: Url,
    /// Camera image fetches.
    pub camera: Url,
    /// Google auth-proxy JWT issuance.
    pub jwt: Url,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            api: Url::parse(API_URL).expect("valid default API URL"),
            camera_webapi: Url::parse(CAMERA_WEBAPI_URL).expect("valid default camera webapi URL"),
            camera: Url::parse(CAMERA_URL).expect("valid default camera URL"),
            jwt: Url::parse(JWT_URL).expect("valid default JWT URL"),
        }
    }
}

impl Endpoints {
    /// Point every service at a single base URL.
    ///
    /// The JWT endpoint becomes `{base}/v1/issue_jwt`.
    pub fn with_base(base: &Url) -> Result<Self, Error> {
        Ok(Self {
            api: base.clone(),
            camera_webapi: base.clone(),
            camera: base.clone(),
            jwt: join(base, "/v1/issue_jwt")?,
        })
    }

    /// `{api}{path}`
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        join(&self.api, path)
    }

    /// `{camera_webapi}{path}`
    pub(crate) fn camera_webapi_url(&self, path: &str) -> Result<Url, Error> {
        join(&self.camera_webapi, path)
    }

    /// `{camera}{path}`
    pub(crate) fn camera_url(&self, path: &str) -> Result<Url, Error> {
        join(&self.camera, path)
    }
}

/// Append an absolute path to a base URL, keeping any path prefix the base
/// already carries.
pub(crate) fn join(base: &Url, path: &str) -> Result<Url, Error> {
    let base = base.as_str().trim_end_matches('/');
    Ok(Url::parse(&format!("{base}{path}"))?)
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub cookie_jar: Option<Arc<Jar>>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            cookie_jar: None,
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    ///
    /// Every request carries the `Referer` header the web app sends.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(REFERER, HeaderValue::from_static(DEFAULT_REFERER));

        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .user_agent(concat!("nestly/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers);

        if let Some(ref jar) = self.cookie_jar {
            builder = builder.cookie_provider(Arc::clone(jar));
        }

        builder
            .build()
            .map_err(|e| Error::ClientBuild(e.to_string()))
    }

    /// Create a config with a fresh cookie jar (for the camera sub-session).
    pub fn with_cookie_jar(mut self) -> Self {
        self.cookie_jar = Some(Arc::new(Jar::default()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// ── Response handling ────────────────────────────────────────────────

/// Map non-success statuses to errors: 401/403 mean the token was rejected,
/// anything else non-2xx becomes `Error::Api`.
pub(crate) async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, Error> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(Error::SessionExpired);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(Error::Api {
        status: status.as_u16(),
        body,
    })
}

/// Read the body and deserialize it; a shape mismatch is a decode failure.
pub(crate) async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let resp = check_status(resp).await?;
    let body = resp.text().await?;
    serde_json::from_str(&body).map_err(|e| Error::decode(e.to_string()))
}
