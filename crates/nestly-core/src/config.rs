// ── Runtime connection configuration ──
//
// These types describe *how* to reach the Nest service. They carry credential
// data and connection tuning, but never touch disk. The CLI builds a
// `ClientConfig` and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use nestly_api::{Endpoints, LoginMethod, RetryPolicy, TransportConfig};

/// How to obtain credentials.
///
/// Carries the secret material; converted into `nestly_api::LoginMethod`
/// when the session is built.
#[derive(Debug, Clone)]
pub enum AuthCredentials {
    /// Nest account email and password.
    Password {
        email: String,
        password: SecretString,
    },
    /// Google account: `issue_token` URL, browser cookie, and API key.
    GoogleCookie {
        issue_token: Url,
        cookie: SecretString,
        api_key: SecretString,
    },
}

impl From<AuthCredentials> for LoginMethod {
    fn from(auth: AuthCredentials) -> Self {
        match auth {
            AuthCredentials::Password { email, password } => {
                LoginMethod::Password { email, password }
            }
            AuthCredentials::GoogleCookie {
                issue_token,
                cookie,
                api_key,
            } => LoginMethod::GoogleCookie {
                issue_token,
                cookie,
                api_key,
            },
        }
    }
}

/// Configuration for one Nest account.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Credential flow and secrets.
    pub auth: AuthCredentials,
    /// Service base URLs (production hosts by default).
    pub endpoints: Endpoints,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Transient-failure retry policy.
    pub retry: RetryPolicy,
}

impl ClientConfig {
    pub fn new(auth: AuthCredentials) -> Self {
        Self {
            auth,
            endpoints: Endpoints::default(),
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig::default()
            .with_timeout(self.timeout)
            .with_cookie_jar()
    }
}
