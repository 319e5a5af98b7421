// Authenticated session
//
// Owns the HTTP client (cookie jar + default headers), the current
// credentials, and the cancellation token. Credentials are published through
// an `ArcSwapOption` tagged with a generation number; re-login runs under a
// mutex and is skipped when another caller already replaced the generation it
// saw fail, so concurrent decode failures collapse into one login.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;

use arc_swap::ArcSwapOption;
use reqwest::Method;
use reqwest::header::AUTHORIZATION;
use secrecy::ExposeSecret;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::auth::{CredentialProvider, Credentials, LoginMethod};
use crate::error::Error;
use crate::retry::RetryPolicy;
use crate::transport::{Endpoints, TransportConfig, check_status};

/// Credentials plus the login generation that produced them.
struct Grant {
    credentials: Credentials,
    generation: u64,
}

/// A logged-in connection to the Nest service.
///
/// Share it between device models with `Arc<Session>`; every request goes
/// through [`send_authenticated`](Self::send_authenticated) or one of the
/// endpoint helpers built on it.
pub struct Session {
    http: reqwest::Client,
    endpoints: Endpoints,
    provider: CredentialProvider,
    retry: RetryPolicy,
    grant: ArcSwapOption<Grant>,
    login_lock: Mutex<()>,
    cancel: CancellationToken,
    /// Login generation the camera cookie was issued for; 0 if never.
    pub(crate) camera_generation: AtomicU64,
}

impl Session {
    /// Create a session from a `TransportConfig`.
    ///
    /// A cookie jar is added if the config lacks one (the camera sub-session
    /// is cookie based). Does not log in.
    pub fn new(
        method: LoginMethod,
        endpoints: Endpoints,
        transport: &TransportConfig,
        retry: RetryPolicy,
    ) -> Result<Self, Error> {
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let http = config.build_client()?;
        Ok(Self::with_client(http, endpoints, method, retry))
    }

    /// Create a session around a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        endpoints: Endpoints,
        method: LoginMethod,
        retry: RetryPolicy,
    ) -> Self {
        let provider = CredentialProvider::new(http.clone(), endpoints.clone(), method, retry);
        Self {
            http,
            endpoints,
            provider,
            retry,
            grant: ArcSwapOption::empty(),
            login_lock: Mutex::new(()),
            cancel: CancellationToken::new(),
            camera_generation: AtomicU64::new(0),
        }
    }

    /// The underlying HTTP client (shares the session's cookie jar).
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Token that aborts every in-flight and future request of this session.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn cancel(&self) {
        debug!("cancelling session");
        self.cancel.cancel();
    }

    pub fn is_logged_in(&self) -> bool {
        self.grant.load().is_some()
    }

    /// Login generation of the current credentials; 0 before the first login.
    pub fn generation(&self) -> u64 {
        self.grant.load().as_ref().map_or(0, |g| g.generation)
    }

    /// A copy of the current credentials.
    pub fn credentials(&self) -> Option<Credentials> {
        self.grant.load().as_ref().map(|g| g.credentials.clone())
    }

    // ── Login lifecycle ──────────────────────────────────────────────

    /// Run the credential flow and replace the current credentials.
    pub async fn login(&self) -> Result<(), Error> {
        let _guard = self.login_lock.lock().await;
        self.login_locked().await
    }

    /// Log in only if no credentials are held yet.
    pub async fn ensure_logged_in(&self) -> Result<(), Error> {
        if self.is_logged_in() {
            return Ok(());
        }
        let _guard = self.login_lock.lock().await;
        if self.is_logged_in() {
            return Ok(());
        }
        self.login_locked().await
    }

    /// Replace credentials that were observed failing at `stale_generation`.
    ///
    /// If another caller has already logged in again since then, this is a
    /// no-op and the newer credentials are used.
    pub async fn relogin(&self, stale_generation: u64) -> Result<(), Error> {
        let _guard = self.login_lock.lock().await;
        let current = self.generation();
        if current != stale_generation {
            debug!(stale_generation, current, "credentials already refreshed");
            return Ok(());
        }
        self.login_locked().await
    }

    async fn login_locked(&self) -> Result<(), Error> {
        let credentials = self.provider.obtain(&self.cancel).await?;
        let generation = self.generation() + 1;
        info!(
            subject_id = %credentials.subject_id,
            generation,
            flow = self.provider.method().flow_name(),
            "logged in"
        );
        self.grant.store(Some(Arc::new(Grant {
            credentials,
            generation,
        })));
        Ok(())
    }

    /// The subject id of the logged-in account, logging in first if needed.
    pub async fn subject_id(&self) -> Result<String, Error> {
        self.ensure_logged_in().await?;
        self.credentials()
            .map(|c| c.subject_id)
            .ok_or_else(|| Error::Authentication {
                message: "no credentials after login".into(),
            })
    }

    // ── Request primitives ───────────────────────────────────────────

    /// Send a request carrying `Authorization: Basic <token>`.
    ///
    /// The header name is historical; the value is the opaque bearer token.
    /// Transient failures are retried per the session's policy; 401/403
    /// surface as `Error::SessionExpired`.
    pub async fn send_authenticated(
        &self,
        method: Method,
        url: Url,
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response, Error> {
        self.ensure_logged_in().await?;
        debug!("{} {}", method, url);

        self.send_with_retry(|| {
            let mut builder = self.http.request(method.clone(), url.clone());
            if let Some(grant) = self.grant.load_full() {
                builder = builder.header(
                    AUTHORIZATION,
                    format!("Basic {}", grant.credentials.access_token.expose_secret()),
                );
            }
            match body {
                Some(body) => builder.json(body),
                None => builder,
            }
        })
        .await
    }

    /// Send a request built fresh for each attempt, relying on the cookie jar
    /// rather than the bearer header.
    pub(crate) async fn send_with_retry<F>(&self, build: F) -> Result<reqwest::Response, Error>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        self.retry
            .run(&self.cancel, || async {
                let resp = build().send().await?;
                check_status(resp).await
            })
            .await
    }

    /// Run a request-and-decode operation, logging in again once if it fails
    /// in a way that suggests stale credentials.
    ///
    /// The whole operation is re-run after the fresh login, not only the HTTP
    /// call. A second stale-looking failure becomes `Error::Sync`.
    pub async fn with_relogin<T, F, Fut>(&self, operation: &str, op: F) -> Result<T, Error>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        self.ensure_logged_in().await?;
        let generation = self.generation();

        match op().await {
            Err(e) if e.is_session_expired() => {
                warn!(operation, error = %e, "session looks stale, logging in again");
                self.relogin(generation).await?;
            }
            other => return other,
        }

        op().await.map_err(|e| {
            if e.is_session_expired() {
                Error::Sync {
                    message: format!("{operation}: {e}"),
                }
            } else {
                e
            }
        })
    }
}
