// Credential acquisition
//
// Two flows produce a `(subject_id, bearer token)` pair: a direct password
// exchange against `/session`, and a Google cookie exchange that trades an
// OAuth access token for a short-lived service JWT. Exactly one flow is
// configured per client.

use reqwest::header::{AUTHORIZATION, COOKIE, REFERER, USER_AGENT};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::{IssueTokenResponse, JwtResponse, PasswordLoginResponse};
use crate::retry::RetryPolicy;
use crate::transport::{Endpoints, read_json};

/// Desktop browser User-Agent the Google endpoints expect.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_14_5) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/75.0.3770.100 Safari/537.36";

const JWT_EXPIRE_AFTER: &str = "3600s";
const JWT_POLICY_ID: &str = "authproxy-oauth-policy";

/// An issued identity: the account's subject id and its bearer token.
///
/// Immutable once issued; a re-login replaces it wholesale.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub subject_id: String,
    pub access_token: SecretString,
}

/// Which credential flow to run, with the secret material it needs.
#[derive(Debug, Clone)]
pub enum LoginMethod {
    /// Direct email/password exchange.
    Password { email: String, password: SecretString },

    /// Google account: token issuance via a browser cookie, then JWT exchange.
    GoogleCookie {
        issue_token: Url,
        cookie: SecretString,
        api_key: SecretString,
    },
}

impl LoginMethod {
    pub fn flow_name(&self) -> &'static str {
        match self {
            Self::Password { .. } => "password",
            Self::GoogleCookie { .. } => "google",
        }
    }
}

/// Runs the configured login flow against the service.
pub struct CredentialProvider {
    http: reqwest::Client,
    endpoints: Endpoints,
    method: LoginMethod,
    retry: RetryPolicy,
}

impl CredentialProvider {
    pub fn new(
        http: reqwest::Client,
        endpoints: Endpoints,
        method: LoginMethod,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            http,
            endpoints,
            method,
            retry,
        }
    }

    pub fn method(&self) -> &LoginMethod {
        &self.method
    }

    /// Obtain fresh credentials.
    ///
    /// Transport failures are retried per the policy. Rejections (4xx) and
    /// missing or garbled response fields become `Error::Authentication`;
    /// transport errors, 5xx, and cancellation pass through unchanged.
    pub async fn obtain(&self, cancel: &CancellationToken) -> Result<Credentials, Error> {
        debug!(flow = self.method.flow_name(), "requesting credentials");
        let result = match &self.method {
            LoginMethod::Password { email, password } => {
                self.password_login(cancel, email, password).await
            }
            LoginMethod::GoogleCookie {
                issue_token,
                cookie,
                api_key,
            } => self.google_login(cancel, issue_token, cookie, api_key).await,
        };

        result.map_err(|e| match e {
            Error::Api { status, .. } if status < 500 => self.rejected(&e),
            Error::SessionExpired | Error::Decode { .. } => self.rejected(&e),
            other => other,
        })
    }

    fn rejected(&self, cause: &Error) -> Error {
        Error::Authentication {
            message: format!("{} login failed: {cause}", self.method.flow_name()),
        }
    }

    /// `POST /session` with `{email, password}`.
    async fn password_login(
        &self,
        cancel: &CancellationToken,
        email: &str,
        password: &SecretString,
    ) -> Result<Credentials, Error> {
        let url = self.endpoints.api_url("/session")?;
        let body = json!({
            "email": email,
            "password": password.expose_secret(),
        });

        let resp: PasswordLoginResponse = self
            .retry
            .run(cancel, || async {
                let resp = self.http.post(url.clone()).json(&body).send().await?;
                read_json(resp).await
            })
            .await?;

        Ok(Credentials {
            subject_id: resp.userid,
            access_token: SecretString::from(resp.access_token),
        })
    }

    /// Cookie → OAuth access token → service JWT.
    async fn google_login(
        &self,
        cancel: &CancellationToken,
        issue_token: &Url,
        cookie: &SecretString,
        api_key: &SecretString,
    ) -> Result<Credentials, Error> {
        let token: IssueTokenResponse = self
            .retry
            .run(cancel, || async {
                let resp = self
                    .http
                    .get(issue_token.clone())
                    .header("Sec-Fetch-Mode", "cors")
                    .header(USER_AGENT, BROWSER_USER_AGENT)
                    .header("X-Requested-With", "XmlHttpRequest")
                    .header(REFERER, "https://accounts.google.com/o/oauth2/iframe")
                    .header(COOKIE, cookie.expose_secret())
                    .send()
                    .await?;
                read_json(resp).await
            })
            .await?;
        debug!("obtained Google OAuth access token");

        let oauth_token = SecretString::from(token.access_token);
        let jwt: JwtResponse = self
            .retry
            .run(cancel, || async {
                let resp = self
                    .http
                    .post(self.endpoints.jwt.clone())
                    .header(
                        AUTHORIZATION,
                        format!("Bearer {}", oauth_token.expose_secret()),
                    )
                    .header(USER_AGENT, BROWSER_USER_AGENT)
                    .header("x-goog-api-key", api_key.expose_secret())
                    .header(REFERER, "https://home.nest.com")
                    .query(&[
                        ("embed_google_oauth_access_token", "true"),
                        ("expire_after", JWT_EXPIRE_AFTER),
                        ("google_oauth_access_token", oauth_token.expose_secret()),
                        ("policy_id", JWT_POLICY_ID),
                    ])
                    .send()
                    .await?;
                read_json(resp).await
            })
            .await?;

        Ok(Credentials {
            subject_id: jwt.claims.subject.nest_id.id,
            access_token: SecretString::from(jwt.jwt),
        })
    }
}
