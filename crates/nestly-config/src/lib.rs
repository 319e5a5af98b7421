//! Configuration for the nestly CLI.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext), and
//! translation to `nestly_core::ClientConfig`. The CLI adds flag-aware
//! wrappers on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

use nestly_core::{AuthCredentials, ClientConfig, Endpoints, RetryPolicy};

/// Keyring service name for stored secrets.
pub const KEYRING_SERVICE: &str = "nestly";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{profile}' is missing {field}")]
    MissingSecret { profile: String, field: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named account profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_retries")]
    pub retries: u32,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            retries: default_retries(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_retries() -> u32 {
    4
}

/// A named Nest account.
///
/// Set `email` for a Nest account; otherwise `issue_token`, `cookie`, and
/// `api_key` describe a Google account.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Nest account email.
    pub email: Option<String>,

    /// Nest account password (plaintext -- prefer keyring or `NEST_PASSWORD`).
    pub password: Option<String>,

    /// Google `issue_token` URL captured from the browser.
    pub issue_token: Option<String>,

    /// Google cookie (plaintext -- prefer keyring or `NEST_COOKIE`).
    pub cookie: Option<String>,

    /// Google API key (plaintext -- prefer keyring or `NEST_API_KEY`).
    pub api_key: Option<String>,

    /// Point every service at one base URL (proxies, testing).
    pub api_url: Option<String>,

    /// Override request timeout (seconds).
    pub timeout: Option<u64>,

    /// Override total attempts per request.
    pub retries: Option<u32>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "nestly", "nestly").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("nestly");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load Config from `path` + environment.
///
/// Environment keys use `NEST_` and `__` for nesting, e.g.
/// `NEST_DEFAULTS__TIMEOUT=10` or `NEST_PROFILES__HOME__EMAIL=...`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("NEST_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve one secret: environment variable, then system keyring, then
/// plaintext in the profile.
pub fn resolve_secret(
    profile_name: &str,
    key: &str,
    env_var: &str,
    plaintext: Option<&str>,
) -> Option<SecretString> {
    // 1. Env var
    if let Ok(val) = std::env::var(env_var) {
        return Some(SecretString::from(val));
    }

    // 2. Keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/{key}")) {
        if let Ok(secret) = entry.get_password() {
            return Some(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    plaintext.map(|s| SecretString::from(s.to_owned()))
}

/// Choose the credential flow for a profile and resolve its secrets.
///
/// An email (profile or `NEST_EMAIL`) selects the password flow; otherwise
/// the Google flow needs all of `issue_token`, `cookie`, and `api_key`.
pub fn resolve_auth(profile: &Profile, profile_name: &str) -> Result<AuthCredentials, ConfigError> {
    let email = profile
        .email
        .clone()
        .or_else(|| std::env::var("NEST_EMAIL").ok());

    if let Some(email) = email {
        let password = resolve_secret(
            profile_name,
            "password",
            "NEST_PASSWORD",
            profile.password.as_deref(),
        )
        .ok_or_else(|| missing(profile_name, "password"))?;
        return Ok(AuthCredentials::Password { email, password });
    }

    let issue_token = profile
        .issue_token
        .clone()
        .or_else(|| std::env::var("NEST_ISSUE_TOKEN").ok())
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })?;
    let issue_token = Url::parse(&issue_token).map_err(|e| ConfigError::Validation {
        field: "issue_token".into(),
        reason: e.to_string(),
    })?;

    let cookie = resolve_secret(
        profile_name,
        "cookie",
        "NEST_COOKIE",
        profile.cookie.as_deref(),
    )
    .ok_or_else(|| missing(profile_name, "cookie"))?;
    let api_key = resolve_secret(
        profile_name,
        "api-key",
        "NEST_API_KEY",
        profile.api_key.as_deref(),
    )
    .ok_or_else(|| missing(profile_name, "api_key"))?;

    Ok(AuthCredentials::GoogleCookie {
        issue_token,
        cookie,
        api_key,
    })
}

fn missing(profile_name: &str, field: &str) -> ConfigError {
    ConfigError::MissingSecret {
        profile: profile_name.into(),
        field: field.into(),
    }
}

/// Service endpoints for a profile: production hosts unless `api_url` is set.
pub fn profile_endpoints(profile: &Profile) -> Result<Endpoints, ConfigError> {
    let Some(ref raw) = profile.api_url else {
        return Ok(Endpoints::default());
    };
    let invalid = |reason: String| ConfigError::Validation {
        field: "api_url".into(),
        reason,
    };
    let base = Url::parse(raw).map_err(|e| invalid(format!("{raw}: {e}")))?;
    Endpoints::with_base(&base).map_err(|e| invalid(e.to_string()))
}

/// Build a `ClientConfig` from a profile -- no CLI flag overrides.
pub fn profile_to_client_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ClientConfig, ConfigError> {
    let endpoints = profile_endpoints(profile)?;
    let auth = resolve_auth(profile, profile_name)?;

    let mut config = ClientConfig::new(auth)
        .with_endpoints(endpoints)
        .with_retry(
            RetryPolicy::default().with_max_attempts(profile.retries.unwrap_or(defaults.retries)),
        );
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    Ok(config)
}
