//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use nestly_config::ConfigError;
use nestly_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const INTERRUPTED: i32 = 130;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach {url}")]
    #[diagnostic(
        code(nestly::connection_failed),
        help(
            "Check your network connection.\n\
             If you use --api-url, make sure the proxy is running."
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Request timed out")]
    #[diagnostic(
        code(nestly::timeout),
        help("Increase the timeout with --timeout or try again later.")
    )]
    Timeout,

    #[error("Interrupted")]
    #[diagnostic(code(nestly::interrupted))]
    Interrupted,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(nestly::auth_failed),
        help(
            "Verify your credentials.\n\
             Nest accounts: check email and NEST_PASSWORD.\n\
             Google accounts: issue_token and cookie expire; capture fresh ones from the browser."
        )
    )]
    AuthFailed { message: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(nestly::no_credentials),
        help(
            "Set `email` (Nest account) or `issue_token`, `cookie`, and `api_key`\n\
             (Google account) in the profile, or export NEST_EMAIL and NEST_PASSWORD."
        )
    )]
    NoCredentials { profile: String },

    #[error("Profile '{profile}' is missing {field}")]
    #[diagnostic(
        code(nestly::missing_secret),
        help(
            "Store it in the system keyring (service \"nestly\", account \"{profile}/<key>\"),\n\
             export the matching NEST_* variable, or add it to the profile."
        )
    )]
    MissingSecret { profile: String, field: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(nestly::not_found),
        help("Run: nestly devices to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
    },

    // ── Sync / API ───────────────────────────────────────────────────
    #[error("Could not read device state: {message}")]
    #[diagnostic(
        code(nestly::sync_failed),
        help("The service returned unexpected data even after a fresh login.")
    )]
    SyncFailed { message: String },

    #[error("API error ({status}): {message}")]
    #[diagnostic(code(nestly::api_error))]
    ApiError { status: String, message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(nestly::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(nestly::profile_not_found),
        help("Available profiles: {available}")
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration file not found")]
    #[diagnostic(
        code(nestly::no_config),
        help(
            "Create one with a [profiles.default] section, or pass --email.\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(nestly::config))]
    Config { message: String },

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Interrupted => exit_code::INTERRUPTED,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } | Self::MissingSecret { .. } => {
                exit_code::AUTH
            }
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },
            CoreError::Timeout => CliError::Timeout,
            CoreError::Cancelled => CliError::Interrupted,
            CoreError::SyncFailed { message } => CliError::SyncFailed { message },
            CoreError::NotSynced { device_id } => CliError::SyncFailed {
                message: format!("device {device_id} has no synced state"),
            },
            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },
            CoreError::Api { message, status } => CliError::ApiError {
                status: status.map_or_else(|| "-".into(), |s| s.to_string()),
                message,
            },
            CoreError::Config { message } => CliError::Config { message },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::MissingSecret { profile, field } => {
                CliError::MissingSecret { profile, field }
            }
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}
