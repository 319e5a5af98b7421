// ── Core error types ──
//
// User-facing errors from nestly-core. Consumers never see HTTP status codes
// or JSON shapes directly; the `From<nestly_api::Error>` impl translates
// transport-layer errors into domain variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Request timed out")]
    Timeout,

    #[error("Operation cancelled")]
    Cancelled,

    // ── Data errors ──────────────────────────────────────────────────
    /// State could not be decoded even with fresh credentials.
    #[error("Sync failed: {message}")]
    SyncFailed { message: String },

    /// A command was issued before the first successful sync.
    #[error("Device {device_id} has not been synced yet")]
    NotSynced { device_id: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<nestly_api::Error> for CoreError {
    fn from(err: nestly_api::Error) -> Self {
        match err {
            nestly_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            nestly_api::Error::SessionExpired => CoreError::AuthenticationFailed {
                message: "Session expired -- credentials were rejected".into(),
            },
            nestly_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() || e.is_request() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(|u| u.to_string())
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            nestly_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            nestly_api::Error::ClientBuild(message) => CoreError::Config { message },
            nestly_api::Error::Cancelled => CoreError::Cancelled,
            nestly_api::Error::Api { status, body } => CoreError::Api {
                message: if body.is_empty() {
                    format!("HTTP {status}")
                } else {
                    body
                },
                status: Some(status),
            },
            nestly_api::Error::Decode { message } | nestly_api::Error::Sync { message } => {
                CoreError::SyncFailed { message }
            }
        }
    }
}
