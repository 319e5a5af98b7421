use thiserror::Error;

/// Top-level error type for the `nestly-api` crate.
///
/// Covers every failure mode across the session, bucket store, and camera
/// surfaces. `nestly-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Credential exchange produced no usable token.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The service rejected the bearer token (HTTP 401/403).
    #[error("Session expired -- re-authentication required")]
    SessionExpired,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    /// The session's cancellation token fired mid-request.
    #[error("Request cancelled")]
    Cancelled,

    // ── API ─────────────────────────────────────────────────────────
    /// Non-success HTTP status that is not an auth rejection.
    #[error("API error (HTTP {status}): {body}")]
    Api { status: u16, body: String },

    // ── Data ────────────────────────────────────────────────────────
    /// An expected field was absent from an otherwise well-formed response.
    #[error("Unexpected response shape: {message}")]
    Decode { message: String },

    /// Decoding still failed after a fresh login.
    #[error("Sync failed after re-login: {message}")]
    Sync { message: String },
}

impl Error {
    /// An expected field or record was missing.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Returns `true` if the failure looks like an expired or invalid session
    /// and a fresh login might resolve it.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::Decode { .. } | Self::SessionExpired)
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::Api { status, .. } => *status == 429 || (500..600).contains(status),
            _ => false,
        }
    }
}
