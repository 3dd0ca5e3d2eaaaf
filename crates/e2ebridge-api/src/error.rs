use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the `e2ebridge-api` crate.
///
/// Covers every failure mode across both API generations: local packing,
/// transport, REST application errors, legacy console envelopes, login,
/// and caller mistakes caught before any request goes out.
#[derive(Debug, Error)]
pub enum Error {
    // ── Local ───────────────────────────────────────────────────────
    /// Local I/O failure while reading or packing a file.
    #[error("Filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Archive construction or manifest derivation failed.
    #[error("Pack error: {0}")]
    Pack(String),

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Server-side failures ────────────────────────────────────────
    /// The Bridge answered, but not with HTTP 200.
    #[error("Bridge error (HTTP {status}): {body}")]
    Bridge { status: u16, body: String },

    /// The legacy console answered with a `Status` other than `OK`.
    #[error("Console error ({status}): {}", message.as_deref().unwrap_or("no message"))]
    Console {
        status: String,
        message: Option<String>,
    },

    /// Login was rejected.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Caller mistakes ─────────────────────────────────────────────
    /// Unknown preference/setting key or wrong-typed value.
    #[error("Usage error: {message}")]
    Usage { message: String },

    /// The endpoint table does not allow this verb on this path.
    #[error("Unsupported operation: {verb} on \"{path}\"")]
    UnsupportedOperation { verb: String, path: String },

    // ── Data ────────────────────────────────────────────────────────
    /// Response body could not be decoded, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

/// `Message` text the legacy console sends when the session cookie is
/// missing or no longer valid.
///
/// Matched verbatim: the console exposes no structured code for this case,
/// so a change in server wording silently disables the re-login retry.
pub const NOT_AUTHENTICATED_MESSAGE: &str = "User not authenticated";

impl Error {
    pub(crate) fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }

    /// Returns `true` if the console rejected the call because the session
    /// has expired. This is the only error the session wrapper retries.
    pub fn is_not_authenticated(&self) -> bool {
        match self {
            Self::Console {
                message: Some(message),
                ..
            } => message.trim() == NOT_AUTHENTICATED_MESSAGE,
            _ => false,
        }
    }

    /// Returns `true` if this is a transient error worth retrying.
    ///
    /// The client itself never retries these; callers can use this to
    /// drive their own backoff.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Bridge { status, .. } => matches!(status, 502..=504),
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Bridge { status: 404, .. })
    }

    /// Returns `true` for errors raised before any network I/O because the
    /// caller asked for something invalid.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::Usage { .. } | Self::UnsupportedOperation { .. })
    }

    /// Parse the body of a [`Bridge`](Self::Bridge) error as JSON, if it is JSON.
    pub fn bridge_detail(&self) -> Option<serde_json::Value> {
        match self {
            Self::Bridge { body, .. } => serde_json::from_str(body).ok(),
            _ => None,
        }
    }
}
