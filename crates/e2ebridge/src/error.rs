//! CLI error types with miette diagnostics.
//!
//! Maps library and config errors into user-facing errors with actionable
//! help text and a stable exit code.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use e2ebridge_api::Error as ApiError;
use e2ebridge_config::ConfigError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to the Bridge at {url}")]
    #[diagnostic(
        code(e2ebridge::connection_failed),
        help(
            "Check that the Bridge is running and that host and port are right.\n\
             The administration port is usually 8080."
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: ApiError,
    },

    #[error("TLS setup failed: {message}")]
    #[diagnostic(
        code(e2ebridge::tls_error),
        help(
            "Bridges ship with a self-signed certificate.\n\
             Use --insecure (-k) to accept it, or configure ca_cert in your profile."
        )
    )]
    TlsError { message: String },

    #[error("Request to {url} timed out")]
    #[diagnostic(
        code(e2ebridge::timeout),
        help("Increase the timeout with --timeout or check the Bridge's load.")
    )]
    Timeout { url: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(e2ebridge::auth_failed),
        help(
            "Verify user and password for profile '{profile}'.\n\
             Run: e2ebridge config set-password --profile {profile}"
        )
    )]
    AuthFailed { profile: String, message: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(e2ebridge::no_credentials),
        help(
            "Configure credentials with: e2ebridge config init\n\
             Or pass --user and set the E2EBRIDGE_PASSWORD environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Bridge answers ───────────────────────────────────────────────

    #[error("Not found on the Bridge: {detail}")]
    #[diagnostic(
        code(e2ebridge::not_found),
        help("Run: e2ebridge services list to see what is deployed.")
    )]
    NotFound { detail: String },

    #[error("Bridge error ({status}): {message}")]
    #[diagnostic(code(e2ebridge::api_error))]
    ApiError { status: String, message: String },

    #[error("Operation '{verb} {path}' is not supported by the Bridge")]
    #[diagnostic(
        code(e2ebridge::unsupported),
        help("Only xUML services can be killed, and only xUML services have notes and sessions.")
    )]
    Unsupported { verb: String, path: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(e2ebridge::validation))]
    Validation { field: String, reason: String },

    // ── Local work ───────────────────────────────────────────────────

    #[error("Cannot access {}", path.display())]
    #[diagnostic(code(e2ebridge::filesystem))]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Packing failed: {message}")]
    #[diagnostic(
        code(e2ebridge::pack),
        help("The project directory needs a package.json with \"name\" and \"version\".")
    )]
    Pack { message: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(e2ebridge::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: e2ebridge config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(e2ebridge::config))]
    Config(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(e2ebridge::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Could not render JSON output: {0}")]
    #[diagnostic(code(e2ebridge::json))]
    Json(#[from] serde_json::Error),

    #[error("Could not render YAML output: {0}")]
    #[diagnostic(code(e2ebridge::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::TlsError { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. }
            | Self::Unsupported { .. }
            | Self::ProfileNotFound { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Attach the active profile to authentication failures.
    pub fn for_profile(self, profile: &str) -> Self {
        match self {
            Self::AuthFailed { message, .. } => Self::AuthFailed {
                profile: profile.into(),
                message,
            },
            other => other,
        }
    }
}

// ── Library error → CliError mapping ─────────────────────────────────

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        if err.is_not_authenticated() {
            return Self::AuthFailed {
                profile: "current".into(),
                message: err.to_string(),
            };
        }
        if err.is_not_found() {
            let detail = match &err {
                ApiError::Bridge { body, .. } if !body.trim().is_empty() => body.trim().to_owned(),
                _ => "HTTP 404".into(),
            };
            return Self::NotFound { detail };
        }

        if let ApiError::Transport(e) = &err {
            let url = e
                .url()
                .map_or_else(|| "the Bridge".into(), ToString::to_string);
            if e.is_timeout() {
                return Self::Timeout { url };
            }
            if e.is_connect() {
                return Self::ConnectionFailed { url, source: err };
            }
        }

        match err {
            ApiError::Tls(message) => Self::TlsError { message },
            ApiError::Authentication { message } => Self::AuthFailed {
                profile: "current".into(),
                message,
            },
            ApiError::Bridge { status: 401 | 403, body } => Self::AuthFailed {
                profile: "current".into(),
                message: body,
            },
            ApiError::Bridge { status, body } => Self::ApiError {
                status: format!("HTTP {status}"),
                message: body,
            },
            ApiError::Console { status, message } => Self::ApiError {
                status,
                message: message.unwrap_or_else(|| "no message".into()),
            },
            ApiError::Usage { message } => Self::Validation {
                field: "input".into(),
                reason: message,
            },
            ApiError::UnsupportedOperation { verb, path } => Self::Unsupported { verb, path },
            ApiError::Filesystem { path, source } => Self::Filesystem { path, source },
            ApiError::Pack(message) => Self::Pack { message },
            ApiError::InvalidUrl(e) => Self::Validation {
                field: "host".into(),
                reason: e.to_string(),
            },
            other @ (ApiError::Transport(_) | ApiError::Deserialization { .. }) => {
                Self::ApiError {
                    status: "transport".into(),
                    message: other.to_string(),
                }
            }
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoUser { profile } | ConfigError::NoPassword { profile } => {
                Self::NoCredentials { profile }
            }
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(other),
        }
    }
}
