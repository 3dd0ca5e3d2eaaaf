//! Shared configuration for E2E Bridge tools.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext), and
//! translation of a profile into an `e2ebridge_api::Connection` plus
//! `TransportConfig`. The CLI layers its per-invocation flags on top.

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

use e2ebridge_api::{Connection, Credentials, DEFAULT_HOST, DEFAULT_PORT, TlsMode, TransportConfig};

/// Keyring service name. Entries are keyed `{profile}/password`.
pub const KEYRING_SERVICE: &str = "e2ebridge";

/// Environment variable prefix for config overrides.
pub const ENV_PREFIX: &str = "E2EBRIDGE_";

/// Password variable consulted when a profile names none of its own.
pub const PASSWORD_ENV: &str = "E2EBRIDGE_PASSWORD";

/// Node used for console status changes when a profile names none.
pub const DEFAULT_NODE: &str = "localhost";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no user configured for profile '{profile}'")]
    NoUser { profile: String },

    #[error("no password configured for profile '{profile}'")]
    NoPassword { profile: String },

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

    /// Named Bridge profiles.
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

impl Config {
    /// The profile to use when none is named explicitly.
    pub fn active_profile_name(&self) -> &str {
        self.default_profile.as_deref().unwrap_or("default")
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Bridges ship with a self-signed certificate, so this defaults to on.
    #[serde(default = "default_insecure")]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: default_insecure(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_insecure() -> bool {
    true
}
fn default_timeout() -> u64 {
    30
}

/// A named Bridge profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Bridge host name or address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Administration port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bridge user.
    pub user: Option<String>,

    /// Password (plaintext -- prefer keyring or env var).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Environment variable name containing the password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_env: Option<String>,

    /// Default node for console status changes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node: Option<String>,

    /// Path to custom CA certificate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,

    /// Override timeout (seconds).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

fn default_host() -> String {
    DEFAULT_HOST.into()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            user: None,
            password: None,
            password_env: None,
            node: None,
            ca_cert: None,
            insecure: None,
            timeout: None,
        }
    }
}

impl Profile {
    pub fn node(&self) -> &str {
        self.node.as_deref().unwrap_or(DEFAULT_NODE)
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "e2ebridge", "e2ebridge").map_or_else(
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
    p.push("e2ebridge");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config from `path` + environment. A missing file yields defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if it can't be read.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution (without CLI flags) ───────────────────────

/// Resolve the password for `profile_name`.
///
/// Order: the profile's `password_env` variable, `E2EBRIDGE_PASSWORD`, the
/// system keyring, then plaintext in the config.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    resolve_password_with(
        profile,
        profile_name,
        |name| std::env::var(name).ok(),
        |key| {
            keyring::Entry::new(KEYRING_SERVICE, key)
                .ok()
                .and_then(|entry| entry.get_password().ok())
        },
    )
}

fn resolve_password_with(
    profile: &Profile,
    profile_name: &str,
    env: impl Fn(&str) -> Option<String>,
    keyring: impl Fn(&str) -> Option<String>,
) -> Result<SecretString, ConfigError> {
    // 1. Profile's password_env → env var lookup
    if let Some(pw) = profile.password_env.as_deref().and_then(&env) {
        return Ok(SecretString::from(pw));
    }

    // 2. Shared env var
    if let Some(pw) = env(PASSWORD_ENV) {
        return Ok(SecretString::from(pw));
    }

    // 3. System keyring
    if let Some(pw) = keyring(&keyring_key(profile_name)) {
        return Ok(SecretString::from(pw));
    }

    // 4. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoPassword {
        profile: profile_name.into(),
    })
}

/// Keyring entry name for a profile's password.
pub fn keyring_key(profile_name: &str) -> String {
    format!("{profile_name}/password")
}

/// Store a profile's password in the system keyring.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &keyring_key(profile_name)).map_err(|e| {
        ConfigError::Validation {
            field: "keyring".into(),
            reason: e.to_string(),
        }
    })?;
    entry
        .set_password(password)
        .map_err(|e| ConfigError::Validation {
            field: "keyring".into(),
            reason: e.to_string(),
        })
}

/// User and resolved password for a profile.
pub fn resolve_credentials(profile: &Profile, profile_name: &str) -> Result<Credentials, ConfigError> {
    let user = profile.user.clone().ok_or_else(|| ConfigError::NoUser {
        profile: profile_name.into(),
    })?;
    let password = resolve_password(profile, profile_name)?;
    Ok(Credentials { user, password })
}

// ── Translation to client config ────────────────────────────────────

/// TLS mode for a profile: an explicit `insecure = true` wins, then a
/// custom CA, then the global default.
pub fn tls_mode(profile: &Profile, defaults: &Defaults) -> TlsMode {
    if profile.insecure == Some(true) {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else if profile.insecure.unwrap_or(defaults.insecure) {
        TlsMode::DangerAcceptInvalid
    } else {
        TlsMode::System
    }
}

pub fn transport_config(profile: &Profile, defaults: &Defaults) -> TransportConfig {
    TransportConfig {
        tls: tls_mode(profile, defaults),
        timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
        cookie_jar: None,
    }
}

/// Build the connection and transport settings for a profile, with no
/// CLI flag overrides.
pub fn profile_to_client_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<(Connection, TransportConfig), ConfigError> {
    if profile.host.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: "host".into(),
            reason: "must not be empty".into(),
        });
    }
    let credentials = resolve_credentials(profile, profile_name)?;
    Ok((
        Connection::new(profile.host.clone(), profile.port, credentials),
        transport_config(profile, defaults),
    ))
}
