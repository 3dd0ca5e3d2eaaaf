//! CLI configuration: thin wrapper around `e2ebridge_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--host, --user, etc.).

use clap::ValueEnum;
use secrecy::SecretString;
use tracing::{debug, warn};

use e2ebridge_api::{BridgeClient, Connection, Credentials};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use e2ebridge_config::{
    Config, Profile, config_path, load_config, load_config_or_default, save_config,
};

/// A connected Bridge plus what the commands need to know about the profile.
pub struct Target {
    pub client: BridgeClient,
    pub profile: String,
    /// Node addressed by console status changes unless `--node` is given.
    pub node: String,
}

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .unwrap_or_else(|| config.active_profile_name().to_owned())
}

/// Fill output and color from `[defaults]` where no flag was given.
pub fn apply_defaults(global: &mut GlobalOpts, config: &Config) {
    if global.output.is_none() {
        global.output = parse_default("output", &config.defaults.output);
    }
    if global.color.is_none() {
        global.color = parse_default("color", &config.defaults.color);
    }
}

fn parse_default<T: ValueEnum>(key: &str, raw: &str) -> Option<T> {
    T::from_str(raw, true)
        .inspect_err(|_| warn!(key, value = raw, "ignoring invalid default"))
        .ok()
}

/// Look up the active profile. An explicitly named profile must exist; the
/// implicit default may be absent, in which case flags alone describe the
/// Bridge.
pub fn resolve_profile(global: &GlobalOpts, config: &Config) -> Result<(String, Profile), CliError> {
    let name = active_profile_name(global, config);
    if let Some(profile) = config.profiles.get(&name) {
        return Ok((name, profile.clone()));
    }
    if global.profile.is_some() {
        return Err(profile_not_found(name, config));
    }
    debug!(profile = %name, "no such profile, using flags and defaults");
    Ok((name, Profile::default()))
}

pub fn profile_not_found(name: String, config: &Config) -> CliError {
    let mut available: Vec<_> = config.profiles.keys().cloned().collect();
    available.sort();
    CliError::ProfileNotFound {
        name,
        available: if available.is_empty() {
            "(none)".into()
        } else {
            available.join(", ")
        },
    }
}

/// Apply per-invocation flags on top of a profile.
///
/// CLI flag overrides take priority over profile values.
pub fn apply_overrides(profile: &mut Profile, global: &GlobalOpts) {
    if let Some(ref host) = global.host {
        profile.host.clone_from(host);
    }
    if let Some(port) = global.port {
        profile.port = port;
    }
    if let Some(ref user) = global.user {
        profile.user = Some(user.clone());
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
}

fn resolve_credentials(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
) -> Result<Credentials, CliError> {
    match global.password {
        Some(ref password) => {
            let user = profile.user.clone().ok_or_else(|| CliError::NoCredentials {
                profile: profile_name.into(),
            })?;
            Ok(Credentials {
                user,
                password: SecretString::from(password.clone()),
            })
        }
        None => Ok(e2ebridge_config::resolve_credentials(profile, profile_name)?),
    }
}

/// Build a `BridgeClient` from the config file, profile, and CLI overrides.
pub fn connect(global: &GlobalOpts, config: &Config) -> Result<Target, CliError> {
    let (name, mut profile) = resolve_profile(global, config)?;
    apply_overrides(&mut profile, global);

    if profile.host.trim().is_empty() {
        return Err(CliError::Validation {
            field: "host".into(),
            reason: "must not be empty".into(),
        });
    }

    let credentials = resolve_credentials(&profile, &name, global)?;
    let connection = Connection::new(profile.host.clone(), profile.port, credentials);
    let transport = e2ebridge_config::transport_config(&profile, &config.defaults);
    debug!(
        profile = %name,
        host = %connection.host,
        port = connection.port,
        "connecting"
    );

    let client = BridgeClient::new(&connection, &transport)?;
    Ok(Target {
        client,
        node: profile.node().to_owned(),
        profile: name,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::{Cli, ColorMode, OutputFormat};

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["e2ebridge"];
        argv.extend_from_slice(args);
        argv.extend_from_slice(&["pack"]);
        Cli::try_parse_from(argv).unwrap().global
    }

    fn config_with(name: &str, profile: Profile) -> Config {
        let mut config = Config::default();
        config.profiles.insert(name.into(), profile);
        config
    }

    #[test]
    fn flags_override_profile_values() {
        let mut profile = Profile {
            host: "bridge.local".into(),
            user: Some("admin".into()),
            ..Profile::default()
        };
        let opts = global(&["--host", "other", "--port", "11186", "-u", "ops", "-k"]);
        apply_overrides(&mut profile, &opts);

        assert_eq!(profile.host, "other");
        assert_eq!(profile.port, 11186);
        assert_eq!(profile.user.as_deref(), Some("ops"));
        assert_eq!(profile.insecure, Some(true));
        assert_eq!(profile.timeout, None);
    }

    #[test]
    fn named_profile_must_exist() {
        let config = config_with("prod", Profile::default());
        let err = resolve_profile(&global(&["--profile", "staging"]), &config).unwrap_err();
        assert!(
            matches!(&err, CliError::ProfileNotFound { available, .. } if available == "prod"),
            "got {err:?}"
        );
    }

    #[test]
    fn implicit_default_profile_may_be_missing() {
        let (name, profile) = resolve_profile(&global(&[]), &Config::default()).unwrap();
        assert_eq!(name, "default");
        assert_eq!(profile.host, e2ebridge_api::DEFAULT_HOST);
    }

    #[test]
    fn password_flag_needs_a_user() {
        let opts = global(&["--password", "secret"]);
        let err = resolve_credentials(&Profile::default(), "default", &opts).unwrap_err();
        assert!(matches!(err, CliError::NoCredentials { .. }), "got {err:?}");

        let opts = global(&["--password", "secret", "--user", "admin"]);
        let mut profile = Profile::default();
        apply_overrides(&mut profile, &opts);
        let credentials = resolve_credentials(&profile, "default", &opts).unwrap();
        assert_eq!(credentials.user, "admin");
    }

    #[test]
    fn config_defaults_fill_unset_flags() {
        let mut config = Config::default();
        config.defaults.output = "yaml".into();
        config.defaults.color = "bogus".into();

        let mut opts = global(&[]);
        apply_defaults(&mut opts, &config);
        assert_eq!(opts.output(), OutputFormat::Yaml);
        assert_eq!(opts.color(), ColorMode::Auto);

        let mut opts = global(&["-o", "json"]);
        apply_defaults(&mut opts, &config);
        assert_eq!(opts.output(), OutputFormat::Json);
    }
}
