//! Config subcommand handlers.

use dialoguer::{Confirm, Input, Select};

use e2ebridge_api::{DEFAULT_HOST, DEFAULT_PORT};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config::{self, Profile};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn parse_value<T: std::str::FromStr>(field: &str, value: &str, expected: &str) -> Result<T, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: field.into(),
        reason: format!("must be {expected}"),
    })
}

/// Set one profile key from its string form.
fn set_profile_key(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    match key {
        "host" => profile.host = value,
        "port" => profile.port = parse_value("port", &value, "a port number")?,
        "user" => profile.user = Some(value),
        "password_env" | "password-env" => profile.password_env = Some(value),
        "node" => profile.node = Some(value),
        "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
        "insecure" => {
            profile.insecure = Some(parse_value("insecure", &value, "'true' or 'false'")?);
        }
        "timeout" => {
            profile.timeout = Some(parse_value("timeout", &value, "a number (seconds)")?);
        }
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!(
                    "unknown config key '{other}'. Valid keys: host, port, user, \
                     password_env, node, ca_cert, insecure, timeout"
                ),
            });
        }
    }
    Ok(())
}

// ── Init wizard ─────────────────────────────────────────────────────

fn init() -> Result<(), CliError> {
    let config_path = config::config_path();
    eprintln!("E2E Bridge CLI configuration wizard");
    eprintln!("   Config path: {}\n", config_path.display());

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    let host: String = Input::new()
        .with_prompt("Bridge host")
        .default(DEFAULT_HOST.into())
        .interact_text()
        .map_err(prompt_err)?;

    let port: u16 = Input::new()
        .with_prompt("Administration port")
        .default(DEFAULT_PORT)
        .interact_text()
        .map_err(prompt_err)?;

    let user: String = Input::new()
        .with_prompt("User")
        .interact_text()
        .map_err(prompt_err)?;

    let pass = rpassword::prompt_password("Password: ").map_err(prompt_err)?;
    if user.is_empty() || pass.is_empty() {
        return Err(CliError::Validation {
            field: "credentials".into(),
            reason: "user and password cannot be empty".into(),
        });
    }

    let store_choices = &[
        "Store password in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let store_selection = Select::new()
        .with_prompt("Where to store the password?")
        .items(store_choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    let password = if store_selection == 0 {
        e2ebridge_config::store_password(&profile_name, &pass)?;
        eprintln!("   ✓ Password stored in system keyring");
        None
    } else {
        Some(pass)
    };

    let node: String = Input::new()
        .with_prompt("Default node for console operations")
        .default(e2ebridge_config::DEFAULT_NODE.into())
        .interact_text()
        .map_err(prompt_err)?;

    let verify_tls = Confirm::new()
        .with_prompt("Does the Bridge use a certificate your system trusts?")
        .default(false)
        .interact()
        .map_err(prompt_err)?;

    let profile = Profile {
        host,
        port,
        user: Some(user),
        password,
        node: Some(node),
        insecure: Some(!verify_tls),
        ..Profile::default()
    };

    let mut cfg = config::load_config().unwrap_or_default();
    cfg.profiles.insert(profile_name.clone(), profile);
    cfg.default_profile = Some(profile_name.clone());
    config::save_config(&cfg)?;

    eprintln!("\n✓ Configuration written to {}", config_path.display());
    eprintln!("  Active profile: {profile_name}");
    eprintln!("\n  Test it: e2ebridge services list");
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    if matches!(args.command, ConfigCommand::Init) {
        return init();
    }
    let mut cfg = config::load_config()?;

    match args.command {
        ConfigCommand::Init => init(),

        ConfigCommand::Show => {
            let out = match global.output() {
                OutputFormat::Table | OutputFormat::Plain => toml::to_string_pretty(&cfg)
                    .map_err(e2ebridge_config::ConfigError::from)?,
                format => output::render_value(&format, &serde_json::to_value(&cfg)?)?,
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Set { key, value } => {
            let profile_name = config::active_profile_name(global, &cfg);
            let profile = cfg.profiles.entry(profile_name.clone()).or_default();
            set_profile_key(profile, &key, value)?;
            config::save_config(&cfg)?;
            output::success(global, &format!("Set {key} on profile '{profile_name}'"));
            Ok(())
        }

        ConfigCommand::Profiles => {
            let default = cfg.active_profile_name();
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: e2ebridge config init");
            } else {
                let mut names: Vec<_> = cfg.profiles.keys().collect();
                names.sort();
                for name in names {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        ConfigCommand::Use { name } => {
            if !cfg.profiles.contains_key(&name) {
                return Err(config::profile_not_found(name, &cfg));
            }
            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            output::success(global, &format!("Default profile set to '{name}'"));
            Ok(())
        }

        ConfigCommand::SetPassword => {
            let profile_name = config::active_profile_name(global, &cfg);
            if !cfg.profiles.contains_key(&profile_name) {
                return Err(config::profile_not_found(profile_name, &cfg));
            }

            let secret = rpassword::prompt_password("Password: ").map_err(prompt_err)?;
            if secret.is_empty() {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "value cannot be empty".into(),
                });
            }
            e2ebridge_config::store_password(&profile_name, &secret)?;
            output::success(
                global,
                &format!("Password stored in system keyring for profile '{profile_name}'"),
            );
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn profile_keys_are_parsed_by_type() {
        let mut profile = Profile::default();
        set_profile_key(&mut profile, "host", "bridge.local".into()).unwrap();
        set_profile_key(&mut profile, "port", "11186".into()).unwrap();
        set_profile_key(&mut profile, "insecure", "false".into()).unwrap();
        set_profile_key(&mut profile, "ca-cert", "/etc/bridge.pem".into()).unwrap();

        assert_eq!(profile.host, "bridge.local");
        assert_eq!(profile.port, 11186);
        assert_eq!(profile.insecure, Some(false));
        assert_eq!(
            profile.ca_cert.as_deref(),
            Some(std::path::Path::new("/etc/bridge.pem"))
        );
    }

    #[test]
    fn bad_values_and_unknown_keys_are_rejected() {
        let mut profile = Profile::default();
        assert!(set_profile_key(&mut profile, "port", "eighty".into()).is_err());
        assert!(set_profile_key(&mut profile, "timeout", "-1".into()).is_err());
        let err = set_profile_key(&mut profile, "password", "x".into()).unwrap_err();
        assert!(matches!(err, CliError::Validation { .. }));
    }
}
