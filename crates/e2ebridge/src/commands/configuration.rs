//! Preferences and settings command handlers.

use serde_json::Value;
use tabled::Tabled;

use e2ebridge_api::{Preferences, ServiceSettings, Setting};

use crate::cli::{
    GlobalOpts, OutputFormat, PreferencesArgs, PreferencesCommand, SettingsArgs, SettingsCommand,
};
use crate::config::Target;
use crate::error::CliError;
use crate::output;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct PreferenceRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Value")]
    value: String,
}

#[derive(Tabled)]
struct SettingRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Section")]
    section: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Value")]
    value: String,
}

impl From<&Setting> for SettingRow {
    fn from(s: &Setting) -> Self {
        Self {
            id: s.id.clone(),
            section: s.section.clone().unwrap_or_default(),
            label: s.label.clone().unwrap_or_default(),
            value: output::cell(Some(&s.current_value)),
        }
    }
}

fn render_preferences(global: &GlobalOpts, preferences: &Preferences) -> Result<(), CliError> {
    let entries: Vec<(&String, &Value)> = preferences.iter().collect();
    let format = global.output();
    let rendered = match format {
        OutputFormat::Table | OutputFormat::Plain => output::render_list(
            &format,
            &entries,
            |&(k, v)| PreferenceRow {
                key: k.clone(),
                value: output::cell(Some(v)),
            },
            |&(k, v)| format!("{k}={}", output::cell(Some(v))),
        )?,
        _ => output::render_value(&format, &Value::Object(preferences.clone()))?,
    };
    output::print_output(&rendered, global.quiet);
    Ok(())
}

fn render_settings(global: &GlobalOpts, settings: &ServiceSettings) -> Result<(), CliError> {
    let rendered = output::render_list(
        &global.output(),
        &settings.setting,
        |s| SettingRow::from(s),
        |s| format!("{}={}", s.id, output::cell(Some(&s.current_value))),
    )?;
    output::print_output(&rendered, global.quiet);
    Ok(())
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn handle_preferences(
    target: &Target,
    args: PreferencesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let client = &target.client;
    match args.command {
        PreferencesCommand::Get(service) => {
            let preferences = client.service_preferences(service.kind, &service.name).await?;
            render_preferences(global, &preferences)
        }

        PreferencesCommand::Set { service, changes } => {
            let changes: Preferences = changes.into_iter().collect();
            let updated = client
                .set_service_preferences(service.kind, &service.name, &changes)
                .await?;
            output::success(
                global,
                &format!("Updated {} preference(s) of '{}'", changes.len(), service.name),
            );
            render_preferences(global, &updated)
        }
    }
}

pub async fn handle_settings(
    target: &Target,
    args: SettingsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let client = &target.client;
    match args.command {
        SettingsCommand::Get(service) => {
            let settings = client.service_settings(service.kind, &service.name).await?;
            render_settings(global, &settings)
        }

        SettingsCommand::Set { service, changes } => {
            let count = changes.len();
            let updated = client
                .set_service_settings(service.kind, &service.name, changes)
                .await?;
            output::success(
                global,
                &format!("Updated {count} setting(s) of '{}'", service.name),
            );
            render_settings(global, &updated)
        }
    }
}
