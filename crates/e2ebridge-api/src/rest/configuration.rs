// Preferences and settings endpoints
//
// Both setters are read-modify-write: fetch the current state, reject
// unknown keys locally, then PUT. Validation failures never reach the
// network.

use serde_json::{Map, Value, json};
use tracing::debug;

use crate::endpoints::{Verb, resolve};
use crate::error::Error;
use crate::kind::ServiceKind;
use crate::models::{Preferences, ServiceSettings};
use crate::rest::client::{RestClient, decode};

impl RestClient {
    // ── Preferences ──────────────────────────────────────────────────

    pub async fn service_preferences(
        &self,
        kind: ServiceKind,
        name: &str,
    ) -> Result<Preferences, Error> {
        let path = resolve(Verb::Get, &["services", kind.rest_segment(), name, "preferences"])?;
        let value = self.execute(Verb::Get, &path, None, &[]).await?;
        decode(value.unwrap_or_else(|| Value::Object(Map::new())))
    }

    /// Change some preferences, keeping the rest.
    ///
    /// Every key in `changes` must already exist with the same JSON type.
    /// Returns the Bridge's answer, or the merged preferences when the
    /// Bridge answers with an empty body.
    pub async fn set_service_preferences(
        &self,
        kind: ServiceKind,
        name: &str,
        changes: &Preferences,
    ) -> Result<Preferences, Error> {
        let current = self.service_preferences(kind, name).await?;
        let merged = merge_preferences(&current, changes)?;

        let path = resolve(Verb::Put, &["services", kind.rest_segment(), name, "preferences"])?;
        let body = Value::Object(merged.clone());
        match self.execute(Verb::Put, &path, Some(&body), &[]).await? {
            Some(answer) => decode(answer),
            None => Ok(merged),
        }
    }

    // ── Settings ─────────────────────────────────────────────────────

    pub async fn service_settings(
        &self,
        kind: ServiceKind,
        name: &str,
    ) -> Result<ServiceSettings, Error> {
        let path = resolve(Verb::Get, &["services", kind.rest_segment(), name, "settings"])?;
        let value = self.execute(Verb::Get, &path, None, &[]).await?;
        value.map_or_else(|| Ok(ServiceSettings::default()), decode)
    }

    /// Change settings by id. The PUT body lists the changes in the order
    /// given. When the Bridge answers with an empty body the settings are
    /// fetched again.
    pub async fn set_service_settings<K>(
        &self,
        kind: ServiceKind,
        name: &str,
        changes: impl IntoIterator<Item = (K, Value)>,
    ) -> Result<ServiceSettings, Error>
    where
        K: Into<String>,
    {
        let current = self.service_settings(kind, name).await?;
        let body = settings_update(&current, changes)?;

        let path = resolve(Verb::Put, &["services", kind.rest_segment(), name, "settings"])?;
        match self.execute(Verb::Put, &path, Some(&body), &[]).await? {
            Some(answer) => decode(answer),
            None => {
                debug!("empty settings answer, fetching current state");
                self.service_settings(kind, name).await
            }
        }
    }
}

/// JSON type name used in validation messages.
fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Deep-merge `changes` into `current`, rejecting unknown keys and type
/// changes at every level. Nested objects keep their untouched keys.
pub(crate) fn merge_preferences(
    current: &Preferences,
    changes: &Preferences,
) -> Result<Preferences, Error> {
    let mut merged = current.clone();
    merge_into(&mut merged, changes, "")?;
    Ok(merged)
}

fn merge_into(target: &mut Preferences, changes: &Preferences, prefix: &str) -> Result<(), Error> {
    for (key, value) in changes {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        let Some(existing) = target.get_mut(key) else {
            return Err(Error::usage(format!(
                "Property '{name}' is unknown to the Bridge."
            )));
        };
        if json_type(existing) != json_type(value) {
            return Err(Error::usage(format!(
                "Property '{name}' has a wrong type: expected {}, got {}.",
                json_type(existing),
                json_type(value)
            )));
        }
        match (existing, value) {
            (Value::Object(inner), Value::Object(nested)) => merge_into(inner, nested, &name)?,
            (slot, _) => *slot = value.clone(),
        }
    }
    Ok(())
}

/// Build `{"setting":[{"id","currentValue"}...]}` for the given changes.
pub(crate) fn settings_update<K>(
    current: &ServiceSettings,
    changes: impl IntoIterator<Item = (K, Value)>,
) -> Result<Value, Error>
where
    K: Into<String>,
{
    let mut setting = Vec::new();
    for (id, value) in changes {
        let id = id.into();
        if current.get(&id).is_none() {
            return Err(Error::usage(format!(
                "Setting '{id}' is unknown to the Bridge."
            )));
        }
        setting.push(json!({ "id": id, "currentValue": value }));
    }
    Ok(json!({ "setting": setting }))
}
