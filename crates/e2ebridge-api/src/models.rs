// Typed shapes for the REST payloads whose layout is stable across Bridge
// versions. Everything else is handed out as `serde_json::Value`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `GET /xuml/{type}` listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceList {
    #[serde(default)]
    pub file: Vec<ResourceFile>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceFile {
    pub name: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub href: Option<String>,
    /// Human-readable size as reported by the Bridge, e.g. `"98 KB"`.
    #[serde(default)]
    pub file_size: Option<String>,
}

/// `GET /services/{kind}/{name}/settings`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceSettings {
    #[serde(default)]
    pub setting: Vec<Setting>,
}

impl ServiceSettings {
    pub fn get(&self, id: &str) -> Option<&Setting> {
        self.setting.iter().find(|s| s.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Setting {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub current_value: Value,
    #[serde(default)]
    pub original_value_in_model: Option<String>,
}

/// `GET /services/xuml/{name}/modelnotes`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelNotes {
    #[serde(default)]
    pub notes: Vec<Note>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub name: String,
    pub href: String,
}

impl Note {
    /// The note's file name, i.e. the last segment of `href`.
    pub fn file_name(&self) -> &str {
        self.href.rsplit('/').next().unwrap_or(&self.href)
    }
}

/// Service preferences: a flat object of primitive values.
pub type Preferences = Map<String, Value>;

/// Query options for deploying a repository.
///
/// Unset fields are omitted and the Bridge applies its own defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub startup: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overwrite: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overwrite_prefs: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub npm_install: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_scripts: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_name: Option<String>,
}

impl DeployOptions {
    /// Options as string pairs, in declaration order.
    ///
    /// Used for console multipart fields, where serde's query encoder
    /// does not apply.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let flags = [
            ("startup", self.startup),
            ("overwrite", self.overwrite),
            ("overwritePrefs", self.overwrite_prefs),
            ("npmInstall", self.npm_install),
            ("runScripts", self.run_scripts),
        ];
        let mut pairs: Vec<_> = flags
            .into_iter()
            .filter_map(|(k, v)| v.map(|v| (k, v.to_string())))
            .collect();
        if let Some(ref name) = self.instance_name {
            pairs.push(("instanceName", name.clone()));
        }
        pairs
    }
}
