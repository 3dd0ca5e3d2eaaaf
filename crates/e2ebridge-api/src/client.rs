// BridgeClient: one handle for both administrative surfaces
//
// REST operations go through the stateless `RestClient`; console operations
// through the session-holding `ConsoleClient`. Deploying a directory packs
// it into a temporary archive first.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use secrecy::SecretString;
use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::auth::{Connection, Credentials};
use crate::console::ConsoleClient;
use crate::error::Error;
use crate::kind::{ResourceType, ServiceAction, ServiceKind};
use crate::models::{DeployOptions, ModelNotes, Preferences, ResourceList, ServiceSettings};
use crate::pack::{PackOptions, archive_name, pack};
use crate::rest::RestClient;
use crate::transport::TransportConfig;

/// Client for one Bridge, covering the REST API and the legacy console.
///
/// REST calls carry no state and may run concurrently. Console calls share
/// one cookie session that is established on first use and renewed once
/// when the console reports it expired.
pub struct BridgeClient {
    rest: RestClient,
    console: ConsoleClient,
}

impl BridgeClient {
    pub fn new(connection: &Connection, transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            rest: RestClient::new(connection, transport)?,
            console: ConsoleClient::new(connection, transport)?,
        })
    }

    /// Assemble from pre-built clients (tests, custom transports).
    pub fn from_parts(rest: RestClient, console: ConsoleClient) -> Self {
        Self { rest, console }
    }

    pub fn rest(&self) -> &RestClient {
        &self.rest
    }

    pub fn console(&self) -> &ConsoleClient {
        &self.console
    }

    // ── Services (REST) ──────────────────────────────────────────────

    pub async fn list_services(&self, kind: Option<ServiceKind>) -> Result<Value, Error> {
        self.rest.list_services(kind).await
    }

    pub async fn service_status(&self, kind: ServiceKind, name: &str) -> Result<Value, Error> {
        self.rest.service_status(kind, name).await
    }

    pub async fn set_service_status(
        &self,
        kind: ServiceKind,
        name: &str,
        action: ServiceAction,
    ) -> Result<Option<Value>, Error> {
        self.rest.set_service_status(kind, name, action).await
    }

    pub async fn start_service(&self, kind: ServiceKind, name: &str) -> Result<Option<Value>, Error> {
        self.set_service_status(kind, name, ServiceAction::Start).await
    }

    pub async fn stop_service(&self, kind: ServiceKind, name: &str) -> Result<Option<Value>, Error> {
        self.set_service_status(kind, name, ServiceAction::Stop).await
    }

    /// Kill an instance. Only xUML services support this.
    pub async fn kill_service(&self, kind: ServiceKind, name: &str) -> Result<Option<Value>, Error> {
        self.set_service_status(kind, name, ServiceAction::Kill).await
    }

    pub async fn remove_service(&self, kind: ServiceKind, name: &str) -> Result<Option<Value>, Error> {
        self.rest.remove_service(kind, name).await
    }

    // ── Deployment ───────────────────────────────────────────────────

    pub async fn deploy_bytes(
        &self,
        repository: &[u8],
        options: &DeployOptions,
    ) -> Result<Option<Value>, Error> {
        self.rest.deploy_bytes(repository, options).await
    }

    /// Deploy a repository file, or pack and deploy a project directory.
    ///
    /// A packed archive is temporary and removed whether or not the upload
    /// succeeds.
    pub async fn deploy_path(
        &self,
        path: &Path,
        options: &DeployOptions,
    ) -> Result<Option<Value>, Error> {
        let repository = Repository::prepare(path).await?;
        self.rest.deploy_file(repository.path(), options).await
    }

    // ── xUML artefacts ───────────────────────────────────────────────

    pub async fn service_info(&self, name: &str) -> Result<Value, Error> {
        self.rest.service_info(name).await
    }

    pub async fn model_notes_list(&self, name: &str) -> Result<ModelNotes, Error> {
        self.rest.model_notes_list(name).await
    }

    pub async fn model_note(&self, name: &str, file: &str) -> Result<String, Error> {
        self.rest.model_note(name, file).await
    }

    pub async fn custom_notes(&self, name: &str) -> Result<String, Error> {
        self.rest.custom_notes(name).await
    }

    pub async fn service_repository(&self, kind: ServiceKind, name: &str) -> Result<Bytes, Error> {
        self.rest.service_repository(kind, name).await
    }

    pub async fn service_sessions(&self, name: &str) -> Result<Value, Error> {
        self.rest.service_sessions(name).await
    }

    pub async fn cancel_session(&self, name: &str, session_id: &str) -> Result<Option<Value>, Error> {
        self.rest.cancel_session(name, session_id).await
    }

    // ── Configuration ────────────────────────────────────────────────

    pub async fn service_preferences(&self, kind: ServiceKind, name: &str) -> Result<Preferences, Error> {
        self.rest.service_preferences(kind, name).await
    }

    pub async fn set_service_preferences(
        &self,
        kind: ServiceKind,
        name: &str,
        changes: &Preferences,
    ) -> Result<Preferences, Error> {
        self.rest.set_service_preferences(kind, name, changes).await
    }

    pub async fn service_settings(&self, kind: ServiceKind, name: &str) -> Result<ServiceSettings, Error> {
        self.rest.service_settings(kind, name).await
    }

    pub async fn set_service_settings<K>(
        &self,
        kind: ServiceKind,
        name: &str,
        changes: impl IntoIterator<Item = (K, Value)>,
    ) -> Result<ServiceSettings, Error>
    where
        K: Into<String>,
    {
        self.rest.set_service_settings(kind, name, changes).await
    }

    // ── Resource catalogue ───────────────────────────────────────────

    pub async fn list_resources(&self, kind: ResourceType) -> Result<ResourceList, Error> {
        self.rest.list_resources(kind).await
    }

    pub async fn upload_resource(&self, kind: ResourceType, file: &Path) -> Result<Option<Value>, Error> {
        self.rest.upload_resource(kind, file).await
    }

    pub async fn upload_resource_bytes(
        &self,
        kind: ResourceType,
        content: &[u8],
        file_name: &str,
    ) -> Result<Option<Value>, Error> {
        self.rest.upload_resource_bytes(kind, content, file_name).await
    }

    pub async fn download_resource(&self, kind: ResourceType, name: &str) -> Result<Bytes, Error> {
        self.rest.download_resource(kind, name).await
    }

    pub async fn delete_resource(&self, kind: ResourceType, name: &str) -> Result<Option<Value>, Error> {
        self.rest.delete_resource(kind, name).await
    }

    // ── Legacy console ───────────────────────────────────────────────

    /// Force a console login. `credentials` apply to this login only.
    pub async fn login(&self, credentials: Option<&Credentials>) -> Result<(), Error> {
        self.console.login(credentials).await
    }

    pub async fn console_set_service_status(
        &self,
        kind: ServiceKind,
        name: &str,
        node: &str,
        action: ServiceAction,
    ) -> Result<(), Error> {
        self.console.set_service_status(kind, name, node, action).await
    }

    pub async fn console_remove_service(&self, kind: ServiceKind, name: &str, node: &str) -> Result<(), Error> {
        self.console.remove_service(kind, name, node).await
    }

    pub async fn console_deploy_bytes(&self, repository: Bytes, options: &DeployOptions) -> Result<(), Error> {
        self.console
            .deploy_bytes(repository, crate::rest::BUFFER_FILE_NAME, options)
            .await
    }

    /// Console counterpart of [`deploy_path`](Self::deploy_path).
    pub async fn console_deploy_path(&self, path: &Path, options: &DeployOptions) -> Result<(), Error> {
        let repository = Repository::prepare(path).await?;
        self.console.deploy_file(repository.path(), options).await
    }

    pub async fn create_group(&self, id: &str, name: &str) -> Result<(), Error> {
        self.console.create_group(id, name).await
    }

    pub async fn delete_group(&self, id: &str) -> Result<(), Error> {
        self.console.delete_group(id).await
    }

    pub async fn create_user(
        &self,
        id: &str,
        name: &str,
        password: &SecretString,
        group: &str,
    ) -> Result<(), Error> {
        self.console.create_user(id, name, password, group).await
    }

    pub async fn delete_user(&self, id: &str) -> Result<(), Error> {
        self.console.delete_user(id).await
    }
}

/// An archive ready for upload: the caller's file, or a packed temp file
/// deleted on drop.
enum Repository {
    File(PathBuf),
    Packed(NamedTempFile),
}

impl Repository {
    async fn prepare(path: &Path) -> Result<Self, Error> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| Error::filesystem(path, e))?;
        if !metadata.is_dir() {
            return Ok(Self::File(path.to_path_buf()));
        }

        let name = archive_name(path)?;
        let prefix = format!("{}-", name.trim_end_matches(".zip"));
        let temp = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(".zip")
            .tempfile()
            .map_err(|e| Error::filesystem(std::env::temp_dir(), e))?;

        let dir = path.to_path_buf();
        let options = PackOptions {
            output: Some(temp.path().to_path_buf()),
        };
        debug!(dir = %dir.display(), archive = %temp.path().display(), "packing for deployment");
        tokio::task::spawn_blocking(move || pack(&dir, &options))
            .await
            .map_err(|e| Error::Pack(format!("packing task failed: {e}")))??;

        Ok(Self::Packed(temp))
    }

    fn path(&self) -> &Path {
        match self {
            Self::File(path) => path,
            Self::Packed(temp) => temp.path(),
        }
    }
}
