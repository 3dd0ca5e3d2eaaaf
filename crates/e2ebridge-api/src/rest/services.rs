// Service lifecycle endpoints
//
// Listing, status, start/stop/kill, removal and deployment under
// `/services`. Every path goes through the endpoint table first.

use std::path::Path;

use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::debug;

use crate::endpoints::{Verb, resolve};
use crate::error::Error;
use crate::kind::{ServiceAction, ServiceKind};
use crate::models::DeployOptions;
use crate::rest::client::RestClient;

/// Multipart field the Bridge reads deployments and uploads from.
pub(crate) const UPLOAD_FIELD: &str = "uploadFile";
/// File name sent with in-memory repositories.
pub(crate) const BUFFER_FILE_NAME: &str = "repository.zip";
/// Content type of repository archives.
pub(crate) const ZIP_MIME: &str = "application/zip";
/// Content type of uploaded resource files.
pub(crate) const OCTET_STREAM_MIME: &str = "application/octet-stream";

impl RestClient {
    /// List deployed services, all kinds or just one.
    pub async fn list_services(&self, kind: Option<ServiceKind>) -> Result<Value, Error> {
        let path = match kind {
            Some(kind) => resolve(Verb::Get, &["services", kind.rest_segment()])?,
            None => resolve(Verb::Get, &["services"])?,
        };
        Ok(self
            .execute(Verb::Get, &path, None, &[])
            .await?
            .unwrap_or(Value::Null))
    }

    pub async fn service_status(&self, kind: ServiceKind, name: &str) -> Result<Value, Error> {
        let path = resolve(Verb::Get, &["services", kind.rest_segment(), name])?;
        Ok(self
            .execute(Verb::Get, &path, None, &[])
            .await?
            .unwrap_or(Value::Null))
    }

    /// Start, stop or kill an instance.
    ///
    /// `Kill` on a Node.js or Java service is rejected by the endpoint
    /// table before any request is sent.
    pub async fn set_service_status(
        &self,
        kind: ServiceKind,
        name: &str,
        action: ServiceAction,
    ) -> Result<Option<Value>, Error> {
        let path = resolve(
            Verb::Put,
            &["services", kind.rest_segment(), name, action.as_str()],
        )?;
        self.execute(Verb::Put, &path, None, &[]).await
    }

    pub async fn remove_service(&self, kind: ServiceKind, name: &str) -> Result<Option<Value>, Error> {
        let path = resolve(Verb::Delete, &["services", kind.rest_segment(), name])?;
        self.execute(Verb::Delete, &path, None, &[]).await
    }

    // ── Deployment ───────────────────────────────────────────────────

    /// Deploy an in-memory repository archive.
    pub async fn deploy_bytes(
        &self,
        repository: &[u8],
        options: &DeployOptions,
    ) -> Result<Option<Value>, Error> {
        let part = Part::bytes(repository.to_vec())
            .file_name(BUFFER_FILE_NAME)
            .mime_str(ZIP_MIME)?;
        self.deploy_part(part, options).await
    }

    /// Deploy a repository archive already on disk.
    pub async fn deploy_file(
        &self,
        file: &Path,
        options: &DeployOptions,
    ) -> Result<Option<Value>, Error> {
        let part = file_part(file, ZIP_MIME).await?;
        self.deploy_part(part, options).await
    }

    async fn deploy_part(&self, part: Part, options: &DeployOptions) -> Result<Option<Value>, Error> {
        let path = resolve(Verb::Post, &["services"])?;
        let form = Form::new().part(UPLOAD_FIELD, part);
        self.execute_multipart(Verb::Post, &path, form, &options.to_pairs())
            .await
    }
}

/// Read `file` into a multipart part named after the file.
pub(crate) async fn file_part(file: &Path, mime: &str) -> Result<Part, Error> {
    let content = tokio::fs::read(file)
        .await
        .map_err(|e| Error::filesystem(file, e))?;
    debug!(file = %file.display(), size = content.len(), "attaching upload");

    let name = file
        .file_name()
        .map_or_else(|| BUFFER_FILE_NAME.to_owned(), |n| n.to_string_lossy().into_owned());
    Ok(Part::bytes(content).file_name(name).mime_str(mime)?)
}
