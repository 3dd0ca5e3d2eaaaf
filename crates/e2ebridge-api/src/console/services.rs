// Console service endpoints: status change, removal, deployment.

use std::path::Path;

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use tracing::debug;

use crate::console::client::ConsoleClient;
use crate::error::Error;
use crate::kind::{ServiceAction, ServiceKind};
use crate::models::DeployOptions;
use crate::rest::{BUFFER_FILE_NAME, UPLOAD_FIELD, ZIP_MIME};

const DEPLOY_ENDPOINT: &str = "/Deploy";

impl ConsoleClient {
    /// Start, stop or kill `name` on `node` via the kind's configuration form.
    pub async fn set_service_status(
        &self,
        kind: ServiceKind,
        name: &str,
        node: &str,
        action: ServiceAction,
    ) -> Result<(), Error> {
        let endpoint = kind.console_endpoints().status;
        let query = [("node", node), ("instance", name)];
        let fields = [("action", action.as_str())];
        self.with_session(|| self.post_form(endpoint, &fields, &query))
            .await
            .map(drop)
    }

    pub async fn remove_service(&self, kind: ServiceKind, name: &str, node: &str) -> Result<(), Error> {
        let endpoint = kind.console_endpoints().remove;
        let query = [("node", node), ("instance", name)];
        self.with_session(|| self.post_form(endpoint, &[], &query))
            .await
            .map(drop)
    }

    /// Upload a repository archive through the console's deploy form.
    ///
    /// The archive is held in memory so the multipart body can be rebuilt
    /// if the session has to be renewed.
    pub async fn deploy_bytes(
        &self,
        repository: Bytes,
        file_name: &str,
        options: &DeployOptions,
    ) -> Result<(), Error> {
        let fields = options.to_pairs();
        let (repository, fields) = (&repository, &fields);
        self.with_session(move || async move {
            let part = Part::bytes(repository.to_vec())
                .file_name(file_name.to_owned())
                .mime_str(ZIP_MIME)?;
            let mut form = Form::new().part(UPLOAD_FIELD, part);
            for (key, value) in fields {
                form = form.text(*key, value.clone());
            }
            self.post_multipart(DEPLOY_ENDPOINT, form).await
        })
        .await
        .map(drop)
    }

    /// Deploy an archive file from disk.
    pub async fn deploy_file(&self, file: &Path, options: &DeployOptions) -> Result<(), Error> {
        let content = tokio::fs::read(file)
            .await
            .map_err(|e| Error::filesystem(file, e))?;
        let file_name = file
            .file_name()
            .map_or_else(|| BUFFER_FILE_NAME.to_owned(), |n| n.to_string_lossy().into_owned());
        debug!(file = %file.display(), size = content.len(), "console deploy");
        self.deploy_bytes(Bytes::from(content), &file_name, options)
            .await
    }
}
