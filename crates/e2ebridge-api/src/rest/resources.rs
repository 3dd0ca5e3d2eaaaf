// Resource catalogue endpoints (`/xuml/{resource|java|xslt}`)

use std::path::Path;

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde_json::Value;

use crate::endpoints::{Verb, resolve};
use crate::error::Error;
use crate::kind::ResourceType;
use crate::models::ResourceList;
use crate::rest::client::{RestClient, decode};
use crate::rest::services::{OCTET_STREAM_MIME, UPLOAD_FIELD, file_part};

impl RestClient {
    pub async fn list_resources(&self, kind: ResourceType) -> Result<ResourceList, Error> {
        let path = resolve(Verb::Get, &["xuml", kind.rest_segment()])?;
        let Some(value) = self.execute(Verb::Get, &path, None, &[]).await? else {
            return Ok(ResourceList::default());
        };
        decode(value)
    }

    /// Upload a file from disk. The catalogue entry takes the file's name.
    pub async fn upload_resource(
        &self,
        kind: ResourceType,
        file: &Path,
    ) -> Result<Option<Value>, Error> {
        let part = file_part(file, OCTET_STREAM_MIME).await?;
        self.upload_part(kind, part).await
    }

    /// Upload in-memory content under `file_name`.
    pub async fn upload_resource_bytes(
        &self,
        kind: ResourceType,
        content: &[u8],
        file_name: &str,
    ) -> Result<Option<Value>, Error> {
        let part = Part::bytes(content.to_vec())
            .file_name(file_name.to_owned())
            .mime_str(OCTET_STREAM_MIME)?;
        self.upload_part(kind, part).await
    }

    async fn upload_part(&self, kind: ResourceType, part: Part) -> Result<Option<Value>, Error> {
        let path = resolve(Verb::Post, &["xuml", kind.rest_segment()])?;
        let form = Form::new().part(UPLOAD_FIELD, part);
        self.execute_multipart(Verb::Post, &path, form, &[]).await
    }

    pub async fn download_resource(&self, kind: ResourceType, name: &str) -> Result<Bytes, Error> {
        let path = resolve(Verb::Get, &["xuml", kind.rest_segment(), name])?;
        self.execute_bytes(Verb::Get, &path, &[]).await
    }

    pub async fn delete_resource(
        &self,
        kind: ResourceType,
        name: &str,
    ) -> Result<Option<Value>, Error> {
        let path = resolve(Verb::Delete, &["xuml", kind.rest_segment(), name])?;
        self.execute(Verb::Delete, &path, None, &[]).await
    }
}
