// Operational artefacts of deployed services
//
// Model and custom notes, sessions and extended info exist for xUML
// services only. Repository export works for every kind.

use bytes::Bytes;
use serde_json::Value;

use crate::endpoints::{Verb, resolve};
use crate::error::Error;
use crate::kind::ServiceKind;
use crate::models::ModelNotes;
use crate::rest::client::{RestClient, decode};

const XUML: &str = "xuml";

impl RestClient {
    /// Extended information about an xUML service.
    pub async fn service_info(&self, name: &str) -> Result<Value, Error> {
        let path = resolve(Verb::Get, &["services", XUML, name, "info"])?;
        Ok(self
            .execute(Verb::Get, &path, None, &[])
            .await?
            .unwrap_or(Value::Null))
    }

    pub async fn model_notes_list(&self, name: &str) -> Result<ModelNotes, Error> {
        let path = resolve(Verb::Get, &["services", XUML, name, "modelnotes"])?;
        let Some(value) = self.execute(Verb::Get, &path, None, &[]).await? else {
            return Ok(ModelNotes::default());
        };
        decode(value)
    }

    /// One model note file, as text.
    pub async fn model_note(&self, name: &str, file: &str) -> Result<String, Error> {
        let path = resolve(Verb::Get, &["services", XUML, name, "modelnotes", file])?;
        self.execute_text(Verb::Get, &path).await
    }

    /// The service's custom notes page, as returned (usually HTML).
    pub async fn custom_notes(&self, name: &str) -> Result<String, Error> {
        let path = resolve(Verb::Get, &["services", XUML, name, "customnotes"])?;
        self.execute_text(Verb::Get, &path).await
    }

    /// Export the deployed repository archive.
    pub async fn service_repository(&self, kind: ServiceKind, name: &str) -> Result<Bytes, Error> {
        let path = resolve(Verb::Get, &["services", kind.rest_segment(), name, "repository"])?;
        self.execute_bytes(Verb::Get, &path, &[]).await
    }

    pub async fn service_sessions(&self, name: &str) -> Result<Value, Error> {
        let path = resolve(Verb::Get, &["services", XUML, name, "sessions"])?;
        Ok(self
            .execute(Verb::Get, &path, None, &[])
            .await?
            .unwrap_or(Value::Null))
    }

    pub async fn cancel_session(
        &self,
        name: &str,
        session_id: &str,
    ) -> Result<Option<Value>, Error> {
        let path = resolve(Verb::Delete, &["services", XUML, name, "sessions", session_id])?;
        self.execute(Verb::Delete, &path, None, &[]).await
    }
}
