// Async HTTP client for the Bridge REST API.
//
// Base path: /bridge/rest
// Auth: HTTP Basic on every request, no session state.

use bytes::Bytes;
use reqwest::header::{ACCEPT, HeaderValue};
use reqwest::multipart::Form;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::auth::{ApiGeneration, Connection, Credentials, join_base_path};
use crate::endpoints::Verb;
use crate::error::Error;
use crate::transport::TransportConfig;

// ── Client ───────────────────────────────────────────────────────────

/// Stateless client for the Bridge REST API.
///
/// Every call carries its own Basic credentials, so the client holds no
/// mutable state and can be shared freely between tasks.
pub struct RestClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: Credentials,
}

impl RestClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a connection and transport config.
    ///
    /// Any cookie jar on `transport` is dropped: REST calls never share state.
    pub fn new(connection: &Connection, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.clone().without_cookie_jar().build_client()?;
        Ok(Self {
            http,
            base_url: connection.base_url(ApiGeneration::Rest)?,
            credentials: connection.credentials.clone(),
        })
    }

    /// Wrap an existing `reqwest::Client` pointed at `origin`
    /// (e.g. `http://127.0.0.1:4242`). `/bridge/rest` is appended if missing.
    pub fn from_reqwest(
        origin: &str,
        http: reqwest::Client,
        credentials: Credentials,
    ) -> Result<Self, Error> {
        let origin = Url::parse(origin)?;
        Ok(Self {
            http,
            base_url: join_base_path(&origin, ApiGeneration::Rest),
            credentials,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Append a resolved path (leading `/`, already encoded) to the base URL.
    fn url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}{path}"))?)
    }

    fn request(
        &self,
        verb: Verb,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<reqwest::RequestBuilder, Error> {
        let url = self.url(path)?;
        debug!("{verb} {url}");

        let mut builder = self
            .http
            .request(verb.as_method(), url)
            .basic_auth(
                &self.credentials.user,
                Some(self.credentials.password.expose_secret()),
            );
        if !query.is_empty() {
            builder = builder.query(query);
        }
        Ok(builder)
    }

    // ── Executors ────────────────────────────────────────────────────

    /// Issue one JSON call and return the cleaned payload.
    ///
    /// `None` means the Bridge answered 200 with an empty body.
    pub async fn execute(
        &self,
        verb: Verb,
        path: &str,
        body: Option<&Value>,
        query: &[(&str, String)],
    ) -> Result<Option<Value>, Error> {
        let mut builder = self
            .request(verb, path, query)?
            .header(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(body) = body {
            if matches!(verb, Verb::Post | Verb::Put) {
                builder = builder.json(body);
            }
        }

        let resp = builder.send().await?;
        let text = Self::success_body(resp).await?.text().await?;
        Ok(parse_payload(text))
    }

    /// Issue a multipart upload and return the cleaned payload.
    pub async fn execute_multipart(
        &self,
        verb: Verb,
        path: &str,
        form: Form,
        query: &[(&str, String)],
    ) -> Result<Option<Value>, Error> {
        let resp = self
            .request(verb, path, query)?
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .multipart(form)
            .send()
            .await?;
        let text = Self::success_body(resp).await?.text().await?;
        Ok(parse_payload(text))
    }

    /// Issue one call whose response is raw bytes (downloads, exports).
    pub async fn execute_bytes(
        &self,
        verb: Verb,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Bytes, Error> {
        let resp = self.request(verb, path, query)?.send().await?;
        Ok(Self::success_body(resp).await?.bytes().await?)
    }

    /// Issue one call whose response is text (notes), returned untouched.
    pub async fn execute_text(&self, verb: Verb, path: &str) -> Result<String, Error> {
        let resp = self.request(verb, path, &[])?.send().await?;
        Ok(Self::success_body(resp).await?.text().await?)
    }

    // ── Response handling ────────────────────────────────────────────

    /// Only HTTP 200 counts as success. Anything else becomes
    /// [`Error::Bridge`] carrying the response body.
    async fn success_body(resp: reqwest::Response) -> Result<reqwest::Response, Error> {
        let status = resp.status();
        if status == reqwest::StatusCode::OK {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(Error::Bridge {
            status: status.as_u16(),
            body,
        })
    }
}

/// Decode a cleaned payload into a typed model.
pub(crate) fn decode<T: DeserializeOwned>(value: Value) -> Result<T, Error> {
    serde_json::from_value(value.clone()).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body: value.to_string(),
    })
}

/// Decode a response body leniently: empty → `None`, JSON → cleaned value,
/// anything else → the raw text as a JSON string.
fn parse_payload(text: String) -> Option<Value> {
    if text.trim().is_empty() {
        return None;
    }
    let mut value = serde_json::from_str(&text).unwrap_or(Value::String(text));
    clean_response(&mut value);
    Some(value)
}

/// Remove the Bridge's echo metadata from a payload.
///
/// `link` is always dropped. `service` is dropped only when it is a scalar
/// echo of the instance name: in listings it is the array of results.
pub(crate) fn clean_response(value: &mut Value) {
    let Value::Object(map) = value else {
        return;
    };
    if map.get("service").is_some_and(|s| !s.is_array()) {
        trace!("dropping service echo");
        map.remove("service");
    }
    if map.remove("link").is_some() {
        trace!("dropping link echo");
    }
}
