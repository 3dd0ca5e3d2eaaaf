// Legacy console HTTP client
//
// Wraps `reqwest::Client` with a cookie jar, console URL construction and
// envelope parsing. Endpoint groups (services, domain) are inherent methods
// in separate files. Every public operation runs through the session
// authenticator.

use std::future::Future;
use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::multipart::Form;
use secrecy::ExposeSecret;
use tracing::debug;
use url::Url;

use crate::auth::{ApiGeneration, Connection, Credentials, join_base_path};
use crate::console::envelope::ConsoleResult;
use crate::console::session::SessionAuthenticator;
use crate::error::Error;
use crate::transport::TransportConfig;

const LOGIN_ENDPOINT: &str = "/Welcome";

/// Session-based client for the legacy `/admin/Console` surface.
///
/// Owns its cookie jar and session state. Nothing outside this client reads
/// or writes either.
pub struct ConsoleClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: Credentials,
    session: SessionAuthenticator,
    cookie_jar: Option<Arc<Jar>>,
}

impl ConsoleClient {
    /// Build from a connection and transport config.
    ///
    /// A cookie jar is created if `transport` does not carry one.
    pub fn new(connection: &Connection, transport: &TransportConfig) -> Result<Self, Error> {
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let cookie_jar = config.cookie_jar.clone();
        let http = config.build_client()?;
        Ok(Self {
            http,
            base_url: connection.base_url(ApiGeneration::Console)?,
            credentials: connection.credentials.clone(),
            session: SessionAuthenticator::new(),
            cookie_jar,
        })
    }

    /// Wrap a pre-built client pointed at `origin`. `/admin/Console` is
    /// appended if missing. The client must have a cookie store for the
    /// session to survive between calls.
    pub fn from_reqwest(
        origin: &str,
        http: reqwest::Client,
        credentials: Credentials,
    ) -> Result<Self, Error> {
        let origin = Url::parse(origin)?;
        Ok(Self {
            http,
            base_url: join_base_path(&origin, ApiGeneration::Console),
            credentials,
            session: SessionAuthenticator::new(),
            cookie_jar: None,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn is_logged_in(&self) -> bool {
        self.session.is_logged_in().await
    }

    /// The `Cookie` header the jar would send to the console, if any.
    pub fn cookie_header(&self) -> Option<String> {
        let jar = self.cookie_jar.as_ref()?;
        let cookies = jar.cookies(&self.base_url)?;
        cookies.to_str().ok().map(String::from)
    }

    // ── Session ──────────────────────────────────────────────────────

    /// Log in now, even if a session exists.
    ///
    /// `credentials` replaces the configured ones for this round trip only.
    pub async fn login(&self, credentials: Option<&Credentials>) -> Result<(), Error> {
        let credentials = credentials.unwrap_or(&self.credentials);
        self.session
            .relogin(|| self.login_round_trip(credentials))
            .await
            .map(drop)
    }

    /// Run `op` under the session retry-once policy.
    pub(crate) async fn with_session<O, F, T>(&self, op: O) -> Result<T, Error>
    where
        O: Fn() -> F,
        F: Future<Output = Result<T, Error>>,
    {
        self.session
            .with_session(|| self.login_round_trip(&self.credentials), op)
            .await
    }

    async fn login_round_trip(&self, credentials: &Credentials) -> Result<(), Error> {
        let url = self.url(LOGIN_ENDPOINT)?;
        debug!("logging in at {url}");

        let resp = self
            .http
            .post(url)
            .form(&[
                ("j_username", credentials.user.as_str()),
                ("j_password", credentials.password.expose_secret()),
            ])
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {status})"),
            });
        }

        let result = ConsoleResult::parse(&body).map_err(|_| Error::Authentication {
            message: "login answer is not a console envelope".into(),
        })?;
        if !result.is_ok() {
            return Err(Error::Authentication {
                message: result.message.unwrap_or(result.status),
            });
        }

        debug!("login successful");
        Ok(())
    }

    // ── URL builder ──────────────────────────────────────────────────

    fn url(&self, endpoint: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}{endpoint}"))?)
    }

    // ── Form executor ────────────────────────────────────────────────

    /// POST url-encoded `fields` to `endpoint` and parse the envelope.
    pub(crate) async fn post_form(
        &self,
        endpoint: &str,
        fields: &[(&str, &str)],
        query: &[(&str, &str)],
    ) -> Result<ConsoleResult, Error> {
        let url = self.url(endpoint)?;
        debug!("POST {url}");

        let mut builder = self.http.post(url).form(fields);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        Self::parse_response(builder.send().await?).await
    }

    /// POST a multipart body to `endpoint` and parse the envelope.
    pub(crate) async fn post_multipart(
        &self,
        endpoint: &str,
        form: Form,
    ) -> Result<ConsoleResult, Error> {
        let url = self.url(endpoint)?;
        debug!("POST {url} (multipart)");

        let resp = self.http.post(url).multipart(form).send().await?;
        Self::parse_response(resp).await
    }

    /// A non-2xx answer is [`Error::Bridge`], unless its body is an envelope
    /// reporting an expired session. A 2xx answer must be an envelope with
    /// `Status` OK.
    async fn parse_response(resp: reqwest::Response) -> Result<ConsoleResult, Error> {
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            if let Ok(result) = ConsoleResult::parse(&body) {
                let err = Error::Console {
                    status: result.status,
                    message: result.message,
                };
                if err.is_not_authenticated() {
                    return Err(err);
                }
            }
            return Err(Error::Bridge {
                status: status.as_u16(),
                body,
            });
        }

        ConsoleResult::parse(&body)?.into_result()
    }
}
