use secrecy::SecretString;
use url::Url;

use crate::error::Error;

/// Default Bridge host when none is configured.
pub const DEFAULT_HOST: &str = "localhost";
/// Default Bridge administration port.
pub const DEFAULT_PORT: u16 = 8080;

/// Which administrative surface a call targets.
///
/// Marker enum (no data) -- useful for branching on the auth flow without
/// carrying secret material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiGeneration {
    /// Stateless REST API, HTTP Basic on every request.
    Rest,
    /// Legacy HTML-form console, cookie session established at `/Welcome`.
    Console,
}

impl ApiGeneration {
    /// The path prefix every endpoint of this generation lives under.
    pub fn base_path(self) -> &'static str {
        match self {
            Self::Rest => "/bridge/rest",
            Self::Console => "/admin/Console",
        }
    }
}

/// User name and password for the Bridge.
///
/// The REST client sends these as Basic auth on every request; the console
/// client posts them to the login form.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub user: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: SecretString::from(password.into()),
        }
    }
}

/// Where the Bridge lives and who we are.
///
/// Immutable per client; [`BridgeClient::login`](crate::BridgeClient::login)
/// accepts an override for a single login round trip.
#[derive(Debug, Clone)]
pub struct Connection {
    pub host: String,
    pub port: u16,
    pub credentials: Credentials,
}

impl Connection {
    pub fn new(host: impl Into<String>, port: u16, credentials: Credentials) -> Self {
        Self {
            host: host.into(),
            port,
            credentials,
        }
    }

    /// `https://{host}:{port}/`
    pub fn origin(&self) -> Result<Url, Error> {
        Ok(Url::parse(&format!("https://{}:{}/", self.host, self.port))?)
    }

    /// The origin joined with the generation's base path.
    pub fn base_url(&self, generation: ApiGeneration) -> Result<Url, Error> {
        Ok(join_base_path(&self.origin()?, generation))
    }
}

/// Append a generation's base path to an origin such as `http://127.0.0.1:4242`.
///
/// Any path already present on `origin` is kept, so a Bridge behind a
/// reverse-proxy prefix still resolves correctly.
pub(crate) fn join_base_path(origin: &Url, generation: ApiGeneration) -> Url {
    let mut url = origin.clone();
    let path = url.path().trim_end_matches('/').to_owned();
    let base = generation.base_path();
    if !path.ends_with(base) {
        url.set_path(&format!("{path}{base}"));
    }
    url
}
