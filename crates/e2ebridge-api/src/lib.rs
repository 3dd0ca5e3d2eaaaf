//! Async client for the E2E Bridge administration APIs.
//!
//! The Bridge exposes two surfaces and this crate covers both:
//!
//! - **REST** ([`RestClient`]) under `/bridge/rest`: stateless, HTTP Basic on
//!   every request. Every path is checked against the [`endpoints`] table
//!   before a request is built, so unsupported verb/path pairs fail with
//!   [`Error::UnsupportedOperation`] without touching the network.
//!
//! - **Legacy console** ([`ConsoleClient`]) under `/admin/Console`: HTML-form
//!   POSTs on a cookie session, answered with an XML `<Result>` envelope. The
//!   [`SessionAuthenticator`] logs in on first use and renews the session
//!   exactly once when the console reports it expired.
//!
//! [`BridgeClient`] puts both behind one handle, and [`pack`] turns a project
//! directory into a deployable repository archive.

pub mod auth;
pub mod client;
pub mod console;
pub mod endpoints;
pub mod error;
pub mod kind;
pub mod models;
pub mod pack;
pub mod rest;
pub mod transport;

// ── Primary re-exports ──────────────────────────────────────────────
pub use auth::{ApiGeneration, Connection, Credentials, DEFAULT_HOST, DEFAULT_PORT};
pub use client::BridgeClient;
pub use console::{ConsoleClient, ConsoleResult, SessionAuthenticator};
pub use endpoints::{EndpointTable, Verb};
pub use error::{Error, NOT_AUTHENTICATED_MESSAGE};
pub use kind::{ResourceType, ServiceAction, ServiceKind};
pub use models::{
    DeployOptions, ModelNotes, Note, Preferences, ResourceFile, ResourceList, ServiceSettings,
    Setting,
};
pub use pack::{PackOptions, archive_name};
pub use rest::RestClient;
pub use transport::{TlsMode, TransportConfig};
