// Bridge REST API client
//
// Stateless: HTTP Basic on every request, JSON by default, raw bytes for
// exports and downloads. Endpoint groups live in separate files as
// inherent methods on `RestClient`.

pub mod client;

mod artifacts;
mod configuration;
mod resources;
mod services;

pub use client::RestClient;
pub(crate) use services::{BUFFER_FILE_NAME, UPLOAD_FIELD, ZIP_MIME};
