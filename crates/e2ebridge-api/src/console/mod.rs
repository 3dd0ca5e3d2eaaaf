// Legacy console client
//
// Cookie session established at `/Welcome`; form and multipart POSTs
// answered with an XML `<Result>` envelope.

pub mod client;
pub mod envelope;
pub mod session;

mod domain;
mod services;

pub use client::ConsoleClient;
pub use envelope::ConsoleResult;
pub use session::SessionAuthenticator;
