// Console response envelope
//
// Every console endpoint answers with
//
//   <Result xmlns="http://e2e.ch/bridge">
//       <Status>OK</Status>
//       <Message>null</Message>
//   </Result>
//
// regardless of the HTTP status it uses.

use serde::Deserialize;

use crate::error::Error;

const STATUS_OK: &str = "OK";

#[derive(Debug, Deserialize)]
#[serde(rename = "Result")]
struct RawResult {
    #[serde(rename = "Status")]
    status: String,
    #[serde(rename = "Message", default)]
    message: Option<String>,
}

/// Parsed `<Result>` envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleResult {
    pub status: String,
    /// `None` when absent, empty, or the literal text `null`.
    pub message: Option<String>,
}

impl ConsoleResult {
    pub fn parse(body: &str) -> Result<Self, Error> {
        let raw: RawResult = quick_xml::de::from_str(body).map_err(|e| Error::Deserialization {
            message: format!("invalid console envelope: {e}"),
            body: body.to_owned(),
        })?;

        let message = raw
            .message
            .map(|m| m.trim().to_owned())
            .filter(|m| !m.is_empty() && m != "null");

        Ok(Self {
            status: raw.status.trim().to_owned(),
            message,
        })
    }

    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }

    /// `Ok(self)` for `Status` OK, otherwise [`Error::Console`].
    pub fn into_result(self) -> Result<Self, Error> {
        if self.is_ok() {
            Ok(self)
        } else {
            Err(Error::Console {
                status: self.status,
                message: self.message,
            })
        }
    }
}
