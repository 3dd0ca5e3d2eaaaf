// Service kinds, lifecycle actions and resource catalogue types.
//
// Each kind carries its REST path segment and its legacy console endpoints,
// so nothing else in the crate branches on kind names.

use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// The runtime hosting a deployed service.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
pub enum ServiceKind {
    /// xUML model runtime.
    #[strum(serialize = "xuml", to_string = "xUML")]
    Xuml,
    /// Node.js runtime.
    #[strum(serialize = "node", serialize = "nodejs", to_string = "node")]
    Node,
    /// Java runtime.
    #[strum(serialize = "java", to_string = "java")]
    Java,
}

/// Legacy console endpoints for one service kind, relative to `/admin/Console`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleEndpoints {
    /// Start/stop/kill form target.
    pub status: &'static str,
    /// Removal form target.
    pub remove: &'static str,
}

impl ServiceKind {
    /// Path segment under `/services` in the REST API.
    pub fn rest_segment(self) -> &'static str {
        match self {
            Self::Xuml => "xuml",
            Self::Node => "nodejs",
            Self::Java => "java",
        }
    }

    pub fn console_endpoints(self) -> ConsoleEndpoints {
        match self {
            Self::Xuml => ConsoleEndpoints {
                status: "/BridgeInstanceConfiguration",
                remove: "/BridgeInstanceDelete",
            },
            Self::Node => ConsoleEndpoints {
                status: "/nodejs/service/Configuration",
                remove: "/nodejs/service/Delete",
            },
            Self::Java => ConsoleEndpoints {
                status: "/java/service/Configuration",
                remove: "/java/service/Delete",
            },
        }
    }
}

/// Lifecycle transition for a service instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ServiceAction {
    Start,
    Stop,
    /// Only xUML services can be killed.
    Kill,
}

impl ServiceAction {
    /// REST sub-resource and console form value; both use the same word.
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Kind of file in the Bridge resource catalogue (`/xuml/{type}`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ResourceType {
    /// Generic helper files.
    Resource,
    /// Java libraries.
    Java,
    /// XSLT transformations.
    Xslt,
}

impl ResourceType {
    pub fn rest_segment(self) -> &'static str {
        self.into()
    }
}
