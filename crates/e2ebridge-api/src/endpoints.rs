//! Declarative REST capability table and path resolution.
//!
//! The table is a trie keyed by path segment. Two sentinel keys exist at
//! every level: [`ANY`] matches any segment that is not a literal key at
//! that level (an instance or file name), and [`THIS`] holds the verbs of
//! the collection member itself when it also has sub-resources, such as a
//! service that supports `DELETE` on itself and `GET`/`PUT` on its
//! `preferences`.
//!
//! Resolution is pure. A verb/path pair the table does not list fails with
//! [`Error::UnsupportedOperation`] before any request is built.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use strum::{Display, EnumString};

use crate::error::Error;

/// Wildcard key: matches any non-literal segment.
pub const ANY: &str = "*";
/// Self key: verbs of the node that owns it.
pub const THIS: &str = "";

/// Characters escaped in wildcard segments. Same set as JavaScript's
/// `encodeURIComponent`, which the Bridge expects.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

fn is_dot_segment(segment: &str) -> bool {
    matches!(segment, "." | "..")
}

/// HTTP verbs the Bridge REST API uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Verb {
    Get,
    Put,
    Post,
    Delete,
}

impl Verb {
    pub fn as_method(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Put => reqwest::Method::PUT,
            Self::Post => reqwest::Method::POST,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

/// One level of the capability trie.
#[derive(Debug, Clone)]
pub enum Node {
    /// Leaf resource and the verbs it accepts.
    Verbs(&'static [Verb]),
    /// Children keyed by literal segment, [`ANY`] or [`THIS`].
    Branch(BTreeMap<&'static str, Node>),
}

impl Node {
    pub fn verbs(verbs: &'static [Verb]) -> Self {
        Self::Verbs(verbs)
    }

    pub fn branch(children: impl IntoIterator<Item = (&'static str, Node)>) -> Self {
        Self::Branch(children.into_iter().collect())
    }

    fn accepts(&self, verb: Verb) -> bool {
        match self {
            Self::Verbs(verbs) => verbs.contains(&verb),
            Self::Branch(children) => children
                .get(THIS)
                .is_some_and(|this| matches!(this, Self::Verbs(verbs) if verbs.contains(&verb))),
        }
    }
}

/// A permitted verb on a path template. Wildcard positions hold [`ANY`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub verb: Verb,
    pub template: Vec<&'static str>,
}

/// Read-only capability table. Built once, never mutated.
#[derive(Debug, Clone)]
pub struct EndpointTable {
    root: Node,
}

impl EndpointTable {
    pub fn new(root: Node) -> Self {
        Self { root }
    }

    /// The table for the Bridge REST API under `/bridge/rest`.
    pub fn bridge_rest() -> &'static Self {
        static TABLE: LazyLock<EndpointTable> = LazyLock::new(bridge_rest_table);
        &TABLE
    }

    /// Validate `verb` on `segments` and build the relative path.
    ///
    /// Literal segments are copied; segments consumed by a wildcard are
    /// percent-encoded. Empty, `.` and `..` segments never match.
    pub fn resolve(&self, verb: Verb, segments: &[&str]) -> Result<String, Error> {
        let unsupported = || Error::UnsupportedOperation {
            verb: verb.to_string(),
            path: format!("/{}", segments.join("/")),
        };

        let mut node = &self.root;
        let mut path = String::new();

        for segment in segments {
            let Node::Branch(children) = node else {
                return Err(unsupported());
            };
            if segment.is_empty() {
                return Err(unsupported());
            }

            let literal = (*segment != ANY)
                .then(|| children.get(*segment))
                .flatten();

            if let Some(child) = literal {
                path.push('/');
                path.push_str(segment);
                node = child;
            } else if let Some(child) = children.get(ANY) {
                // URL parsing collapses dot segments, even percent-encoded ones.
                if is_dot_segment(segment) {
                    return Err(unsupported());
                }
                path.push('/');
                path.extend(utf8_percent_encode(segment, COMPONENT));
                node = child;
            } else {
                return Err(unsupported());
            }
        }

        if node.accepts(verb) {
            Ok(path)
        } else {
            Err(unsupported())
        }
    }

    /// Whether `verb` on `segments` would resolve.
    pub fn allows(&self, verb: Verb, segments: &[&str]) -> bool {
        self.resolve(verb, segments).is_ok()
    }

    /// Every permitted (verb, template) pair, in table order.
    pub fn routes(&self) -> Vec<Route> {
        let mut routes = Vec::new();
        collect_routes(&self.root, &mut Vec::new(), &mut routes);
        routes
    }
}

fn collect_routes(node: &Node, prefix: &mut Vec<&'static str>, out: &mut Vec<Route>) {
    match node {
        Node::Verbs(verbs) => {
            for verb in *verbs {
                out.push(Route {
                    verb: *verb,
                    template: prefix.clone(),
                });
            }
        }
        Node::Branch(children) => {
            for (key, child) in children {
                if *key == THIS {
                    collect_routes(child, prefix, out);
                } else {
                    prefix.push(*key);
                    collect_routes(child, prefix, out);
                    prefix.pop();
                }
            }
        }
    }
}

/// Resolve against [`EndpointTable::bridge_rest`].
pub fn resolve(verb: Verb, segments: &[&str]) -> Result<String, Error> {
    EndpointTable::bridge_rest().resolve(verb, segments)
}

fn bridge_rest_table() -> EndpointTable {
    use Verb::{Delete, Get, Post, Put};

    let xuml_instance = Node::branch([
        (THIS, Node::verbs(&[Get, Delete])),
        ("preferences", Node::verbs(&[Get, Put])),
        ("settings", Node::verbs(&[Get, Put])),
        ("start", Node::verbs(&[Put])),
        ("stop", Node::verbs(&[Put])),
        ("kill", Node::verbs(&[Put])),
        ("info", Node::verbs(&[Get])),
        (
            "modelnotes",
            Node::branch([(THIS, Node::verbs(&[Get])), (ANY, Node::verbs(&[Get]))]),
        ),
        ("customnotes", Node::verbs(&[Get])),
        ("repository", Node::verbs(&[Get])),
        (
            "sessions",
            Node::branch([(THIS, Node::verbs(&[Get])), (ANY, Node::verbs(&[Delete]))]),
        ),
    ]);

    // Node.js and Java services: no kill, no model artefacts.
    let runtime_instance = Node::branch([
        (THIS, Node::verbs(&[Get, Delete])),
        ("preferences", Node::verbs(&[Get, Put])),
        ("settings", Node::verbs(&[Get, Put])),
        ("start", Node::verbs(&[Put])),
        ("stop", Node::verbs(&[Put])),
        ("repository", Node::verbs(&[Get])),
    ]);

    let catalogue = Node::branch([
        (THIS, Node::verbs(&[Get, Post])),
        (ANY, Node::verbs(&[Get, Delete])),
    ]);

    let kind = |instance: Node| Node::branch([(THIS, Node::verbs(&[Get])), (ANY, instance)]);

    EndpointTable::new(Node::branch([
        (
            "services",
            Node::branch([
                (THIS, Node::verbs(&[Get, Post])),
                ("xuml", kind(xuml_instance)),
                ("nodejs", kind(runtime_instance.clone())),
                ("java", kind(runtime_instance)),
            ]),
        ),
        (
            "xuml",
            Node::branch([
                ("resource", catalogue.clone()),
                ("java", catalogue.clone()),
                ("xslt", catalogue),
            ]),
        ),
    ]))
}
