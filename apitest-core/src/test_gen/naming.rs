//! Generated test function names
//!
//! Every generated test is named
//! `test_{segments joined by "__"}__{METHOD}__{request|response}[__{status}]__{context}`.
//! Segments and context are sanitized identifiers, which never contain `__`, so
//! the name splits back into its parts without ambiguity. The log parser relies
//! on [`TestFunctionName::decode`] being the exact inverse of
//! [`TestFunctionName::encode`].

use crate::parser::{HttpMethod, StatusCode};
use regex_utils::identifier;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

const PREFIX: &str = "test_";
const DELIMITER: &str = "__";
const REQUEST: &str = "request";
const RESPONSE: &str = "response";

/// Context prefix reserved for live request tests
pub const REQUEST_TEST: &str = "request_test";

/// Returned when a string is not a generated test name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{name}' is not a generated test name: {reason}")]
pub struct Unparseable {
    pub name: String,
    pub reason: &'static str,
}

/// ASCII alphanumerics separated by single underscores
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier(String);

impl Identifier {
    /// Sanitize arbitrary text; `None` when nothing alphanumeric is left
    pub fn sanitize(raw: &str) -> Option<Self> {
        identifier::sanitize(raw).map(Self)
    }

    /// Accept text that is already sanitized
    pub fn parse(candidate: &str) -> Option<Self> {
        identifier::is_sanitized(candidate).then(|| Self(candidate.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Identifier {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("'{}' is not a sanitized identifier", value))
    }
}

impl From<Identifier> for String {
    fn from(value: Identifier) -> Self {
        value.0
    }
}

/// Which side of the exchange a test exercises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Request,
    Response(StatusCode),
}

/// What a test does, recovered from its context for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestKind {
    /// Decodes a named example
    ExampleParsing,
    /// Sends a live request; carries the entry slug when there is one
    RequestTest(Option<String>),
}

impl fmt::Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExampleParsing => write!(f, "Example Parsing"),
            Self::RequestTest(None) => write!(f, "Request Test"),
            Self::RequestTest(Some(slug)) => write!(f, "Request Test ({})", slug),
        }
    }
}

/// Structured form of a generated test function name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TestFunctionName {
    segments: Vec<Identifier>,
    method: HttpMethod,
    direction: Direction,
    context: Identifier,
}

impl TestFunctionName {
    /// Build a name for a path template; empty and punctuation-only segments are dropped
    pub fn new(path: &str, method: HttpMethod, direction: Direction, context: Identifier) -> Self {
        Self { segments: path_segments(path), method, direction, context }
    }

    pub fn segments(&self) -> &[Identifier] {
        &self.segments
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self.direction {
            Direction::Request => None,
            Direction::Response(status) => Some(status),
        }
    }

    pub fn context(&self) -> &Identifier {
        &self.context
    }

    /// `/widgets/id`, the sanitized form of the operation path
    pub fn path(&self) -> String {
        let joined = self.segments.iter().map(Identifier::as_str).collect::<Vec<_>>().join("/");
        format!("/{}", joined)
    }

    /// `GET /widgets/id`
    pub fn operation(&self) -> String {
        format!("{} {}", self.method, self.path())
    }

    pub fn kind(&self) -> TestKind {
        let context = self.context.as_str();
        if context == REQUEST_TEST {
            TestKind::RequestTest(None)
        } else if let Some(slug) = context.strip_prefix(REQUEST_TEST).and_then(|s| s.strip_prefix('_')) {
            TestKind::RequestTest(Some(slug.to_string()))
        } else {
            TestKind::ExampleParsing
        }
    }

    pub fn encode(&self) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(self.segments.len() + 4);
        parts.push(self.segments.iter().map(Identifier::as_str).collect::<Vec<_>>().join(DELIMITER));
        parts.push(self.method.to_string());
        match self.direction {
            Direction::Request => parts.push(REQUEST.to_string()),
            Direction::Response(status) => {
                parts.push(RESPONSE.to_string());
                parts.push(status.to_string());
            }
        }
        parts.push(self.context.to_string());
        format!("{}{}", PREFIX, parts.join(DELIMITER))
    }

    /// Inverse of [`encode`](Self::encode); also accepts a `module::path::` prefix
    pub fn decode(raw: &str) -> Result<Self, Unparseable> {
        let unparseable = |reason| Unparseable { name: raw.to_string(), reason };

        let name = raw.rsplit("::").next().unwrap_or(raw);
        let body = name.strip_prefix(PREFIX).ok_or_else(|| unparseable("missing test_ prefix"))?;
        let mut parts: Vec<&str> = body.split(DELIMITER).collect();

        let context = parts.pop().and_then(Identifier::parse).ok_or_else(|| unparseable("bad context"))?;

        let direction = match parts.pop() {
            Some(REQUEST) => Direction::Request,
            Some(status) => {
                let status = status.parse::<StatusCode>().map_err(|_| unparseable("bad direction"))?;
                match parts.pop() {
                    Some(RESPONSE) => Direction::Response(status),
                    _ => return Err(unparseable("status without response marker")),
                }
            }
            None => return Err(unparseable("too few parts")),
        };

        let method = parts
            .pop()
            .and_then(|m| m.parse::<HttpMethod>().ok())
            .ok_or_else(|| unparseable("bad HTTP method"))?;

        let segments = match parts.as_slice() {
            [""] => Vec::new(),
            [] => return Err(unparseable("too few parts")),
            rest => rest
                .iter()
                .map(|s| Identifier::parse(s))
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| unparseable("bad path segment"))?,
        };

        Ok(Self { segments, method, direction, context })
    }
}

impl fmt::Display for TestFunctionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

/// Sanitized segments of a path template, `{braces}` dropped
pub fn path_segments(path: &str) -> Vec<Identifier> {
    path.split('/').filter_map(Identifier::sanitize).collect()
}

/// Context for an example-decoding test; names that would read as a live
/// request context get an `example_` prefix
pub fn example_context(example_name: &str) -> Option<Identifier> {
    let sanitized = Identifier::sanitize(example_name)?;
    if sanitized.as_str().starts_with(REQUEST_TEST) {
        Identifier::parse(&format!("example_{}", sanitized))
    } else {
        Some(sanitized)
    }
}

/// Context for a live request test
pub fn request_context(slug: Option<&str>) -> Identifier {
    let context = match slug.and_then(identifier::sanitize) {
        Some(slug) => format!("{}_{}", REQUEST_TEST, slug),
        None => REQUEST_TEST.to_string(),
    };
    Identifier(context)
}
