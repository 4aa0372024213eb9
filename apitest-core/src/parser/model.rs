//! Resolved route/operation model handed to the synthesizer

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A fully resolved API document: every `$ref` already inlined
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolvedDocument {
    /// Server URLs declared by the document, in declaration order
    pub servers: Vec<String>,

    /// Operations in document order
    pub operations: Vec<ResolvedOperation>,
}

/// One path + method pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedOperation {
    /// Path template, e.g. `/widgets/{id}`
    pub path: String,

    /// HTTP method
    pub method: HttpMethod,

    /// Declared parameters (path-item and operation level merged)
    pub parameters: Vec<ResolvedParameter>,

    /// Request body, if any
    pub request_body: Option<ResolvedBody>,

    /// Responses by status code
    pub responses: BTreeMap<StatusCode, ResolvedResponse>,
}

impl ResolvedOperation {
    pub fn new(path: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            path: path.into(),
            method,
            parameters: Vec::new(),
            request_body: None,
            responses: BTreeMap::new(),
        }
    }

    /// `GET /widgets`
    pub fn display_name(&self) -> String {
        format!("{} {}", self.method, self.path)
    }

    /// Look up a declared parameter by name and location
    pub fn parameter(&self, name: &str, location: ParameterLocation) -> Option<&ResolvedParameter> {
        self.parameters.iter().find(|p| p.name == name && p.location == location)
    }

    /// True when neither the request nor any response carries JSON content
    pub fn has_json_content(&self) -> bool {
        self.request_body.as_ref().is_some_and(|b| b.json_content().is_some())
            || self.responses.values().any(|r| r.body.json_content().is_some())
    }
}

/// Declared parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedParameter {
    pub name: String,
    pub location: ParameterLocation,
    pub required: bool,
}

/// Where a parameter lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

/// Response description plus vendor extensions the synthesizer cares about
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolvedResponse {
    pub body: ResolvedBody,

    /// Raw `x-tests` extension, if present
    pub test_parameters: Option<Value>,
}

/// Request or response body content keyed by media type
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolvedBody {
    pub content: BTreeMap<String, ResolvedContent>,
}

impl ResolvedBody {
    /// The JSON media type entry, preferring JSON:API's own media type
    pub fn json_content(&self) -> Option<(&str, &ResolvedContent)> {
        self.content
            .get_key_value("application/vnd.api+json")
            .or_else(|| self.content.get_key_value("application/json"))
            .or_else(|| self.content.iter().find(|(media, _)| is_json_media_type(media)))
            .map(|(media, content)| (media.as_str(), content))
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Schema and named examples for one media type
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolvedContent {
    /// Dereferenced schema
    pub schema: Option<Value>,

    /// Named example payloads
    pub examples: BTreeMap<String, Value>,

    /// Media-type level `x-not-json-api`
    pub not_json_api: bool,
}

/// JSON, JSON:API, or any `+json` suffix
pub fn is_json_media_type(media_type: &str) -> bool {
    let essence = media_type.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
    essence == "application/json" || essence.ends_with("+json")
}

/// HTTP methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
    Trace,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 8] = [
        Self::Get,
        Self::Post,
        Self::Put,
        Self::Patch,
        Self::Delete,
        Self::Head,
        Self::Options,
        Self::Trace,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Trace => "TRACE",
        }
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| format!("unknown HTTP method '{}'", s))
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response status key
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StatusCode {
    Code(u16),
    /// `1XX` .. `5XX`
    Range(u8),
    Default,
}

impl StatusCode {
    /// 200 for GET and 201 for POST are the responses that normally carry a body
    pub fn expects_content_for(&self, method: HttpMethod) -> bool {
        matches!((self, method), (Self::Code(200), HttpMethod::Get) | (Self::Code(201), HttpMethod::Post))
    }

    /// Concrete code a live request can assert on
    pub fn as_code(&self) -> Option<u16> {
        match self {
            Self::Code(code) => Some(*code),
            _ => None,
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "{}", code),
            Self::Range(class) => write!(f, "{}XX", class),
            Self::Default => write!(f, "default"),
        }
    }
}

impl FromStr for StatusCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "default" {
            return Ok(Self::Default);
        }
        if let Some(class) = s.strip_suffix("XX") {
            return match class.parse::<u8>() {
                Ok(class @ 1..=5) => Ok(Self::Range(class)),
                _ => Err(format!("invalid status range '{}'", s)),
            };
        }
        match s.parse::<u16>() {
            Ok(code @ 100..=599) if s.len() == 3 => Ok(Self::Code(code)),
            _ => Err(format!("invalid status code '{}'", s)),
        }
    }
}

impl TryFrom<String> for StatusCode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StatusCode> for String {
    fn from(value: StatusCode) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_parsing() {
        assert_eq!("200".parse::<StatusCode>().unwrap(), StatusCode::Code(200));
        assert_eq!("4XX".parse::<StatusCode>().unwrap(), StatusCode::Range(4));
        assert_eq!("default".parse::<StatusCode>().unwrap(), StatusCode::Default);
        assert!("2000".parse::<StatusCode>().is_err());
        assert!("9XX".parse::<StatusCode>().is_err());
        assert!("request".parse::<StatusCode>().is_err());
        assert_eq!(StatusCode::Range(2).to_string(), "2XX");
    }

    #[test]
    fn test_http_method_round_trip() {
        for method in HttpMethod::ALL {
            assert_eq!(method.as_str().parse::<HttpMethod>().unwrap(), method);
        }
        assert!("get".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn test_json_content_selection() {
        let mut body = ResolvedBody::default();
        body.content.insert("text/plain".into(), ResolvedContent::default());
        assert!(body.json_content().is_none());

        body.content.insert("application/problem+json".into(), ResolvedContent::default());
        assert_eq!(body.json_content().unwrap().0, "application/problem+json");

        body.content.insert("application/vnd.api+json".into(), ResolvedContent::default());
        assert_eq!(body.json_content().unwrap().0, "application/vnd.api+json");
    }

    #[test]
    fn test_expected_content() {
        assert!(StatusCode::Code(200).expects_content_for(HttpMethod::Get));
        assert!(StatusCode::Code(201).expects_content_for(HttpMethod::Post));
        assert!(!StatusCode::Code(204).expects_content_for(HttpMethod::Delete));
    }
}
