//! Live request tests declared through the `x-tests` response extension
//!
//! The extension is either a single entry or a map of named entries:
//!
//! ```yaml
//! x-tests:
//!   first_widget:
//!     parameters: { id: "1" }
//!     query_parameters: { verbose: true }
//!     example: basic
//! ```

use crate::parser::{ParameterLocation, ResolvedOperation};
use regex_utils::path_template;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

const ENTRY_KEYS: &[&str] = &[
    "parameters",
    "query_parameters",
    "test_host",
    "example",
    "skip_example",
    "ignore_missing_parameter_warnings",
];

/// One live request test
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LiveTestEntry {
    /// Path parameter values
    pub parameters: BTreeMap<String, Value>,
    pub query_parameters: BTreeMap<String, Value>,
    /// Host that wins over both the configured override and the document's servers
    pub test_host: Option<String>,
    /// Example the response body must equal
    pub example: Option<String>,
    pub skip_example: bool,
    /// Silently drop parameters the operation does not declare
    pub ignore_missing_parameter_warnings: bool,
}

/// An entry with the slug used in its test name
#[derive(Debug, Clone, PartialEq)]
pub struct LiveTestSpec {
    pub slug: Option<String>,
    pub entry: LiveTestEntry,
}

/// Concrete request a live test sends
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
}

/// Read the raw extension value
pub fn parse_entries(raw: &Value) -> Result<Vec<LiveTestSpec>, String> {
    let Value::Object(map) = raw else {
        return Err("x-tests must be an object".to_string());
    };

    if map.keys().any(|k| ENTRY_KEYS.contains(&k.as_str())) {
        let entry = LiveTestEntry::deserialize(raw).map_err(|e| format!("invalid x-tests entry: {}", e))?;
        return Ok(vec![LiveTestSpec { slug: None, entry }]);
    }

    map.iter()
        .map(|(name, value)| {
            LiveTestEntry::deserialize(value)
                .map(|entry| LiveTestSpec { slug: Some(name.clone()), entry })
                .map_err(|e| format!("invalid x-tests entry '{}': {}", name, e))
        })
        .collect()
}

/// Resolve the URL and query of one entry against its operation
///
/// `default_host` is the configured override, or else the document's first server.
pub fn plan_request(
    operation: &ResolvedOperation,
    entry: &LiveTestEntry,
    default_host: Option<&str>,
) -> Result<PlannedRequest, String> {
    let path_values = literals(&entry.parameters, "parameter")?;
    let query_values = literals(&entry.query_parameters, "query parameter")?;

    let mut path_lookup = BTreeMap::new();
    for (name, value) in path_values {
        if operation.parameter(&name, ParameterLocation::Path).is_some() {
            path_lookup.insert(name, value);
        } else if !entry.ignore_missing_parameter_warnings {
            return Err(format!("'{}' is not a path parameter of {}", name, operation.display_name()));
        }
    }

    let mut query = Vec::new();
    for (name, value) in query_values {
        if operation.parameter(&name, ParameterLocation::Query).is_some() {
            query.push((name, value));
        } else if !entry.ignore_missing_parameter_warnings {
            return Err(format!("'{}' is not a query parameter of {}", name, operation.display_name()));
        }
    }

    let path = path_template::substitute(&operation.path, |name| path_lookup.get(name).cloned())
        .map_err(|missing| format!("no value for path parameter '{}'", missing))?;

    let host = entry
        .test_host
        .as_deref()
        .or(default_host)
        .ok_or_else(|| "no server URL to send the request to".to_string())?;
    if !(host.starts_with("http://") || host.starts_with("https://")) {
        return Err(format!("server URL '{}' is not absolute", host));
    }

    Ok(PlannedRequest { url: format!("{}{}", host.trim_end_matches('/'), path), query })
}

fn literals(values: &BTreeMap<String, Value>, what: &str) -> Result<Vec<(String, String)>, String> {
    values
        .iter()
        .map(|(name, value)| {
            let literal = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => return Err(format!("{} '{}' must be a string, number or boolean", what, name)),
            };
            Ok((name.clone(), literal))
        })
        .collect()
}
