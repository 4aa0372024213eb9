//! Regex utilities for apitest
//! Extracted to a separate crate for compilation optimization

use once_cell::sync::Lazy;
use regex::Regex;

/// Markers emitted by the generated test harness and by the compiler
pub mod log_markers {
    use super::*;

    /// `<name> ... passed (<secs> seconds)`
    pub static PASSED: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^\s*(?P<name>\S+) \.\.\. passed \((?P<duration>\d+(?:\.\d+)?) seconds\)\s*$")
            .expect("Invalid regex pattern")
    });

    /// `<name> ... error: <message>` or a bare compiler diagnostic
    /// (`error: ...`, `error[E0308]: ...`).
    pub static ERROR: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^\s*(?:(?P<name>\S+) \.\.\. )?error(?:\[[A-Z]\d+\])?: (?P<message>.*?)\s*$")
            .expect("Invalid regex pattern")
    });

    /// A line reporting a passed test
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct PassedLine<'a> {
        pub name: &'a str,
        pub duration: &'a str,
    }

    /// A line reporting an error, optionally tied to a test name
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct ErrorLine<'a> {
        pub name: Option<&'a str>,
        pub message: &'a str,
    }

    /// Match the passed marker
    pub fn passed(line: &str) -> Option<PassedLine<'_>> {
        let caps = PASSED.captures(line)?;
        Some(PassedLine {
            name: caps.name("name")?.as_str(),
            duration: caps.name("duration")?.as_str(),
        })
    }

    /// Match the error marker
    pub fn error(line: &str) -> Option<ErrorLine<'_>> {
        let caps = ERROR.captures(line)?;
        Some(ErrorLine {
            name: caps.name("name").map(|m| m.as_str()),
            message: caps.name("message")?.as_str(),
        })
    }
}

/// Identifier sanitizing shared by the synthesizer and the log parser
pub mod identifier {
    use super::*;

    pub static NON_IDENT: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"[^A-Za-z0-9]+").expect("Invalid regex pattern"));

    pub static SANITIZED: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^[A-Za-z0-9]+(?:_[A-Za-z0-9]+)*$").expect("Invalid regex pattern")
    });

    /// Collapse every run of non-alphanumeric characters into a single `_`
    /// and trim underscores from both ends. Returns `None` when nothing is left.
    pub fn sanitize(raw: &str) -> Option<String> {
        let replaced = NON_IDENT.replace_all(raw, "_");
        let trimmed = replaced.trim_matches('_');
        if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
    }

    /// Check that a string already has the sanitized shape
    pub fn is_sanitized(candidate: &str) -> bool {
        SANITIZED.is_match(candidate)
    }
}

/// OpenAPI path templates
pub mod path_template {
    use super::*;

    pub static PARAMETER: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\{([^{}]+)\}").expect("Invalid regex pattern"));

    /// Names of the `{parameters}` referenced by a path, in order
    pub fn parameters(path: &str) -> Vec<String> {
        PARAMETER.captures_iter(path).filter_map(|c| c.get(1)).map(|m| m.as_str().to_string()).collect()
    }

    /// Replace each `{parameter}` using `lookup`; the first unresolved name is returned as the error
    pub fn substitute<F>(path: &str, mut lookup: F) -> Result<String, String>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut missing = None;
        let substituted = PARAMETER.replace_all(path, |caps: &regex::Captures<'_>| {
            let name = &caps[1];
            match lookup(name) {
                Some(value) => value,
                None => {
                    missing.get_or_insert_with(|| name.to_string());
                    String::new()
                }
            }
        });

        match missing {
            Some(name) => Err(name),
            None => Ok(substituted.into_owned()),
        }
    }
}
