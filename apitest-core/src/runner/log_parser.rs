//! Recovers per-test outcomes from the raw output of a suite run

use crate::test_gen::TestFunctionName;
use regex_utils::log_markers;
use serde::Serialize;

/// One reported test, or one diagnostic attributed to the run as a whole
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestOutcome {
    /// `None` when the line did not name a generated test
    pub function_name: Option<TestFunctionName>,
    pub passed: bool,
    /// Duration for a pass, the message for a failure
    pub timing_or_error: String,
    /// The log line it came from
    pub line: String,
}

impl TestOutcome {
    /// `GET /widgets` when the test name decoded
    pub fn path(&self) -> Option<String> {
        self.function_name.as_ref().map(TestFunctionName::operation)
    }

    /// Human readable context: the kind of test, or the raw line
    pub fn display_context(&self) -> String {
        match &self.function_name {
            Some(name) => match name.status() {
                Some(status) => format!("{} ({} response)", name.kind(), status),
                None => format!("{} (request)", name.kind()),
            },
            None => self.line.clone(),
        }
    }
}

/// Everything recovered from one run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunResult {
    pub succeeded: usize,
    pub failed: usize,
    pub outcomes: Vec<TestOutcome>,
    #[serde(skip)]
    pub log: String,
}

/// How a run ended, given its parsed outcomes and exit code
#[derive(Debug, Clone, PartialEq)]
pub enum RunVerdict {
    Passed(RunResult),
    /// The suite ran and reported failures
    TestsFailed(RunResult),
    /// Non-zero exit with nothing attributable to a test
    ExecutionFailed { exit_code: Option<i32>, log: String },
}

/// Scan the log for pass and error markers
pub fn parse_log(log: &str) -> RunResult {
    let mut result = RunResult { log: log.to_string(), ..Default::default() };

    for line in log.lines() {
        if let Some(passed) = log_markers::passed(line) {
            result.succeeded += 1;
            result.outcomes.push(TestOutcome {
                function_name: TestFunctionName::decode(passed.name).ok(),
                passed: true,
                timing_or_error: format!("{} seconds", passed.duration),
                line: line.trim().to_string(),
            });
        } else if let Some(error) = log_markers::error(line) {
            result.failed += 1;
            result.outcomes.push(TestOutcome {
                function_name: error.name.and_then(|name| TestFunctionName::decode(name).ok()),
                passed: false,
                timing_or_error: error.message.to_string(),
                line: line.trim().to_string(),
            });
        }
    }

    result
}

/// Any failure marker means the tests failed; otherwise a bad exit code means
/// the suite never ran to completion
pub fn verdict(result: RunResult, exit_code: Option<i32>) -> RunVerdict {
    if result.failed > 0 {
        RunVerdict::TestsFailed(result)
    } else if exit_code != Some(0) {
        RunVerdict::ExecutionFailed { exit_code, log: result.log }
    } else {
        RunVerdict::Passed(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{HttpMethod, StatusCode};

    const LOG: &str = "\
   Compiling api-test-suite v0.1.0 (/tmp/run)
    Finished `test` profile [unoptimized + debuginfo] target(s) in 3.10s
     Running tests/api_tests.rs (target/debug/deps/api_tests-1234)
api_test_suite::paths::widgets::GET::test_widgets__GET__response__200__basic ... passed (0.001 seconds)
api_test_suite::paths::widgets::POST::test_widgets__POST__request__new ... error: decoding failed: missing field `name` at line 1 column 2
api_test_suite::paths::other::helper ... passed (0.000 seconds)
";

    #[test]
    fn test_parse_outcomes() {
        let result = parse_log(LOG);
        assert_eq!(result.succeeded, 2);
        assert_eq!(result.failed, 1);
        assert_eq!(result.outcomes.len(), 3);

        let first = &result.outcomes[0];
        let name = first.function_name.as_ref().unwrap();
        assert_eq!(name.method(), HttpMethod::Get);
        assert_eq!(name.status(), Some(StatusCode::Code(200)));
        assert_eq!(first.timing_or_error, "0.001 seconds");
        assert_eq!(first.path().as_deref(), Some("GET /widgets"));
        assert_eq!(first.display_context(), "Example Parsing (200 response)");

        let failed = &result.outcomes[1];
        assert!(!failed.passed);
        assert_eq!(failed.timing_or_error, "decoding failed: missing field `name` at line 1 column 2");
        assert_eq!(failed.display_context(), "Example Parsing (request)");

        // still counted, reported by its raw line
        let foreign = &result.outcomes[2];
        assert!(foreign.function_name.is_none());
        assert!(foreign.display_context().starts_with("api_test_suite::paths::other::helper"));
    }

    #[test]
    fn test_compiler_errors_are_attributed_to_the_run() {
        let result = parse_log("error[E0308]: mismatched types\n  --> src/paths/a/GET.rs:3:5\n");
        assert_eq!(result.failed, 1);
        assert!(result.outcomes[0].function_name.is_none());
        assert!(matches!(verdict(result, Some(101)), RunVerdict::TestsFailed(_)));
    }

    #[test]
    fn test_verdicts() {
        let passed = parse_log(LOG.lines().take(4).collect::<Vec<_>>().join("\n").as_str());
        assert!(matches!(verdict(passed.clone(), Some(0)), RunVerdict::Passed(r) if r.succeeded == 1));

        match verdict(parse_log(LOG), Some(0)) {
            RunVerdict::TestsFailed(result) => assert_eq!((result.succeeded, result.failed), (2, 1)),
            other => panic!("unexpected {:?}", other),
        }

        match verdict(parse_log("Segmentation fault"), Some(139)) {
            RunVerdict::ExecutionFailed { exit_code, log } => {
                assert_eq!(exit_code, Some(139));
                assert_eq!(log, "Segmentation fault");
            }
            other => panic!("unexpected {:?}", other),
        }

        assert!(matches!(verdict(passed, None), RunVerdict::ExecutionFailed { exit_code: None, .. }));
    }
}
