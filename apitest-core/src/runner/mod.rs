//! Build and execution of the generated suite, and parsing of its output

pub mod log_parser;
pub mod process;
pub mod test_runner;

pub use log_parser::{RunResult, RunVerdict, TestOutcome, parse_log, verdict};
pub use process::{CommandRunner, ProcessOutput, ProcessRunner, ProcessSpec};
pub use test_runner::{Execution, SuiteRunner, write_log};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} did not finish within {seconds}s")]
    TimedOut { program: String, seconds: u64 },

    #[error("Failed to write log {path}: {source}")]
    Log {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {exit_code:?}: {output}")]
    Tool {
        program: String,
        exit_code: Option<i32>,
        output: String,
    },
}

pub type Result<T> = std::result::Result<T, RunnerError>;

/// Commands used to build, format and archive a suite
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Build-and-test program, run inside the generated package
    pub program: String,
    pub args: Vec<String>,
    /// Kill the suite after this many seconds
    pub timeout_secs: Option<u64>,
    /// Formatter command; the generated file paths are appended
    pub formatter: Vec<String>,
    /// Archiver command; the archive path and `.` are appended
    pub archiver: Vec<String>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            program: "cargo".to_string(),
            args: vec!["test".to_string(), "--test".to_string(), "api_tests".to_string()],
            timeout_secs: None,
            formatter: vec!["rustfmt".to_string(), "--edition".to_string(), "2021".to_string()],
            archiver: vec!["zip".to_string(), "-q".to_string(), "-r".to_string()],
        }
    }
}
