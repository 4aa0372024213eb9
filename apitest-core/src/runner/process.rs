//! Subprocess execution behind an injectable trait

use async_trait::async_trait;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::debug;

/// What to run and where
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSpec {
    pub program: String,
    pub args: Vec<String>,
    pub current_dir: PathBuf,
    pub timeout: Option<Duration>,
}

impl ProcessSpec {
    pub fn new(program: impl Into<String>, current_dir: impl Into<PathBuf>) -> Self {
        Self { program: program.into(), args: Vec::new(), current_dir: current_dir.into(), timeout: None }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// `program arg1 arg2`
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Result of a finished process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
    /// Standard output followed by standard error
    pub output: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs a process to completion. A timeout is reported as
/// [`io::ErrorKind::TimedOut`].
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, spec: ProcessSpec) -> io::Result<ProcessOutput>;
}

/// Runs real processes with tokio
#[derive(Debug, Default, Clone)]
pub struct CommandRunner;

impl CommandRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessRunner for CommandRunner {
    async fn run(&self, spec: ProcessSpec) -> io::Result<ProcessOutput> {
        let start = Instant::now();
        debug!("Running {} in {}", spec.command_line(), spec.current_dir.display());

        let mut command = Command::new(&spec.program);
        command
            .args(&spec.args)
            .current_dir(&spec.current_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match spec.timeout {
            Some(limit) => tokio::time::timeout(limit, command.output()).await.map_err(|_| {
                io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("{} did not finish within {}s", spec.program, limit.as_secs()),
                )
            })??,
            None => command.output().await?,
        };

        debug!("{} exited with {:?} after {:?}", spec.program, output.status.code(), start.elapsed());

        Ok(ProcessOutput {
            exit_code: output.status.code(),
            output: format!(
                "{}\n{}",
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            ),
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_command_line() {
        let spec = ProcessSpec::new("cargo", "/tmp").args(["test", "--test", "api_tests"]);
        assert_eq!(spec.command_line(), "cargo test --test api_tests");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_combines_stdout_and_stderr() {
        let dir = TempDir::new().unwrap();
        let spec = ProcessSpec::new("sh", dir.path()).args(["-c", "echo out; echo err 1>&2; exit 3"]);

        let output = CommandRunner::new().run(spec).await.unwrap();
        assert_eq!(output.exit_code, Some(3));
        assert!(!output.success());
        assert!(output.output.contains("out"));
        assert!(output.output.contains("err"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout() {
        let dir = TempDir::new().unwrap();
        let spec = ProcessSpec::new("sleep", dir.path()).args(["5"]).timeout(Some(Duration::from_millis(50)));

        let err = CommandRunner::new().run(spec).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
    }

    #[tokio::test]
    async fn test_missing_program() {
        let dir = TempDir::new().unwrap();
        let spec = ProcessSpec::new("definitely-not-a-real-program-xyz", dir.path());
        assert!(CommandRunner::new().run(spec).await.is_err());
    }
}
