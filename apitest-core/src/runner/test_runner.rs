use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::process::{ProcessRunner, ProcessSpec};
use super::{Result, RunnerConfig, RunnerError};

/// Raw outcome of running the suite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    pub exit_code: Option<i32>,
    pub log: String,
    pub duration: Duration,
}

/// Builds, runs, formats and archives a generated package
pub struct SuiteRunner {
    config: RunnerConfig,
    process: Arc<dyn ProcessRunner>,
}

impl SuiteRunner {
    pub fn new(config: RunnerConfig, process: Arc<dyn ProcessRunner>) -> Self {
        Self { config, process }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Run the build-and-test command inside `root` and wait for it to exit
    pub async fn execute(&self, root: &Path) -> Result<Execution> {
        let start = Instant::now();
        let spec = ProcessSpec::new(&self.config.program, root)
            .args(self.config.args.iter().cloned())
            .timeout(self.config.timeout_secs.map(Duration::from_secs));

        info!("Running suite: {}", spec.command_line());
        let output = self.process.run(spec).await.map_err(|source| self.classify(&self.config.program, source))?;

        let duration = start.elapsed();
        debug!("Suite exited with {:?} after {:?}", output.exit_code, duration);
        Ok(Execution { exit_code: output.exit_code, log: output.output, duration })
    }

    /// Run the formatter over `files` (relative to `root`)
    pub async fn format(&self, root: &Path, files: &[PathBuf]) -> Result<()> {
        let Some((program, args)) = self.config.formatter.split_first() else {
            return Ok(());
        };
        if files.is_empty() {
            return Ok(());
        }

        let spec = ProcessSpec::new(program, root)
            .args(args.iter().cloned())
            .args(files.iter().map(|f| f.to_string_lossy().into_owned()));
        self.run_tool(spec).await
    }

    /// Zip the contents of `root` into `archive`
    pub async fn archive(&self, root: &Path, archive: &Path) -> Result<()> {
        let Some((program, args)) = self.config.archiver.split_first() else {
            warn!("No archiver configured; {} not written", archive.display());
            return Ok(());
        };

        if let Some(parent) = archive.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| RunnerError::Log { path: parent.to_path_buf(), source })?;
        }

        let spec = ProcessSpec::new(program, root)
            .args(args.iter().cloned())
            .args([archive.to_string_lossy().into_owned(), ".".to_string()]);
        self.run_tool(spec).await?;
        info!("Archived {} to {}", root.display(), archive.display());
        Ok(())
    }

    async fn run_tool(&self, spec: ProcessSpec) -> Result<()> {
        let program = spec.program.clone();
        let output = self.process.run(spec).await.map_err(|source| self.classify(&program, source))?;
        if output.success() {
            Ok(())
        } else {
            Err(RunnerError::Tool { program, exit_code: output.exit_code, output: output.output.trim().to_string() })
        }
    }

    fn classify(&self, program: &str, source: io::Error) -> RunnerError {
        match source.kind() {
            io::ErrorKind::TimedOut => RunnerError::TimedOut {
                program: program.to_string(),
                seconds: self.config.timeout_secs.unwrap_or_default(),
            },
            _ => RunnerError::Spawn { program: program.to_string(), source },
        }
    }
}

/// Write the raw log, creating its directory
pub async fn write_log(path: &Path, log: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| RunnerError::Log { path: parent.to_path_buf(), source })?;
    }
    tokio::fs::write(path, log).await.map_err(|source| RunnerError::Log { path: path.to_path_buf(), source })
}
