//! Pipeline configuration

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::runner::RunnerConfig;
use crate::test_gen::TestSuiteConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Per-run working directories are created below this
    pub output_root: PathBuf,

    /// Raw logs and zip archives
    pub archive_root: PathBuf,

    /// Zip the generated package before it is removed
    pub keep_archive: bool,

    pub runner: RunnerConfig,

    pub suite: TestSuiteConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("./test-output"),
            archive_root: PathBuf::from("./test-archives"),
            keep_archive: false,
            runner: RunnerConfig::default(),
            suite: TestSuiteConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Self = toml::from_str(&content).context("Failed to parse pipeline config")?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize pipeline config")?;

        std::fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    pub fn work_dir(&self, run_id: &uuid::Uuid) -> PathBuf {
        self.output_root.join(run_id.to_string())
    }

    pub fn log_path(&self, run_id: &uuid::Uuid) -> PathBuf {
        self.archive_root.join(format!("{}.log", run_id))
    }

    pub fn archive_path(&self, run_id: &uuid::Uuid) -> PathBuf {
        self.archive_root.join(format!("{}.zip", run_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_gen::ParserMode;
    use tempfile::TempDir;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("apitest.toml");
        std::fs::write(
            &path,
            r#"
keep_archive = true

[runner]
timeout_secs = 600

[suite]
parser_mode = "stable"
api_host_override = "http://localhost:8080"
"#,
        )
        .unwrap();

        let config = PipelineConfig::from_file(&path).unwrap();
        assert!(config.keep_archive);
        assert_eq!(config.output_root, PathBuf::from("./test-output"));
        assert_eq!(config.runner.timeout_secs, Some(600));
        assert_eq!(config.runner.program, "cargo");
        assert_eq!(config.suite.parser_mode, ParserMode::Stable);
        assert_eq!(config.suite.api_host_override.as_deref(), Some("http://localhost:8080"));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("apitest.toml");
        let mut config = PipelineConfig::default();
        config.suite.validate_schema = true;

        config.save(&path).unwrap();
        assert_eq!(PipelineConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_run_paths() {
        let config = PipelineConfig::default();
        let id = uuid::Uuid::nil();
        assert_eq!(config.work_dir(&id), PathBuf::from("./test-output/00000000-0000-0000-0000-000000000000"));
        assert_eq!(
            config.archive_path(&id),
            PathBuf::from("./test-archives/00000000-0000-0000-0000-000000000000.zip")
        );
        assert!(config.log_path(&id).to_string_lossy().ends_with(".log"));
    }

    #[test]
    fn test_invalid_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "keep_archive = \"yes\"").unwrap();
        assert!(PipelineConfig::from_file(&path).is_err());
    }
}
