//! Test suite synthesis from resolved API operations
//!
//! The synthesizer turns a [`ResolvedDocument`](crate::parser::ResolvedDocument)
//! into a standalone Rust package: one module per path segment, one module per
//! operation, and one test function per named example or `x-tests` entry.

pub mod classifier;
pub mod frameworks;
pub mod generator;
pub mod live;
pub mod naming;
pub mod plan;
pub mod types;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

pub use generator::Synthesizer;
pub use naming::{Direction, TestFunctionName, TestKind};
pub use types::{DerivedType, Strategy};

/// Filesystem failures while writing the generated package
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// How generated tests decode payloads
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParserMode {
    /// Straight from text into the derived type
    #[default]
    Fast,
    /// Through an intermediate JSON tree
    Stable,
}

/// Options for one synthesized suite
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestSuiteConfig {
    /// Replaces the document's first server URL in live request tests
    pub api_host_override: Option<String>,
    /// Run the formatter over the generated sources
    pub format_output: bool,
    /// Also check examples against the JSON schema
    pub validate_schema: bool,
    pub parser_mode: ParserMode,
}

/// One generated file, relative to the package root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    pub path: PathBuf,
    pub contents: String,
}

/// A body or test that was skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisWarning {
    /// `METHOD /path` of the affected operation
    pub path: Option<String>,
    pub message: String,
}

/// Output of one synthesizer run
#[derive(Debug, Clone, Default)]
pub struct Synthesis {
    pub artifacts: Vec<GeneratedArtifact>,
    pub test_count: usize,
    pub warnings: Vec<SynthesisWarning>,
}

impl Synthesis {
    pub fn artifact(&self, path: impl AsRef<Path>) -> Option<&GeneratedArtifact> {
        self.artifacts.iter().find(|a| a.path == path.as_ref())
    }

    /// Write every artifact below `root`, returning the paths written
    pub async fn write_to(&self, root: &Path) -> Result<Vec<PathBuf>, SynthesisError> {
        let mut written = Vec::with_capacity(self.artifacts.len());
        for artifact in &self.artifacts {
            let path = root.join(&artifact.path);
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|source| SynthesisError::CreateDir { path: parent.to_path_buf(), source })?;
            }
            tokio::fs::write(&path, &artifact.contents)
                .await
                .map_err(|source| SynthesisError::Write { path: path.clone(), source })?;
            debug!("Wrote {}", path.display());
            written.push(path);
        }
        Ok(written)
    }
}
