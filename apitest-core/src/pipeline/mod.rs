//! Orchestration of a test run from schema source to verdict
//!
//! A run moves one [`TestDescriptor`] through `pending → building → running →
//! passed|failed`. Every transition is reported to a
//! [`ProgressObserver`](crate::notify::ProgressObserver), and every fatal cause
//! is classified into a single [`PipelineError`] so a scheduler can tell a
//! failed suite from a broken run.

pub mod descriptor;
pub mod orchestrator;
pub mod state_machine;
pub mod store;

pub use descriptor::{RunLogger, Severity, TestDescriptor, TestMessage};
pub use orchestrator::{Orchestrator, RunSummary, cleanup};
pub use state_machine::{RunStatus, TransitionError, is_valid_transition};
pub use store::{DescriptorStore, InMemoryStore, StoreError};

use crate::parser::ResolveError;
use crate::source::SourceError;
use crate::test_gen::SynthesisError;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to fetch API document: {0}")]
    SourceFetch(#[from] SourceError),

    #[error("Failed to resolve API document: {0}")]
    Resolve(#[from] ResolveError),

    #[error("Failed to prepare working directory {path}: {source}")]
    Workspace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write test suite: {0}")]
    Synthesis(#[from] SynthesisError),

    #[error("{failed} test(s) failed, {succeeded} passed")]
    TestsFailed { succeeded: usize, failed: usize },

    #[error("Test suite did not run to completion (exit code {exit_code:?})")]
    ExecutionFailed { exit_code: Option<i32>, log: String },

    #[error("Descriptor {0} is already running or finished")]
    AlreadyRunning(Uuid),
}

impl PipelineError {
    /// A failed suite is a completed run; everything else may be rescheduled
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::TestsFailed { .. } | Self::AlreadyRunning(_))
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
