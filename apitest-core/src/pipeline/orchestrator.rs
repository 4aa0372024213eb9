//! Drives one descriptor through fetch, synthesis, execution and cleanup

use dashmap::DashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::descriptor::{RunLogger, Severity, TestDescriptor};
use super::state_machine::RunStatus;
use super::store::{DescriptorStore, StoreError};
use super::{PipelineError, Result};
use crate::config::PipelineConfig;
use crate::notify::ProgressObserver;
use crate::parser::{OpenApiResolver, SchemaResolver};
use crate::runner::{ProcessRunner, RunVerdict, SuiteRunner, TestOutcome, parse_log, verdict, write_log};
use crate::source::OpenApiSource;
use crate::test_gen::Synthesizer;

const SETUP: &str = "Setup";
const SOURCE: &str = "Schema Source";
const RESOLUTION: &str = "Schema Resolution";
const SYNTHESIS: &str = "Synthesis";
const EXECUTION: &str = "Execution";
const RESULT: &str = "Result";

/// What a passing run produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub succeeded: usize,
    pub outcomes: Vec<TestOutcome>,
    pub log_path: Option<PathBuf>,
    pub archive_path: Option<PathBuf>,
}

/// Files kept after the working directory is gone
#[derive(Debug, Default)]
struct Retained {
    log_path: Option<PathBuf>,
    archive_path: Option<PathBuf>,
}

pub struct Orchestrator {
    config: PipelineConfig,
    resolver: Arc<dyn SchemaResolver>,
    runner: SuiteRunner,
    store: Arc<dyn DescriptorStore>,
    observer: Arc<dyn ProgressObserver>,
    active: DashSet<Uuid>,
}

impl Orchestrator {
    pub fn new(
        config: PipelineConfig,
        process: Arc<dyn ProcessRunner>,
        store: Arc<dyn DescriptorStore>,
        observer: Arc<dyn ProgressObserver>,
    ) -> Self {
        let runner = SuiteRunner::new(config.runner.clone(), process);
        Self {
            config,
            resolver: Arc::new(OpenApiResolver::new()),
            runner,
            store,
            observer,
            active: DashSet::new(),
        }
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn SchemaResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn is_active(&self, id: &Uuid) -> bool {
        self.active.contains(id)
    }

    /// Run the pipeline on its own task
    pub fn spawn(
        self: &Arc<Self>,
        mut descriptor: TestDescriptor,
        source: OpenApiSource,
    ) -> Result<JoinHandle<(TestDescriptor, Result<RunSummary>)>> {
        if self.active.contains(&descriptor.id) || descriptor.status != RunStatus::Pending {
            return Err(PipelineError::AlreadyRunning(descriptor.id));
        }

        let orchestrator = Arc::clone(self);
        Ok(tokio::spawn(async move {
            let result = orchestrator.run(&mut descriptor, &source).await;
            (descriptor, result)
        }))
    }

    /// Drive `descriptor` from `pending` to a terminal state. The working
    /// directory is removed before the terminal transition on every path.
    pub async fn run(&self, descriptor: &mut TestDescriptor, source: &OpenApiSource) -> Result<RunSummary> {
        let id = descriptor.id;
        if descriptor.status != RunStatus::Pending || !self.active.insert(id) {
            return Err(PipelineError::AlreadyRunning(id));
        }

        // the stored record wins over the caller's copy
        match self.store.descriptor(id).await {
            Ok(stored) if stored.status != RunStatus::Pending => {
                self.active.remove(&id);
                warn!(run_id = %id, "Refusing to restart a run that is already {}", stored.status);
                return Err(PipelineError::AlreadyRunning(id));
            }
            Ok(_) | Err(StoreError::NotFound(_)) => {}
            Err(e) => warn!(run_id = %id, "Could not load the stored descriptor: {}", e),
        }

        info!(run_id = %id, "Starting test run for {}", source);
        if let Err(e) = self.store.save_descriptor(descriptor).await {
            warn!(run_id = %id, "Failed to save descriptor: {}", e);
        }

        let mut logger = RunLogger::new(id);
        let work_dir = self.config.work_dir(&id);
        let mut retained = Retained::default();

        let result = self.stages(descriptor, source, &work_dir, &mut logger, &mut retained).await;

        if let Err(e) = cleanup(&work_dir).await {
            logger.warning(None, SETUP, format!("Failed to remove {}: {}", work_dir.display(), e));
        }

        let result = result.map(|(succeeded, outcomes)| RunSummary {
            succeeded,
            outcomes,
            log_path: retained.log_path,
            archive_path: retained.archive_path,
        });

        match &result {
            Ok(summary) => {
                logger.log(Severity::Success, None, RESULT, format!("All {} test(s) passed", summary.succeeded))
            }
            Err(e) => logger.error(RESULT, e.to_string()),
        }

        let terminal = if result.is_ok() { RunStatus::Passed } else { RunStatus::Failed };
        self.transition(descriptor, terminal, &mut logger).await;
        self.flush(id, &mut logger).await;

        self.active.remove(&id);
        info!(run_id = %id, "Test run finished: {}", descriptor.status);
        result
    }

    async fn stages(
        &self,
        descriptor: &mut TestDescriptor,
        source: &OpenApiSource,
        work_dir: &Path,
        logger: &mut RunLogger,
        retained: &mut Retained,
    ) -> Result<(usize, Vec<TestOutcome>)> {
        let id = descriptor.id;

        self.transition(descriptor, RunStatus::Building, logger).await;
        prepare(work_dir).await?;
        logger.info(SETUP, format!("Working directory {}", work_dir.display()));
        self.flush(id, logger).await;

        let document = source.fetch().await?;
        logger.info(SOURCE, format!("Fetched API document from {}", source));

        let resolution = self.resolver.resolve(&document)?;
        for warning in resolution.warnings {
            logger.warning(warning.path, RESOLUTION, warning.message);
        }
        logger.info(RESOLUTION, format!("Resolved {} operation(s)", resolution.document.operations.len()));
        self.flush(id, logger).await;

        let synthesizer = Synthesizer::new(self.config.suite.clone());
        let synthesis = synthesizer.synthesize(&resolution.document);
        for warning in &synthesis.warnings {
            logger.warning(warning.path.clone(), SYNTHESIS, warning.message.clone());
        }
        let written = synthesis.write_to(work_dir).await?;
        logger.info(SYNTHESIS, format!("Generated {} test(s) in {} file(s)", synthesis.test_count, written.len()));

        if self.config.suite.format_output {
            let sources: Vec<PathBuf> = synthesis
                .artifacts
                .iter()
                .filter(|a| a.path.extension().is_some_and(|ext| ext == "rs"))
                .map(|a| a.path.clone())
                .collect();
            if let Err(e) = self.runner.format(work_dir, &sources).await {
                logger.warning(None, SYNTHESIS, format!("Formatting failed: {}", e));
            }
        }
        self.flush(id, logger).await;

        self.transition(descriptor, RunStatus::Running, logger).await;
        let execution = match self.runner.execute(work_dir).await {
            Ok(execution) => execution,
            Err(e) => {
                self.keep_archive(&id, work_dir, logger, retained).await;
                return Err(PipelineError::ExecutionFailed { exit_code: None, log: e.to_string() });
            }
        };
        logger.debug(EXECUTION, format!("Suite exited with {:?} after {:?}", execution.exit_code, execution.duration));

        let log_path = self.config.log_path(&id);
        match write_log(&log_path, &execution.log).await {
            Ok(()) => retained.log_path = Some(log_path),
            Err(e) => logger.warning(None, EXECUTION, e.to_string()),
        }
        self.keep_archive(&id, work_dir, logger, retained).await;

        let parsed = parse_log(&execution.log);
        for outcome in &parsed.outcomes {
            let severity = if outcome.passed { Severity::Success } else { Severity::Error };
            logger.log(severity, outcome.path(), outcome.display_context(), outcome.timing_or_error.clone());
        }
        self.flush(id, logger).await;

        match verdict(parsed, execution.exit_code) {
            RunVerdict::Passed(result) => Ok((result.succeeded, result.outcomes)),
            RunVerdict::TestsFailed(result) => {
                Err(PipelineError::TestsFailed { succeeded: result.succeeded, failed: result.failed })
            }
            RunVerdict::ExecutionFailed { exit_code, log } => Err(PipelineError::ExecutionFailed { exit_code, log }),
        }
    }

    async fn keep_archive(&self, id: &Uuid, work_dir: &Path, logger: &mut RunLogger, retained: &mut Retained) {
        if !self.config.keep_archive {
            return;
        }
        let archive_path = self.config.archive_path(id);
        match self.runner.archive(work_dir, &archive_path).await {
            Ok(()) => retained.archive_path = Some(archive_path),
            Err(e) => logger.warning(None, EXECUTION, format!("Failed to archive suite: {}", e)),
        }
    }

    /// Apply and report a transition. Observer failures never stop the run.
    async fn transition(&self, descriptor: &mut TestDescriptor, to: RunStatus, logger: &mut RunLogger) {
        if let Err(e) = descriptor.transition(to) {
            error!(run_id = %descriptor.id, "{}", e);
            return;
        }
        logger.debug(SETUP, format!("Status changed to {}", to));

        if let Err(e) = self.observer.on_transition(descriptor).await {
            warn!(run_id = %descriptor.id, "Progress notification failed: {}", e);
        }
    }

    async fn flush(&self, id: Uuid, logger: &mut RunLogger) {
        if !logger.has_pending() {
            return;
        }
        if let Err(e) = self.store.append_messages(id, logger.drain()).await {
            warn!(run_id = %id, "Failed to store run messages: {}", e);
        }
    }
}

/// Create an empty working directory, clearing anything left from before
async fn prepare(work_dir: &Path) -> Result<()> {
    let workspace_error = |source| PipelineError::Workspace { path: work_dir.to_path_buf(), source };
    cleanup(work_dir).await.map_err(workspace_error)?;
    tokio::fs::create_dir_all(work_dir).await.map_err(workspace_error)
}

/// Remove a working directory. Removing one that is already gone succeeds.
pub async fn cleanup(work_dir: &Path) -> io::Result<()> {
    match tokio::fs::remove_dir_all(work_dir).await {
        Ok(()) => {
            debug!("Removed {}", work_dir.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
