//! Persisted records of a run: the descriptor and its message log

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::state_machine::{RunStatus, TransitionError, check_transition};

/// One test-suite run and where it is in its lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestDescriptor {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub status: RunStatus,
}

impl TestDescriptor {
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4())
    }

    pub fn with_id(id: Uuid) -> Self {
        Self { id, created_at: Utc::now(), finished_at: None, status: RunStatus::Pending }
    }

    /// Move to `to`, stamping `finished_at` when the run ends
    pub fn transition(&mut self, to: RunStatus) -> Result<(), TransitionError> {
        check_transition(self.status, to)?;
        self.status = to;
        if to.is_terminal() {
            self.finished_at = Some(Utc::now());
        }
        Ok(())
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }
}

impl Default for TestDescriptor {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Success,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Success => write!(f, "success"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A log entry belonging to exactly one descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestMessage {
    pub descriptor_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub severity: Severity,
    /// `METHOD /path` the message is about, if any
    pub path: Option<String>,
    pub context: String,
    pub message: String,
}

/// Collects messages for one run and mirrors them to tracing
#[derive(Debug)]
pub struct RunLogger {
    descriptor_id: Uuid,
    pending: Vec<TestMessage>,
}

impl RunLogger {
    pub fn new(descriptor_id: Uuid) -> Self {
        Self { descriptor_id, pending: Vec::new() }
    }

    pub fn log(
        &mut self,
        severity: Severity,
        path: Option<String>,
        context: impl Into<String>,
        message: impl Into<String>,
    ) {
        let entry = TestMessage {
            descriptor_id: self.descriptor_id,
            created_at: Utc::now(),
            severity,
            path,
            context: context.into(),
            message: message.into(),
        };

        let run_id = &entry.descriptor_id;
        let path = entry.path.as_deref().unwrap_or("-");
        match severity {
            Severity::Debug => debug!(run_id = %run_id, path, "{}: {}", entry.context, entry.message),
            Severity::Info | Severity::Success => {
                info!(run_id = %run_id, path, "{}: {}", entry.context, entry.message)
            }
            Severity::Warning => warn!(run_id = %run_id, path, "{}: {}", entry.context, entry.message),
            Severity::Error => error!(run_id = %run_id, path, "{}: {}", entry.context, entry.message),
        }

        self.pending.push(entry);
    }

    pub fn debug(&mut self, context: impl Into<String>, message: impl Into<String>) {
        self.log(Severity::Debug, None, context, message);
    }

    pub fn info(&mut self, context: impl Into<String>, message: impl Into<String>) {
        self.log(Severity::Info, None, context, message);
    }

    pub fn warning(&mut self, path: Option<String>, context: impl Into<String>, message: impl Into<String>) {
        self.log(Severity::Warning, path, context, message);
    }

    pub fn error(&mut self, context: impl Into<String>, message: impl Into<String>) {
        self.log(Severity::Error, None, context, message);
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Hand over everything logged since the last drain
    pub fn drain(&mut self) -> Vec<TestMessage> {
        std::mem::take(&mut self.pending)
    }
}
