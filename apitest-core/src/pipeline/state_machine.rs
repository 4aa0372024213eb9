//! Lifecycle of one test run

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Pending,
    Building,
    Running,
    Passed,
    Failed,
}

impl RunStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Passed | Self::Failed)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Building => write!(f, "building"),
            Self::Running => write!(f, "running"),
            Self::Passed => write!(f, "passed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid transition from {from} to {to}")]
pub struct TransitionError {
    pub from: RunStatus,
    pub to: RunStatus,
}

/// Runs only move forward; any non-terminal state may fail
pub fn is_valid_transition(from: RunStatus, to: RunStatus) -> bool {
    use RunStatus::*;

    match (from, to) {
        (Pending, Building) => true,
        (Pending, Running) => true,
        (Pending, Failed) => true,

        (Building, Running) => true,
        (Building, Failed) => true,

        (Running, Passed) => true,
        (Running, Failed) => true,

        _ => false,
    }
}

pub fn check_transition(from: RunStatus, to: RunStatus) -> Result<(), TransitionError> {
    if is_valid_transition(from, to) {
        Ok(())
    } else {
        Err(TransitionError { from, to })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use RunStatus::*;

    const ALL: [RunStatus; 5] = [Pending, Building, Running, Passed, Failed];

    #[test]
    fn test_forward_path() {
        assert!(is_valid_transition(Pending, Building));
        assert!(is_valid_transition(Building, Running));
        assert!(is_valid_transition(Running, Passed));
        assert!(is_valid_transition(Building, Failed));
    }

    #[test]
    fn test_transitions_never_go_backward() {
        for from in ALL {
            for to in ALL {
                if is_valid_transition(from, to) {
                    assert!(to > from, "{} -> {} moves backward", from, to);
                    assert!(!from.is_terminal());
                }
            }
        }
    }

    #[test]
    fn test_terminal_states_are_final() {
        for to in ALL {
            assert!(check_transition(Passed, to).is_err());
            assert!(check_transition(Failed, to).is_err());
        }
        assert_eq!(
            check_transition(Running, Building).unwrap_err().to_string(),
            "Invalid transition from running to building"
        );
    }
}
