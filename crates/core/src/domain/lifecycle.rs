// Extraction Job Lifecycle

use super::error::{DomainError, Result};
use std::fmt;

/// Job lifecycle: Uninitialized -> Ready -> Polling (loop) -> Closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Uninitialized,
    Ready,
    Polling,
    Closed,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Closed)
    }

    /// Validate a transition and return the new state
    pub fn transition(self, to: JobState) -> Result<JobState> {
        use JobState::*;
        match (self, to) {
            (Uninitialized, Ready)
            | (Ready, Polling)
            | (Polling, Polling)
            | (Uninitialized, Closed)
            | (Ready, Closed)
            | (Polling, Closed) => Ok(to),
            _ => Err(DomainError::InvalidStateTransition {
                from: self.to_string(),
                to: to.to_string(),
            }),
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobState::Uninitialized => write!(f, "UNINITIALIZED"),
            JobState::Ready => write!(f, "READY"),
            JobState::Polling => write!(f, "POLLING"),
            JobState::Closed => write!(f, "CLOSED"),
        }
    }
}
