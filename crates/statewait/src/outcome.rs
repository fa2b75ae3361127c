//! Result of a completed poll run

use crate::error::{PollError, WaitError};
use std::time::Duration;

/// How a poll run ended
#[derive(Debug)]
pub enum PollOutcome<T> {
    /// Target reached. Holds the payload of the final probe, or `None`
    /// when absence of the resource was the success condition.
    Success(Option<T>),

    /// The budget ran out before a terminal condition
    TimedOut {
        last_state: Option<String>,
        attempts: u32,
        elapsed: Duration,
    },

    /// Dead-end state, probe failure, or prolonged absence
    Failed(PollError),

    /// The cancellation token fired
    Cancelled {
        last_state: Option<String>,
        attempts: u32,
    },
}

impl<T> PollOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn is_timed_out(&self) -> bool {
        matches!(self, Self::TimedOut { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Last state seen before a timeout or cancellation
    pub fn last_state(&self) -> Option<&str> {
        match self {
            Self::TimedOut { last_state, .. } | Self::Cancelled { last_state, .. } => {
                last_state.as_deref()
            }
            Self::Failed(e) => e.state(),
            Self::Success(_) => None,
        }
    }

    /// Convert into a `Result`, attaching `resource` and `timeout` to
    /// timeout and cancellation errors.
    pub fn into_result(
        self,
        resource: &str,
        timeout: Duration,
    ) -> Result<Option<T>, WaitError> {
        match self {
            Self::Success(payload) => Ok(payload),
            Self::TimedOut { last_state, .. } => Err(WaitError::Timeout {
                resource: resource.to_string(),
                timeout,
                last_state,
            }),
            Self::Failed(e) => Err(WaitError::Failed(e)),
            Self::Cancelled { .. } => Err(WaitError::Cancelled {
                resource: resource.to_string(),
            }),
        }
    }
}
