//! Error taxonomy for polling
//!
//! - [`ConfigError`]: a [`PollConfig`](crate::PollConfig) violates an invariant
//! - [`ProbeError`]: a single probe could not report a state
//! - [`PollError`]: a poll run stopped without reaching its target
//! - [`WaitError`]: any non-successful outcome, for `?` propagation

use std::time::Duration;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// timeout is zero
    #[error("timeout must be greater than 0")]
    InvalidTimeout,

    /// continuous_target_occurrences is zero
    #[error("continuous_target_occurrences must be at least 1, got {0}")]
    InvalidTargetOccurrences(u32),

    /// A state is both pending and target
    #[error("states cannot be both pending and target: {}", .0.join(", "))]
    OverlappingStates(Vec<String>),

    /// min_interval exceeds max_interval
    #[error("min_interval ({min:?}) must not exceed max_interval ({max:?})")]
    InvalidIntervalBounds { min: Duration, max: Duration },

    /// poll_interval set to zero
    #[error("poll_interval must be greater than 0 when set")]
    InvalidPollInterval,

    /// max_interval set to zero
    #[error("max_interval must be greater than 0")]
    InvalidMaxInterval,
}

/// Failure reported by a single probe
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The resource does not exist (yet, or any more)
    #[error("not found: {0}")]
    NotFound(String),

    /// Network, auth, or decoding failure
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ProbeError {
    /// Create a not-found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Reason a poll run stopped early
#[derive(Debug, Error)]
pub enum PollError {
    /// Observed a state that is neither pending nor target
    #[error("{resource} entered unexpected state '{state}', wanted target '{}'", .expected.join(", "))]
    UnexpectedState {
        resource: String,
        state: String,
        expected: Vec<String>,
    },

    /// The probe itself failed
    #[error("probe for {resource} failed: {source}")]
    Probe {
        resource: String,
        #[source]
        source: anyhow::Error,
    },

    /// The resource stayed absent for longer than tolerated
    #[error("couldn't find {resource} ({checks} consecutive checks)")]
    NotFound { resource: String, checks: u32 },

    /// The runtime backing a blocking poll could not start
    #[error("failed to start polling runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

impl PollError {
    /// Check if the resource entered a dead-end state
    pub fn is_unexpected_state(&self) -> bool {
        matches!(self, Self::UnexpectedState { .. })
    }

    /// Check if this came from the probe call
    pub fn is_probe_error(&self) -> bool {
        matches!(self, Self::Probe { .. })
    }

    /// Check if the resource was missing for too long
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// The state that stopped the run, if any
    pub fn state(&self) -> Option<&str> {
        match self {
            Self::UnexpectedState { state, .. } => Some(state),
            _ => None,
        }
    }
}

/// Non-successful outcome of a wait, converted for `?` propagation
#[derive(Debug, Error)]
pub enum WaitError {
    /// The target was never durably reached within the budget
    #[error(
        "{resource} did not complete within {timeout:?} (last state: {})",
        .last_state.as_deref().unwrap_or("none")
    )]
    Timeout {
        resource: String,
        timeout: Duration,
        last_state: Option<String>,
    },

    /// The operation failed
    #[error(transparent)]
    Failed(#[from] PollError),

    /// The surrounding operation was aborted
    #[error("wait for {resource} cancelled")]
    Cancelled { resource: String },
}

impl WaitError {
    /// Check if this is a timeout rather than a failure
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Check if the wait was cancelled
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}
