//! Outcome summary and exit codes

use crate::probe::parse_state;
use serde::Serialize;
use statewait::{PollConfig, PollOutcome};
use std::process::ExitCode;

/// How the wait ended, as printed and serialized
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display, strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OutcomeKind {
    Success,
    Failed,
    TimedOut,
    Cancelled,
}

impl OutcomeKind {
    pub fn exit_code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Failed => 1,
            Self::TimedOut => 2,
            Self::Cancelled => 130,
        }
    }
}

/// Exit code for invalid arguments or settings
pub const USAGE_EXIT_CODE: u8 = 64;

/// Summary of one wait
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub resource: String,
    pub outcome: OutcomeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl Report {
    pub fn from_outcome(config: &PollConfig, outcome: PollOutcome<String>) -> Self {
        let resource = config.resource().to_string();
        let state = outcome.last_state().map(ToString::to_string);

        match outcome {
            PollOutcome::Success(output) => Self {
                resource,
                outcome: OutcomeKind::Success,
                state: output.as_deref().and_then(parse_state),
                attempts: None,
                error: None,
                output,
            },
            PollOutcome::TimedOut { attempts, .. } => Self {
                error: outcome
                    .into_result(&resource, config.timeout())
                    .err()
                    .map(|e| e.to_string()),
                resource,
                outcome: OutcomeKind::TimedOut,
                state,
                attempts: Some(attempts),
                output: None,
            },
            PollOutcome::Failed(e) => Self {
                resource,
                outcome: OutcomeKind::Failed,
                state,
                attempts: None,
                error: Some(format!("{:#}", anyhow::Error::new(e))),
                output: None,
            },
            PollOutcome::Cancelled { attempts, .. } => Self {
                error: Some(format!("wait for {resource} cancelled")),
                resource,
                outcome: OutcomeKind::Cancelled,
                state,
                attempts: Some(attempts),
                output: None,
            },
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.outcome.exit_code())
    }

    /// One line for humans
    pub fn summary(&self) -> String {
        match (&self.error, &self.state) {
            (Some(error), _) => format!("{}: {}", self.outcome, error),
            (None, Some(state)) => format!("{}: {} is {}", self.outcome, self.resource, state),
            (None, None) => format!("{}: {} is gone", self.outcome, self.resource),
        }
    }
}
