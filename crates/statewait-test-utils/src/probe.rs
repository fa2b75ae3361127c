//! Scripted probes
//!
//! Replay a fixed sequence of observations. The payload of every found
//! observation is the 1-based call number, so tests can check which probe
//! produced the final value.

use crate::clock::ManualClock;
use statewait::{ProbeError, ProbeResult};
use std::future::{ready, Ready};
use std::time::Duration;

/// One scripted observation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Resource exists in this state
    State(String),
    /// Probe reports the resource as absent
    Absent,
    /// Probe fails with [`ProbeError::NotFound`]
    NotFoundError,
    /// Probe fails with any other error
    Error(String),
}

impl Step {
    pub fn state(s: impl Into<String>) -> Self {
        Self::State(s.into())
    }
}

/// Probe that replays `steps`, repeating the last one once exhausted.
#[derive(Debug)]
pub struct ScriptedProbe {
    steps: Vec<Step>,
    calls: u32,
    latency: Option<(ManualClock, Duration)>,
}

impl ScriptedProbe {
    pub fn new(steps: Vec<Step>) -> Self {
        assert!(!steps.is_empty(), "script needs at least one step");
        Self {
            steps,
            calls: 0,
            latency: None,
        }
    }

    /// Script made only of found states
    pub fn states<I, S>(states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(states.into_iter().map(|s| Step::State(s.into())).collect())
    }

    /// Advance `clock` by `latency` on every call
    pub fn with_latency(mut self, clock: ManualClock, latency: Duration) -> Self {
        self.latency = Some((clock, latency));
        self
    }

    /// Number of probes performed so far
    pub fn calls(&self) -> u32 {
        self.calls
    }

    /// Next observation, synchronously
    pub fn next_blocking(&mut self) -> Result<ProbeResult<u32>, ProbeError> {
        self.calls += 1;
        if let Some((clock, latency)) = &self.latency {
            clock.advance(*latency);
        }

        let index = (self.calls as usize - 1).min(self.steps.len() - 1);
        match &self.steps[index] {
            Step::State(state) => Ok(ProbeResult::found(state.clone(), self.calls)),
            Step::Absent => Ok(ProbeResult::not_found()),
            Step::NotFoundError => Err(ProbeError::not_found(format!("call {}", self.calls))),
            Step::Error(message) => Err(anyhow::anyhow!("{}", message).into()),
        }
    }

    /// Next observation as a ready future, for async pollers
    pub fn next(&mut self) -> Ready<Result<ProbeResult<u32>, ProbeError>> {
        ready(self.next_blocking())
    }
}
