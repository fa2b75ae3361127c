//! Poll run configuration
//!
//! A [`PollConfig`] is built per call site right before waiting and
//! validated once by [`PollConfigBuilder::build`]. It is immutable after that.

use crate::backoff::Backoff;
use crate::defaults::*;
use crate::error::ConfigError;
use std::collections::BTreeSet;
use std::time::Duration;

/// Configuration for one polling run
#[derive(Debug, Clone)]
pub struct PollConfig {
    resource: String,
    pending_states: BTreeSet<String>,
    target_states: BTreeSet<String>,
    timeout: Duration,
    initial_delay: Duration,
    poll_interval: Option<Duration>,
    min_interval: Duration,
    max_interval: Duration,
    jitter: bool,
    continuous_target_occurrences: u32,
    not_found_checks: u32,
    not_found_is_terminal: bool,
}

impl PollConfig {
    /// Start building a configuration
    pub fn builder() -> PollConfigBuilder {
        PollConfigBuilder::default()
    }

    /// Label used in logs and errors
    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn pending_states(&self) -> &BTreeSet<String> {
        &self.pending_states
    }

    pub fn target_states(&self) -> &BTreeSet<String> {
        &self.target_states
    }

    pub fn is_pending(&self, state: &str) -> bool {
        self.pending_states.contains(state)
    }

    pub fn is_target(&self, state: &str) -> bool {
        self.target_states.contains(state)
    }

    /// Whether this waits for the resource to disappear
    pub fn absence_is_success(&self) -> bool {
        self.target_states.is_empty() && self.not_found_is_terminal
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    pub fn poll_interval(&self) -> Option<Duration> {
        self.poll_interval
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    pub fn max_interval(&self) -> Duration {
        self.max_interval
    }

    pub fn continuous_target_occurrences(&self) -> u32 {
        self.continuous_target_occurrences
    }

    pub fn not_found_checks(&self) -> u32 {
        self.not_found_checks
    }

    pub fn not_found_is_terminal(&self) -> bool {
        self.not_found_is_terminal
    }

    /// Delay policy between probes
    pub fn backoff(&self) -> Backoff {
        let backoff = match self.poll_interval {
            Some(interval) => Backoff::fixed(interval),
            None => Backoff::exponential(DEFAULT_INITIAL_BACKOFF, self.max_interval),
        };
        backoff.with_floor(self.min_interval).with_jitter(self.jitter)
    }
}

/// Builder for [`PollConfig`]
///
/// # Example
///
/// ```
/// use statewait::PollConfig;
/// use std::time::Duration;
///
/// let config = PollConfig::builder()
///     .resource("storage gateway")
///     .pending(["CREATING"])
///     .target(["AVAILABLE"])
///     .timeout(Duration::from_secs(300))
///     .min_interval(Duration::from_secs(10))
///     .build()
///     .unwrap();
/// assert!(config.is_pending("CREATING"));
/// ```
#[derive(Debug, Clone)]
pub struct PollConfigBuilder {
    resource: String,
    pending_states: BTreeSet<String>,
    target_states: BTreeSet<String>,
    timeout: Duration,
    initial_delay: Duration,
    poll_interval: Option<Duration>,
    min_interval: Duration,
    max_interval: Duration,
    jitter: bool,
    continuous_target_occurrences: u32,
    not_found_checks: u32,
    not_found_is_terminal: bool,
}

impl Default for PollConfigBuilder {
    fn default() -> Self {
        Self {
            resource: DEFAULT_RESOURCE_NAME.to_string(),
            pending_states: BTreeSet::new(),
            target_states: BTreeSet::new(),
            timeout: DEFAULT_TIMEOUT,
            initial_delay: Duration::ZERO,
            poll_interval: None,
            min_interval: Duration::ZERO,
            max_interval: DEFAULT_MAX_INTERVAL,
            jitter: false,
            continuous_target_occurrences: DEFAULT_CONTINUOUS_TARGET_OCCURRENCES,
            not_found_checks: DEFAULT_NOT_FOUND_CHECKS,
            not_found_is_terminal: false,
        }
    }
}

impl PollConfigBuilder {
    pub fn resource(mut self, name: impl Into<String>) -> Self {
        self.resource = name.into();
        self
    }

    /// Add states meaning "still in progress"
    pub fn pending<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pending_states.extend(states.into_iter().map(Into::into));
        self
    }

    /// Add states meaning "done"
    pub fn target<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target_states.extend(states.into_iter().map(Into::into));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Delay before the first probe; counts against the timeout
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Probe at a fixed interval instead of backing off exponentially
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    /// Floor applied to every delay
    pub fn min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = interval;
        self
    }

    /// Cap on exponential growth
    pub fn max_interval(mut self, interval: Duration) -> Self {
        self.max_interval = interval;
        self
    }

    pub fn jitter(mut self, enabled: bool) -> Self {
        self.jitter = enabled;
        self
    }

    pub fn continuous_target_occurrences(mut self, n: u32) -> Self {
        self.continuous_target_occurrences = n;
        self
    }

    /// Consecutive absences tolerated while waiting for a target
    pub fn not_found_checks(mut self, n: u32) -> Self {
        self.not_found_checks = n;
        self
    }

    /// With no target states, treat absence as success
    pub fn not_found_is_terminal(mut self, terminal: bool) -> Self {
        self.not_found_is_terminal = terminal;
        self
    }

    /// Shorthand for a delete-style wait: no targets, absence is success
    pub fn until_gone(self) -> Self {
        self.not_found_is_terminal(true)
    }

    /// Validate and freeze the configuration
    pub fn build(self) -> Result<PollConfig, ConfigError> {
        if self.timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout);
        }
        if self.continuous_target_occurrences == 0 {
            return Err(ConfigError::InvalidTargetOccurrences(0));
        }
        if self.poll_interval.is_some_and(|d| d.is_zero()) {
            return Err(ConfigError::InvalidPollInterval);
        }
        if self.max_interval.is_zero() {
            return Err(ConfigError::InvalidMaxInterval);
        }
        if self.min_interval > self.max_interval {
            return Err(ConfigError::InvalidIntervalBounds {
                min: self.min_interval,
                max: self.max_interval,
            });
        }

        let overlap: Vec<String> = self
            .pending_states
            .intersection(&self.target_states)
            .cloned()
            .collect();
        if !overlap.is_empty() {
            return Err(ConfigError::OverlappingStates(overlap));
        }

        Ok(PollConfig {
            resource: self.resource,
            pending_states: self.pending_states,
            target_states: self.target_states,
            timeout: self.timeout,
            initial_delay: self.initial_delay,
            poll_interval: self.poll_interval,
            min_interval: self.min_interval,
            max_interval: self.max_interval,
            jitter: self.jitter,
            continuous_target_occurrences: self.continuous_target_occurrences,
            not_found_checks: self.not_found_checks,
            not_found_is_terminal: self.not_found_is_terminal,
        })
    }
}
