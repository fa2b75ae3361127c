//! Wait settings from a JSON file and command-line flags
//!
//! Flags override file values; state lists given on the command line
//! replace the file's lists rather than extending them.

use crate::cli::Args;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use statewait::PollConfig;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Default per-probe timeout in seconds
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 60;

/// Settings for one `statewait` invocation
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WaitSettings {
    pub resource: Option<String>,
    pub pending: Vec<String>,
    pub target: Vec<String>,
    pub timeout_secs: Option<u64>,
    pub poll_interval_secs: Option<u64>,
    pub min_interval_secs: Option<u64>,
    pub max_interval_secs: Option<u64>,
    pub initial_delay_secs: Option<u64>,
    pub continuous_target_occurrences: Option<u32>,
    pub not_found_checks: Option<u32>,
    pub not_found_is_terminal: bool,
    pub not_found_exit_code: Option<i32>,
    pub probe_timeout_secs: Option<u64>,
}

impl WaitSettings {
    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Settings given as flags
    pub fn from_args(args: &Args) -> Self {
        Self {
            resource: args.name.clone(),
            pending: args.pending.clone(),
            target: args.target.clone(),
            timeout_secs: args.timeout,
            poll_interval_secs: args.interval,
            min_interval_secs: args.min_interval,
            max_interval_secs: args.max_interval,
            initial_delay_secs: args.delay,
            continuous_target_occurrences: args.occurrences,
            not_found_checks: args.not_found_checks,
            not_found_is_terminal: args.gone,
            not_found_exit_code: args.not_found_exit_code,
            probe_timeout_secs: args.probe_timeout,
        }
    }

    /// Config file (if any) overridden by flags
    pub fn resolve(args: &Args) -> Result<Self> {
        let base = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        Ok(base.merge(Self::from_args(args)))
    }

    /// Overlay `overrides` on top of `self`
    pub fn merge(self, overrides: Self) -> Self {
        fn list(over: Vec<String>, base: Vec<String>) -> Vec<String> {
            if over.is_empty() {
                base
            } else {
                over
            }
        }

        Self {
            resource: overrides.resource.or(self.resource),
            pending: list(overrides.pending, self.pending),
            target: list(overrides.target, self.target),
            timeout_secs: overrides.timeout_secs.or(self.timeout_secs),
            poll_interval_secs: overrides.poll_interval_secs.or(self.poll_interval_secs),
            min_interval_secs: overrides.min_interval_secs.or(self.min_interval_secs),
            max_interval_secs: overrides.max_interval_secs.or(self.max_interval_secs),
            initial_delay_secs: overrides.initial_delay_secs.or(self.initial_delay_secs),
            continuous_target_occurrences: overrides
                .continuous_target_occurrences
                .or(self.continuous_target_occurrences),
            not_found_checks: overrides.not_found_checks.or(self.not_found_checks),
            not_found_is_terminal: overrides.not_found_is_terminal || self.not_found_is_terminal,
            not_found_exit_code: overrides.not_found_exit_code.or(self.not_found_exit_code),
            probe_timeout_secs: overrides.probe_timeout_secs.or(self.probe_timeout_secs),
        }
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs.unwrap_or(DEFAULT_PROBE_TIMEOUT_SECS))
    }

    /// Build the library configuration, keeping library defaults for
    /// anything left unset
    pub fn poll_config(&self) -> Result<PollConfig> {
        if self.not_found_is_terminal && !self.target.is_empty() {
            bail!(
                "--gone (not_found_is_terminal) waits for absence and cannot be combined \
                 with target states: {}",
                self.target.join(", ")
            );
        }

        let mut builder = PollConfig::builder()
            .pending(self.pending.iter().cloned())
            .target(self.target.iter().cloned())
            .not_found_is_terminal(self.not_found_is_terminal);

        if let Some(name) = &self.resource {
            builder = builder.resource(name.clone());
        }
        if let Some(secs) = self.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = self.poll_interval_secs {
            builder = builder.poll_interval(Duration::from_secs(secs));
        }
        if let Some(secs) = self.min_interval_secs {
            builder = builder.min_interval(Duration::from_secs(secs));
        }
        if let Some(secs) = self.max_interval_secs {
            builder = builder.max_interval(Duration::from_secs(secs));
        }
        if let Some(secs) = self.initial_delay_secs {
            builder = builder.initial_delay(Duration::from_secs(secs));
        }
        if let Some(n) = self.continuous_target_occurrences {
            builder = builder.continuous_target_occurrences(n);
        }
        if let Some(n) = self.not_found_checks {
            builder = builder.not_found_checks(n);
        }

        Ok(builder.build()?)
    }
}
