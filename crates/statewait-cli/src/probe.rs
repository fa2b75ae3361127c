//! Shell command as a status probe

use crate::config::WaitSettings;
use anyhow::{anyhow, Context, Result};
use statewait::{ProbeError, ProbeResult};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Runs one command per probe.
///
/// - exit 0: found, state is the last non-empty stdout line, payload is
///   the full stdout
/// - exit == `not_found_exit_code`: not found
/// - anything else: probe error carrying stderr
#[derive(Debug, Clone)]
pub struct CommandProbe {
    program: String,
    args: Vec<String>,
    not_found_exit_code: Option<i32>,
    timeout: Duration,
}

impl CommandProbe {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            not_found_exit_code: None,
            timeout,
        }
    }

    pub fn with_not_found_exit_code(mut self, code: Option<i32>) -> Self {
        self.not_found_exit_code = code;
        self
    }

    /// Build from the trailing command-line words and resolved settings
    pub fn from_settings(command: &[String], settings: &WaitSettings) -> Result<Self> {
        let (program, args) = command
            .split_first()
            .context("No probe command given")?;

        Ok(Self::new(program.clone(), args.to_vec(), settings.probe_timeout())
            .with_not_found_exit_code(settings.not_found_exit_code))
    }

    /// Command line for logs
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run the command once
    pub async fn probe(&self) -> Result<ProbeResult<String>, ProbeError> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, command.output()).await {
            Ok(result) => result
                .with_context(|| format!("Failed to run probe command: {}", self.program))?,
            Err(_) => {
                return Err(anyhow!(
                    "Probe command '{}' timed out after {}s",
                    self.program,
                    self.timeout.as_secs()
                )
                .into());
            }
        };

        let code = output.status.code();
        if code.is_some() && code == self.not_found_exit_code {
            debug!(command = %self.display(), code = ?code, "Probe reported not found");
            return Ok(ProbeResult::not_found());
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "Probe command '{}' exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )
            .into());
        }

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let state = parse_state(&stdout)
            .ok_or_else(|| anyhow!("Probe command '{}' printed no state", self.program))?;

        debug!(command = %self.display(), state = %state, "Probe observed state");
        Ok(ProbeResult::found(state, stdout))
    }
}

/// Last non-empty, trimmed line of `stdout`
pub fn parse_state(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(ToString::to_string)
}
