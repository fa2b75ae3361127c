//! statewait-cli - wait on a shell command's reported state
//!
//! The command is the probe: its last non-empty stdout line is the state,
//! a configured exit code means "not found", and any other failure aborts
//! the wait.
//!
//! ## Modules
//!
//! - [`cli`]: command-line arguments
//! - [`config`]: JSON settings file and flag overrides
//! - [`probe`]: running the command as a probe
//! - [`report`]: outcome summary and exit codes

pub mod cli;
pub mod config;
pub mod probe;
pub mod report;

use anyhow::{Context, Result};
use statewait::{CancellationToken, Poller};
use tracing::info;

pub use cli::Args;
pub use config::WaitSettings;
pub use probe::CommandProbe;
pub use report::{OutcomeKind, Report};

/// Load settings, run the wait, and summarise the outcome
pub async fn run(args: &Args, cancel: CancellationToken) -> Result<Report> {
    let settings = WaitSettings::resolve(args)?;
    let config = settings
        .poll_config()
        .context("Invalid wait configuration")?;
    let probe = CommandProbe::from_settings(&args.command, &settings)?;

    info!(
        resource = %config.resource(),
        command = %probe.display(),
        pending = ?config.pending_states(),
        target = ?config.target_states(),
        timeout_secs = config.timeout().as_secs(),
        "Starting wait"
    );

    let outcome = Poller::new()
        .with_cancellation(cancel)
        .poll(&config, || probe.probe())
        .await;

    Ok(Report::from_outcome(&config, outcome))
}
