//! statewait - wait for asynchronous remote operations to settle
//!
//! One reusable primitive for the "poll until the status matches, with a
//! timeout and backoff" pattern: a caller-supplied probe is invoked until
//! the observed state reaches a target, enters a dead-end state, or the
//! timeout elapses.
//!
//! ## Modules
//!
//! - [`backoff`]: fixed and exponential delay schedules
//! - [`clock`]: injectable time source
//! - [`config`]: validated per-run configuration
//! - [`defaults`]: default timeouts and intervals
//! - [`error`]: configuration, probe, poll, and wait errors
//! - [`outcome`]: tri-state result of a poll run (plus cancellation)
//! - [`probe`]: single-probe observations
//! - [`wait`]: the poll loop
//!
//! ## Example
//!
//! ```no_run
//! use statewait::{poll, PollConfig, PollOutcome, ProbeResult};
//! use std::time::Duration;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = PollConfig::builder()
//!     .resource("volume vol-123")
//!     .pending(["CREATING"])
//!     .target(["AVAILABLE"])
//!     .timeout(Duration::from_secs(300))
//!     .poll_interval(Duration::from_secs(5))
//!     .build()?;
//!
//! match poll(&config, || async { Ok(ProbeResult::found("AVAILABLE", ())) }).await {
//!     PollOutcome::Success(_) => println!("ready"),
//!     other => println!("not ready: {:?}", other.last_state()),
//! }
//! # Ok(())
//! # }
//! ```

pub mod backoff;
pub mod clock;
pub mod config;
pub mod defaults;
pub mod error;
pub mod outcome;
pub mod probe;
pub mod wait;

// Re-export commonly used types
pub use backoff::Backoff;
pub use clock::{Clock, TokioClock};
pub use config::{PollConfig, PollConfigBuilder};
pub use error::{ConfigError, PollError, ProbeError, WaitError};
pub use outcome::PollOutcome;
pub use probe::ProbeResult;
pub use wait::{poll, poll_blocking, wait_for_state, Poller};

pub use tokio_util::sync::CancellationToken;
