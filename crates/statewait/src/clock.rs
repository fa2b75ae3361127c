//! Time source for the poller
//!
//! The poller never calls `tokio::time` directly, so tests can substitute a
//! clock that advances instantly and records every sleep.

use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Source of the current instant and of delays
pub trait Clock: Send + Sync {
    /// Current instant
    fn now(&self) -> Instant;

    /// Wait for `duration`
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Clock backed by the tokio timer (honours `start_paused` in tests)
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}
