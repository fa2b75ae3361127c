//! Manual clock for deterministic poller tests

use statewait::Clock;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug)]
struct State {
    origin: Instant,
    offset: Duration,
    sleeps: Vec<Duration>,
}

/// Clock whose time only moves when slept on or advanced.
///
/// Clones share the same timeline, so a test can hand one clone to the
/// poller and inspect another afterwards.
///
/// # Example
///
/// ```
/// use statewait_test_utils::ManualClock;
/// use std::time::Duration;
///
/// let clock = ManualClock::new();
/// clock.advance(Duration::from_secs(3));
/// assert_eq!(clock.elapsed(), Duration::from_secs(3));
/// ```
#[derive(Debug, Clone)]
pub struct ManualClock {
    state: Arc<Mutex<State>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                origin: Instant::now(),
                offset: Duration::ZERO,
                sleeps: Vec::new(),
            })),
        }
    }

    /// Move time forward without recording a sleep
    pub fn advance(&self, by: Duration) {
        self.state.lock().unwrap().offset += by;
    }

    /// Time passed since the clock was created
    pub fn elapsed(&self) -> Duration {
        self.state.lock().unwrap().offset
    }

    /// Every sleep the poller performed, in order
    pub fn sleeps(&self) -> Vec<Duration> {
        self.state.lock().unwrap().sleeps.clone()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let state = self.state.lock().unwrap();
        state.origin + state.offset
    }

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        let state = self.state.clone();
        async move {
            let mut state = state.lock().unwrap();
            state.offset += duration;
            state.sleeps.push(duration);
        }
    }
}
