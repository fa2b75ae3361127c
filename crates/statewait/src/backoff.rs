//! Delay schedule between probes
//!
//! Fixed or exponential, built on `backon`. Every delay is floored at the
//! configured minimum interval. Jitter is off unless asked for, which keeps
//! the schedule deterministic.

use backon::{
    BackoffBuilder, ConstantBackoff, ConstantBuilder, ExponentialBackoff, ExponentialBuilder,
};
use std::time::Duration;

use crate::defaults::DEFAULT_BACKOFF_FACTOR;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Schedule {
    Fixed(Duration),
    Exponential { initial: Duration, max: Duration },
}

/// Delay policy between consecutive probes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Backoff {
    schedule: Schedule,
    floor: Duration,
    jitter: bool,
}

impl Backoff {
    /// Same delay every time
    pub fn fixed(interval: Duration) -> Self {
        Self {
            schedule: Schedule::Fixed(interval),
            floor: Duration::ZERO,
            jitter: false,
        }
    }

    /// Start at `initial`, double each time, never above `max`
    pub fn exponential(initial: Duration, max: Duration) -> Self {
        Self {
            schedule: Schedule::Exponential {
                initial: initial.min(max),
                max,
            },
            floor: Duration::ZERO,
            jitter: false,
        }
    }

    /// Never return a delay shorter than `floor`
    pub fn with_floor(mut self, floor: Duration) -> Self {
        self.floor = floor;
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Upper bound of the schedule before jitter and floor
    fn ceiling(&self) -> Duration {
        match self.schedule {
            Schedule::Fixed(d) => d,
            Schedule::Exponential { max, .. } => max,
        }
    }

    /// Endless iterator of delays
    pub fn delays(&self) -> Delays {
        let inner = match self.schedule {
            Schedule::Fixed(interval) => {
                let mut builder = ConstantBuilder::default()
                    .with_delay(interval)
                    .without_max_times();
                if self.jitter {
                    builder = builder.with_jitter();
                }
                Inner::Constant(builder.build())
            }
            Schedule::Exponential { initial, max } => {
                let mut builder = ExponentialBuilder::default()
                    .with_min_delay(initial)
                    .with_max_delay(max)
                    .with_factor(DEFAULT_BACKOFF_FACTOR)
                    .without_max_times();
                if self.jitter {
                    builder = builder.with_jitter();
                }
                Inner::Exponential(builder.build())
            }
        };

        Delays {
            inner,
            floor: self.floor,
            fallback: self.ceiling(),
        }
    }
}

enum Inner {
    Constant(ConstantBackoff),
    Exponential(ExponentialBackoff),
}

/// Iterator over the delays of a [`Backoff`]
pub struct Delays {
    inner: Inner,
    floor: Duration,
    fallback: Duration,
}

impl Iterator for Delays {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let next = match &mut self.inner {
            Inner::Constant(b) => b.next(),
            Inner::Exponential(b) => b.next(),
        };
        Some(next.unwrap_or(self.fallback).max(self.floor))
    }
}
