//! Waiting for remote operations to settle, with backoff and cancellation.
//!
//! Repeatedly runs a caller-supplied probe until the observed state reaches
//! a target (for the configured number of consecutive probes), enters a
//! state that is neither pending nor target, or the timeout elapses.

use crate::clock::{Clock, TokioClock};
use crate::config::PollConfig;
use crate::error::{PollError, ProbeError, WaitError};
use crate::outcome::PollOutcome;
use crate::probe::{normalize, ProbeResult};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Runs poll loops against an injectable clock and an optional
/// cancellation token.
///
/// Holds no per-run state; one `Poller` can drive any number of
/// concurrent waits.
#[derive(Debug, Clone)]
pub struct Poller<C = TokioClock> {
    clock: C,
    cancel: Option<CancellationToken>,
}

impl Poller<TokioClock> {
    /// Poller on the tokio timer with no cancellation
    pub fn new() -> Self {
        Self::with_clock(TokioClock)
    }
}

impl Default for Poller<TokioClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> Poller<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            cancel: None,
        }
    }

    /// Stop waiting with [`PollOutcome::Cancelled`] once `token` fires
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|t| t.is_cancelled())
    }

    async fn cancelled(&self) {
        match &self.cancel {
            Some(token) => token.cancelled().await,
            None => std::future::pending::<()>().await,
        }
    }

    /// Sleep unless cancelled first. Returns `true` when cancelled.
    async fn sleep_or_cancel(&self, delay: Duration) -> bool {
        tokio::select! {
            biased;
            _ = self.cancelled() => true,
            _ = self.clock.sleep(delay) => false,
        }
    }

    /// Poll until the probe settles.
    ///
    /// # Arguments
    /// * `config` - States, timeout, and backoff for this run
    /// * `probe` - Performs one status check per call
    ///
    /// # Returns
    /// * `Success(payload)` after `continuous_target_occurrences`
    ///   consecutive target observations (payload is `None` when absence
    ///   was the target)
    /// * `Failed` on a state that is neither pending nor target, on any
    ///   probe error (a not-found error only counts as absence when absence
    ///   is the target), or after more than `not_found_checks` consecutive
    ///   `ProbeResult::NotFound` observations
    /// * `TimedOut` once the elapsed time reaches the timeout
    /// * `Cancelled` when the token fires
    ///
    /// # Example
    /// ```ignore
    /// let outcome = Poller::new()
    ///     .poll(&config, || async {
    ///         let gw = client.describe_gateway(&id).await?;
    ///         Ok(ProbeResult::found(gw.status.clone(), gw))
    ///     })
    ///     .await;
    /// ```
    pub async fn poll<T, F, Fut>(&self, config: &PollConfig, mut probe: F) -> PollOutcome<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<ProbeResult<T>, ProbeError>>,
    {
        let start = self.clock.now();
        let resource = config.resource();
        let timeout = config.timeout();
        let required = config.continuous_target_occurrences();

        let mut attempts = 0u32;
        let mut target_hits = 0u32;
        let mut absent_hits = 0u32;
        let mut last_state: Option<String> = None;

        debug!(
            resource = %resource,
            pending = ?config.pending_states(),
            target = ?config.target_states(),
            timeout_secs = timeout.as_secs(),
            "Waiting for state"
        );

        if !config.initial_delay().is_zero()
            && self.sleep_or_cancel(config.initial_delay().min(timeout)).await
        {
            debug!(resource = %resource, "Wait cancelled during initial delay");
            return PollOutcome::Cancelled {
                last_state,
                attempts,
            };
        }

        let mut delays = config.backoff().delays();

        loop {
            if self.is_cancelled() {
                debug!(resource = %resource, attempts, "Wait cancelled");
                return PollOutcome::Cancelled {
                    last_state,
                    attempts,
                };
            }

            attempts += 1;

            let observed = tokio::select! {
                biased;
                _ = self.cancelled() => {
                    debug!(resource = %resource, attempts, "Wait cancelled during probe");
                    return PollOutcome::Cancelled { last_state, attempts };
                }
                result = probe() => normalize(result, config.absence_is_success()),
            };

            let observed = match observed {
                Ok(observed) => observed,
                Err(source) => {
                    warn!(resource = %resource, attempts, error = ?source, "Probe failed");
                    return PollOutcome::Failed(PollError::Probe {
                        resource: resource.to_string(),
                        source,
                    });
                }
            };

            match observed {
                ProbeResult::NotFound if config.absence_is_success() => {
                    target_hits += 1;
                    last_state = None;
                    if target_hits >= required {
                        debug!(resource = %resource, attempts, "Resource gone");
                        return PollOutcome::Success(None);
                    }
                }
                ProbeResult::NotFound => {
                    target_hits = 0;
                    absent_hits += 1;
                    last_state = None;
                    if absent_hits > config.not_found_checks() {
                        warn!(
                            resource = %resource,
                            checks = absent_hits,
                            "Resource not found"
                        );
                        return PollOutcome::Failed(PollError::NotFound {
                            resource: resource.to_string(),
                            checks: absent_hits,
                        });
                    }
                }
                ProbeResult::Found { state, payload } => {
                    absent_hits = 0;
                    if config.is_target(&state) {
                        target_hits += 1;
                        if target_hits >= required {
                            debug!(resource = %resource, state = %state, attempts, "Resource ready");
                            return PollOutcome::Success(Some(payload));
                        }
                    } else if config.is_pending(&state) {
                        target_hits = 0;
                    } else {
                        warn!(resource = %resource, state = %state, "Unexpected state");
                        return PollOutcome::Failed(PollError::UnexpectedState {
                            resource: resource.to_string(),
                            state,
                            expected: config.target_states().iter().cloned().collect(),
                        });
                    }
                    last_state = Some(state);
                }
            }

            let elapsed = self.clock.now().saturating_duration_since(start);
            if elapsed >= timeout {
                warn!(
                    resource = %resource,
                    last_state = ?last_state,
                    attempts,
                    timeout_secs = timeout.as_secs(),
                    "Timed out waiting for state"
                );
                return PollOutcome::TimedOut {
                    last_state,
                    attempts,
                    elapsed,
                };
            }

            // Never sleep past the deadline
            let delay = delays
                .next()
                .unwrap_or(config.max_interval())
                .min(timeout - elapsed);
            debug!(
                resource = %resource,
                attempt = attempts,
                state = ?last_state,
                target_hits,
                delay_ms = delay.as_millis(),
                "Not settled, retrying"
            );

            if self.sleep_or_cancel(delay).await {
                debug!(resource = %resource, attempts, "Wait cancelled");
                return PollOutcome::Cancelled {
                    last_state,
                    attempts,
                };
            }
        }
    }

    /// Blocking variant of [`Poller::poll`] for synchronous probes.
    ///
    /// Drives the loop on a private current-thread runtime, so the calling
    /// thread blocks until the outcome is known. Panics if called from
    /// within an async runtime.
    pub fn poll_blocking<T, F>(&self, config: &PollConfig, mut probe: F) -> PollOutcome<T>
    where
        F: FnMut() -> Result<ProbeResult<T>, ProbeError>,
    {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => return PollOutcome::Failed(PollError::Runtime(e)),
        };

        runtime.block_on(self.poll(config, || std::future::ready(probe())))
    }
}

/// Poll on the tokio timer without cancellation. See [`Poller::poll`].
pub async fn poll<T, F, Fut>(config: &PollConfig, probe: F) -> PollOutcome<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<ProbeResult<T>, ProbeError>>,
{
    Poller::new().poll(config, probe).await
}

/// Blocking poll on the caller's thread. See [`Poller::poll_blocking`].
pub fn poll_blocking<T, F>(config: &PollConfig, probe: F) -> PollOutcome<T>
where
    F: FnMut() -> Result<ProbeResult<T>, ProbeError>,
{
    Poller::new().poll_blocking(config, probe)
}

/// Wait for a state and convert the outcome into a `Result`.
///
/// # Example
/// ```ignore
/// let volume = wait_for_state(&config, Some(&cancel_token), || async {
///     let v = client.describe_volume(&id).await?;
///     Ok(ProbeResult::found(v.status.clone(), v))
/// })
/// .await?;
/// ```
pub async fn wait_for_state<T, F, Fut>(
    config: &PollConfig,
    cancel: Option<&CancellationToken>,
    probe: F,
) -> Result<Option<T>, WaitError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<ProbeResult<T>, ProbeError>>,
{
    let mut poller = Poller::new();
    if let Some(token) = cancel {
        poller = poller.with_cancellation(token.clone());
    }
    poller
        .poll(config, probe)
        .await
        .into_result(config.resource(), config.timeout())
}
