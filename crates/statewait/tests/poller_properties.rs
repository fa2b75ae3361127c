//! Behavioral tests for the poll loop
//!
//! Most tests drive the poller with a `ManualClock`, so every sleep is
//! recorded and no real time passes.

use statewait::{
    wait_for_state, CancellationToken, PollConfig, PollError, PollOutcome, Poller, ProbeResult,
    WaitError,
};
use statewait_test_utils::{ManualClock, ScriptedProbe, Step};
use std::time::Duration;

fn create_config(occurrences: u32) -> PollConfig {
    PollConfig::builder()
        .resource("gateway gw-1")
        .pending(["CREATING"])
        .target(["AVAILABLE"])
        .poll_interval(Duration::from_secs(1))
        .timeout(Duration::from_secs(600))
        .continuous_target_occurrences(occurrences)
        .build()
        .unwrap()
}

fn delete_config(occurrences: u32) -> PollConfig {
    PollConfig::builder()
        .resource("gateway gw-1")
        .pending(["DELETING"])
        .until_gone()
        .poll_interval(Duration::from_secs(1))
        .timeout(Duration::from_secs(600))
        .continuous_target_occurrences(occurrences)
        .build()
        .unwrap()
}

fn pending_only(timeout: Duration, interval: Duration) -> PollConfig {
    PollConfig::builder()
        .pending(["CREATING"])
        .target(["AVAILABLE"])
        .poll_interval(interval)
        .timeout(timeout)
        .build()
        .unwrap()
}

mod convergence {
    use super::*;

    #[tokio::test]
    async fn test_pending_then_target_takes_n_plus_occurrences_probes() {
        let clock = ManualClock::new();
        let mut probe =
            ScriptedProbe::states(["CREATING", "CREATING", "CREATING", "CREATING", "AVAILABLE"]);

        let outcome = Poller::with_clock(clock.clone())
            .poll(&create_config(3), || probe.next())
            .await;

        assert!(matches!(outcome, PollOutcome::Success(Some(7))));
        assert_eq!(probe.calls(), 7);
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(1); 6]);
    }

    #[tokio::test]
    async fn test_creating_creating_available() {
        let mut probe = ScriptedProbe::states(["CREATING", "CREATING", "AVAILABLE"]);

        let outcome = Poller::with_clock(ManualClock::new())
            .poll(&create_config(1), || probe.next())
            .await;

        // Payload comes from the third call
        assert!(matches!(outcome, PollOutcome::Success(Some(3))));
        assert_eq!(probe.calls(), 3);
    }

    #[tokio::test]
    async fn test_counter_resets_on_pending() {
        let mut probe = ScriptedProbe::states([
            "AVAILABLE",
            "AVAILABLE",
            "CREATING",
            "AVAILABLE",
            "AVAILABLE",
            "AVAILABLE",
        ]);

        let outcome = Poller::with_clock(ManualClock::new())
            .poll(&create_config(3), || probe.next())
            .await;

        assert!(matches!(outcome, PollOutcome::Success(Some(6))));
        assert_eq!(probe.calls(), 6);
    }

    #[tokio::test]
    async fn test_flapping_never_succeeds_until_consecutive() {
        let mut probe = ScriptedProbe::states([
            "AVAILABLE",
            "CREATING",
            "AVAILABLE",
            "CREATING",
            "AVAILABLE",
            "AVAILABLE",
        ]);

        let outcome = Poller::with_clock(ManualClock::new())
            .poll(&create_config(2), || probe.next())
            .await;

        assert!(matches!(outcome, PollOutcome::Success(Some(6))));
    }
}

mod fail_fast {
    use super::*;

    #[tokio::test]
    async fn test_unexpected_state_on_first_probe() {
        let clock = ManualClock::new();
        let mut probe = ScriptedProbe::states(["FAILED"]);

        let outcome = Poller::with_clock(clock.clone())
            .poll(&create_config(1), || probe.next())
            .await;

        match outcome {
            PollOutcome::Failed(PollError::UnexpectedState {
                state, expected, ..
            }) => {
                assert_eq!(state, "FAILED");
                assert_eq!(expected, vec!["AVAILABLE".to_string()]);
            }
            other => panic!("expected unexpected-state failure, got {other:?}"),
        }
        assert_eq!(probe.calls(), 1);
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_deleted_while_creating() {
        let mut probe = ScriptedProbe::states(["CREATING", "DELETED"]);

        let outcome = Poller::with_clock(ManualClock::new())
            .poll(&create_config(1), || probe.next())
            .await;

        assert!(matches!(
            outcome,
            PollOutcome::Failed(PollError::UnexpectedState { ref state, .. }) if state == "DELETED"
        ));
        assert_eq!(outcome.last_state(), Some("DELETED"));
        assert_eq!(probe.calls(), 2);
    }

    #[tokio::test]
    async fn test_empty_pending_set_is_immediately_terminal() {
        let config = PollConfig::builder()
            .target(["AVAILABLE"])
            .poll_interval(Duration::from_secs(1))
            .build()
            .unwrap();
        let mut probe = ScriptedProbe::states(["CREATING", "AVAILABLE"]);

        let outcome = Poller::with_clock(ManualClock::new())
            .poll(&config, || probe.next())
            .await;

        assert!(outcome.is_failed());
        assert_eq!(probe.calls(), 1);
    }

    #[tokio::test]
    async fn test_probe_error_aborts() {
        let mut probe = ScriptedProbe::new(vec![
            Step::state("CREATING"),
            Step::Error("throttled".to_string()),
            Step::state("AVAILABLE"),
        ]);

        let outcome = Poller::with_clock(ManualClock::new())
            .poll(&create_config(1), || probe.next())
            .await;

        match outcome {
            PollOutcome::Failed(e @ PollError::Probe { .. }) => {
                assert!(e.to_string().contains("throttled"));
            }
            other => panic!("expected probe failure, got {other:?}"),
        }
        assert_eq!(probe.calls(), 2);
    }
}

mod timeout {
    use super::*;

    #[tokio::test]
    async fn test_times_out_at_budget_and_not_before() {
        let clock = ManualClock::new();
        let mut probe = ScriptedProbe::states(["CREATING"]);

        let outcome = Poller::with_clock(clock.clone())
            .poll(
                &pending_only(Duration::from_secs(5), Duration::from_secs(1)),
                || probe.next(),
            )
            .await;

        match outcome {
            PollOutcome::TimedOut {
                last_state,
                attempts,
                elapsed,
            } => {
                assert_eq!(last_state.as_deref(), Some("CREATING"));
                assert_eq!(attempts, 6);
                assert_eq!(elapsed, Duration::from_secs(5));
            }
            other => panic!("expected timeout, got {other:?}"),
        }
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(1); 5]);
    }

    #[tokio::test]
    async fn test_final_sleep_is_clipped() {
        let clock = ManualClock::new();
        let mut probe = ScriptedProbe::states(["CREATING"]);

        let outcome = Poller::with_clock(clock.clone())
            .poll(
                &pending_only(Duration::from_millis(5500), Duration::from_secs(2)),
                || probe.next(),
            )
            .await;

        assert!(outcome.is_timed_out());
        assert_eq!(
            clock.sleeps(),
            vec![
                Duration::from_secs(2),
                Duration::from_secs(2),
                Duration::from_millis(1500),
            ]
        );
        assert_eq!(probe.calls(), 4);
        assert_eq!(clock.elapsed(), Duration::from_millis(5500));
    }

    #[tokio::test]
    async fn test_exponential_schedule_never_passes_deadline() {
        let clock = ManualClock::new();
        let config = PollConfig::builder()
            .pending(["CREATING"])
            .target(["AVAILABLE"])
            .timeout(Duration::from_secs(1))
            .build()
            .unwrap();
        let mut probe = ScriptedProbe::states(["CREATING"]);

        let outcome = Poller::with_clock(clock.clone())
            .poll(&config, || probe.next())
            .await;

        assert!(outcome.is_timed_out());
        let sleeps = clock.sleeps();
        assert_eq!(sleeps.len(), 4);
        assert!(sleeps[3] < Duration::from_millis(400));
        assert_eq!(clock.elapsed(), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_clock_starts_before_first_probe() {
        let clock = ManualClock::new();
        let mut probe = ScriptedProbe::states(["CREATING"])
            .with_latency(clock.clone(), Duration::from_secs(2));

        let outcome = Poller::with_clock(clock.clone())
            .poll(
                &pending_only(Duration::from_secs(5), Duration::from_secs(1)),
                || probe.next(),
            )
            .await;

        // probe (2s) + sleep (1s) + probe (2s) reaches the 5s budget
        assert!(outcome.is_timed_out());
        assert_eq!(probe.calls(), 2);
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(1)]);
    }

    #[tokio::test]
    async fn test_initial_delay_counts_against_timeout() {
        let clock = ManualClock::new();
        let config = PollConfig::builder()
            .pending(["CREATING"])
            .target(["AVAILABLE"])
            .initial_delay(Duration::from_secs(20))
            .poll_interval(Duration::from_secs(1))
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap();
        let mut probe = ScriptedProbe::states(["CREATING"]);

        let outcome = Poller::with_clock(clock.clone())
            .poll(&config, || probe.next())
            .await;

        assert!(outcome.is_timed_out());
        assert_eq!(probe.calls(), 1);
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(10)]);
    }

    #[tokio::test]
    async fn test_initial_delay_precedes_first_probe() {
        let clock = ManualClock::new();
        let config = PollConfig::builder()
            .pending(["CREATING"])
            .target(["AVAILABLE"])
            .initial_delay(Duration::from_secs(3))
            .poll_interval(Duration::from_secs(1))
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap();
        let mut probe = ScriptedProbe::states(["AVAILABLE"]);

        let outcome = Poller::with_clock(clock.clone())
            .poll(&config, || probe.next())
            .await;

        assert!(outcome.is_success());
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(3)]);
    }
}

mod not_found {
    use super::*;

    #[tokio::test]
    async fn test_absence_is_success_for_delete() {
        let mut probe = ScriptedProbe::new(vec![
            Step::state("DELETING"),
            Step::Absent,
            Step::NotFoundError,
        ]);

        let outcome = Poller::with_clock(ManualClock::new())
            .poll(&delete_config(2), || probe.next())
            .await;

        assert!(matches!(outcome, PollOutcome::Success(None)));
        assert_eq!(probe.calls(), 3);
    }

    #[tokio::test]
    async fn test_reappearance_resets_absence_counter() {
        let mut probe = ScriptedProbe::new(vec![
            Step::Absent,
            Step::state("DELETING"),
            Step::Absent,
            Step::Absent,
        ]);

        let outcome = Poller::with_clock(ManualClock::new())
            .poll(&delete_config(2), || probe.next())
            .await;

        assert!(matches!(outcome, PollOutcome::Success(None)));
        assert_eq!(probe.calls(), 4);
    }

    #[tokio::test]
    async fn test_unexpected_state_during_delete() {
        let mut probe = ScriptedProbe::states(["DELETING", "DELETE_FAILED"]);

        let outcome = Poller::with_clock(ManualClock::new())
            .poll(&delete_config(1), || probe.next())
            .await;

        assert!(outcome.is_failed());
        assert_eq!(outcome.last_state(), Some("DELETE_FAILED"));
    }

    #[tokio::test]
    async fn test_absence_tolerated_up_to_budget() {
        let config = PollConfig::builder()
            .pending(["CREATING"])
            .target(["AVAILABLE"])
            .poll_interval(Duration::from_secs(1))
            .not_found_checks(2)
            .build()
            .unwrap();
        let mut probe = ScriptedProbe::new(vec![Step::Absent]);

        let outcome = Poller::with_clock(ManualClock::new())
            .poll(&config, || probe.next())
            .await;

        assert!(matches!(
            outcome,
            PollOutcome::Failed(PollError::NotFound { checks: 3, .. })
        ));
        assert_eq!(probe.calls(), 3);
    }

    #[tokio::test]
    async fn test_absence_budget_resets_when_found() {
        let config = PollConfig::builder()
            .pending(["CREATING"])
            .target(["AVAILABLE"])
            .poll_interval(Duration::from_secs(1))
            .not_found_checks(2)
            .build()
            .unwrap();
        let mut probe = ScriptedProbe::new(vec![
            Step::Absent,
            Step::Absent,
            Step::state("CREATING"),
            Step::Absent,
            Step::Absent,
            Step::state("AVAILABLE"),
        ]);

        let outcome = Poller::with_clock(ManualClock::new())
            .poll(&config, || probe.next())
            .await;

        assert!(matches!(outcome, PollOutcome::Success(Some(6))));
    }

    #[tokio::test]
    async fn test_zero_not_found_checks_fails_on_first_absence() {
        let config = PollConfig::builder()
            .pending(["CREATING"])
            .target(["AVAILABLE"])
            .not_found_checks(0)
            .build()
            .unwrap();
        let mut probe = ScriptedProbe::new(vec![Step::Absent]);

        let outcome = Poller::with_clock(ManualClock::new())
            .poll(&config, || probe.next())
            .await;

        assert!(matches!(
            outcome,
            PollOutcome::Failed(PollError::NotFound { checks: 1, .. })
        ));
    }

    #[tokio::test]
    async fn test_not_found_error_aborts_create_wait() {
        let config = PollConfig::builder()
            .pending(["CREATING"])
            .target(["AVAILABLE"])
            .poll_interval(Duration::from_secs(1))
            .build()
            .unwrap();
        let mut probe = ScriptedProbe::new(vec![Step::NotFoundError, Step::state("AVAILABLE")]);

        let outcome = Poller::with_clock(ManualClock::new())
            .poll(&config, || probe.next())
            .await;

        assert!(matches!(
            outcome,
            PollOutcome::Failed(PollError::Probe { .. })
        ));
        assert_eq!(probe.calls(), 1);
    }

    #[tokio::test]
    async fn test_not_found_error_aborts_when_absence_not_terminal() {
        let config = PollConfig::builder()
            .pending(["DELETING"])
            .poll_interval(Duration::from_secs(1))
            .build()
            .unwrap();
        let mut probe = ScriptedProbe::new(vec![Step::NotFoundError]);

        let outcome = Poller::with_clock(ManualClock::new())
            .poll(&config, || probe.next())
            .await;

        match outcome {
            PollOutcome::Failed(e) => {
                assert!(e.is_probe_error());
                assert!(e.to_string().contains("not found: call 1"));
            }
            other => panic!("expected probe failure, got {other:?}"),
        }
        assert_eq!(probe.calls(), 1);
    }
}

mod cancellation {
    use super::*;

    #[tokio::test]
    async fn test_cancel_between_probes() {
        let clock = ManualClock::new();
        let token = CancellationToken::new();
        let mut probe = ScriptedProbe::states(["CREATING"]);

        let outcome = Poller::with_clock(clock.clone())
            .with_cancellation(token.clone())
            .poll(&create_config(1), || {
                if probe.calls() == 1 {
                    token.cancel();
                }
                probe.next()
            })
            .await;

        match outcome {
            PollOutcome::Cancelled {
                last_state,
                attempts,
            } => {
                assert_eq!(last_state.as_deref(), Some("CREATING"));
                assert_eq!(attempts, 2);
            }
            other => panic!("expected cancellation, got {other:?}"),
        }
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(1)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_while_sleeping() {
        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(2500)).await;
            canceller.cancel();
        });

        let start = tokio::time::Instant::now();
        let outcome: PollOutcome<()> = Poller::new()
            .with_cancellation(token)
            .poll(&create_config(1), || async {
                Ok(ProbeResult::found("CREATING", ()))
            })
            .await;

        assert!(outcome.is_cancelled());
        assert_eq!(outcome.last_state(), Some("CREATING"));
        assert!(start.elapsed() < Duration::from_secs(4));
    }
}

mod runtime {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_polls_are_independent() {
        let poller = Poller::new();
        let fast = pending_only(Duration::from_secs(60), Duration::from_secs(1));
        let slow = pending_only(Duration::from_secs(3), Duration::from_secs(1));

        let mut ready_probe = ScriptedProbe::states(["CREATING", "AVAILABLE"]);
        let mut stuck_probe = ScriptedProbe::states(["CREATING"]);

        let (ready, stuck) = tokio::join!(
            poller.poll(&fast, || ready_probe.next()),
            poller.poll(&slow, || stuck_probe.next()),
        );

        assert!(matches!(ready, PollOutcome::Success(Some(2))));
        assert!(stuck.is_timed_out());
    }

    #[test]
    fn test_blocking_poll() {
        let config = pending_only(Duration::from_secs(5), Duration::from_millis(1));
        let mut probe = ScriptedProbe::states(["CREATING", "CREATING", "AVAILABLE"]);

        let outcome = statewait::poll_blocking(&config, || probe.next_blocking());

        assert!(matches!(outcome, PollOutcome::Success(Some(3))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_state_timeout_message() {
        let config = PollConfig::builder()
            .resource("volume vol-9")
            .pending(["CREATING"])
            .target(["AVAILABLE"])
            .poll_interval(Duration::from_secs(1))
            .timeout(Duration::from_secs(3))
            .build()
            .unwrap();

        let err = wait_for_state(&config, None, || async {
            Ok(ProbeResult::found("CREATING", ()))
        })
        .await
        .unwrap_err();

        assert!(matches!(err, WaitError::Timeout { .. }));
        assert_eq!(
            err.to_string(),
            "volume vol-9 did not complete within 3s (last state: CREATING)"
        );
    }
}
