/*!
 * Timeout Engine Tests
 * Façade behavior: strategy-independent contracts, overrides, propagation
 */

use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};
use serial_test::serial;
use std::thread;
use std::time::{Duration, Instant};
use timebound::{
    engine, ExecutionRequest, StrategyPreference, Timebound, TimeoutError, TimeoutKind,
    TimeoutSpec,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn sleep_then_echo(ms: u64) -> Result<u64, String> {
    thread::sleep(Duration::from_millis(ms));
    Ok(ms)
}

fn fail_fast(_: u64) -> Result<u64, String> {
    Err("worker blew up".to_string())
}

fn touch(path: String) -> Result<(), String> {
    std::fs::write(&path, b"ran").map_err(|e| e.to_string())
}

#[test]
#[serial]
fn test_fast_workload_returns_value_unchanged() {
    init_logging();
    let spec = TimeoutSpec::after(Duration::from_secs(2));
    let result = engine::run(
        ExecutionRequest::new("echo", sleep_then_echo, 50u64),
        &spec,
        StrategyPreference::IsolatedWorker,
    );
    assert_eq!(result.unwrap(), 50);
}

#[test]
#[serial]
fn test_slow_workload_raises_default_kind_with_generated_message() {
    init_logging();
    let spec = TimeoutSpec::after(Duration::from_secs(1));
    let started = Instant::now();
    let result = engine::run(
        ExecutionRequest::new("f", sleep_then_echo, 2_000u64),
        &spec,
        StrategyPreference::IsolatedWorker,
    );
    let elapsed = started.elapsed();

    match result {
        Err(TimeoutError::Expired { kind, message }) => {
            assert_eq!(kind, TimeoutKind::Exceeded);
            assert_eq!(message, "Function f timed out after 1 seconds");
        }
        other => panic!("expected expiry, got {other:?}"),
    }
    assert!(elapsed >= Duration::from_millis(950), "returned too early: {elapsed:?}");
    assert!(elapsed < Duration::from_millis(1800), "returned too late: {elapsed:?}");
}

#[test]
#[serial]
fn test_per_call_override_beats_configured_duration() {
    init_logging();
    let bounded = Timebound::wrap("sleepy", sleep_then_echo).with_duration(Duration::from_secs(3));

    let started = Instant::now();
    let result: Result<u64, TimeoutError<String>> =
        bounded.call_with_deadline(1_000u64, Duration::from_millis(300));
    let elapsed = started.elapsed();

    match result {
        Err(TimeoutError::Expired { message, .. }) => {
            assert_eq!(message, "Function sleepy timed out after 0.3 seconds");
        }
        other => panic!("expected expiry, got {other:?}"),
    }
    // Raised on the override's schedule, not the configured 3s one.
    assert!(elapsed < Duration::from_millis(900), "override ignored: {elapsed:?}");
}

#[test]
#[serial]
fn test_override_enforces_even_when_default_is_absent() {
    init_logging();
    let bounded = Timebound::wrap("sleepy", sleep_then_echo);

    let unbounded: Result<u64, TimeoutError<String>> = bounded.call(100u64);
    assert_eq!(unbounded.unwrap(), 100);

    let result: Result<u64, TimeoutError<String>> =
        bounded.call_with_deadline(1_000u64, Duration::from_millis(200));
    assert!(result.unwrap_err().is_expired());
}

#[test]
#[serial]
fn test_absent_duration_never_times_out() {
    init_logging();
    let bounded = Timebound::wrap("nap", sleep_then_echo);
    let result: Result<u64, TimeoutError<String>> = bounded.call(150u64);
    assert_eq!(result.unwrap(), 150);
}

#[test]
#[serial]
fn test_custom_kind_is_raised_on_expiry() {
    init_logging();
    let spec = TimeoutSpec::after(Duration::from_millis(200))
        .with_kind(TimeoutKind::custom("stop_iteration"));
    let result = engine::run(
        ExecutionRequest::new("sleepy", sleep_then_echo, 1_000u64),
        &spec,
        StrategyPreference::IsolatedWorker,
    );
    match result {
        Err(TimeoutError::Expired { kind, .. }) => {
            assert_eq!(kind, TimeoutKind::custom("stop_iteration"));
        }
        other => panic!("expected expiry, got {other:?}"),
    }
}

#[test]
#[serial]
fn test_custom_message_on_expiry_only() {
    init_logging();
    let bounded = Timebound::wrap("sleepy", sleep_then_echo)
        .with_duration(Duration::from_millis(200))
        .with_message("Custom fail message");
    let result: Result<u64, TimeoutError<String>> = bounded.call(1_000u64);
    match result {
        Err(TimeoutError::Expired { message, .. }) => assert_eq!(message, "Custom fail message"),
        other => panic!("expected expiry, got {other:?}"),
    }

    // The custom message never leaks into caller-error propagation.
    let failing = Timebound::wrap("failing", fail_fast)
        .with_duration(Duration::from_secs(1))
        .with_message("Custom fail message");
    let result: Result<u64, TimeoutError<String>> = failing.call(0u64);
    assert_eq!(
        result.unwrap_err().into_caller_error(),
        Some("worker blew up".to_string())
    );
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
enum WorkError {
    Code(i32),
    Text(String),
}

#[test]
#[serial]
fn test_caller_error_keeps_type_and_payload() {
    init_logging();
    fn typed_failure(code: i32) -> Result<(), WorkError> {
        Err(WorkError::Code(code))
    }

    let spec = TimeoutSpec::after(Duration::from_secs(2));
    let result = engine::run(
        ExecutionRequest::new("typed_failure", typed_failure, 42),
        &spec,
        StrategyPreference::IsolatedWorker,
    );
    assert_eq!(
        result.unwrap_err().into_caller_error(),
        Some(WorkError::Code(42))
    );
}

#[test]
#[serial]
fn test_zero_duration_means_already_expired() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("ran");
    let marker_path = marker.to_string_lossy().into_owned();

    let spec = TimeoutSpec::after_secs(0.0).unwrap();
    let started = Instant::now();
    let result: Result<(), TimeoutError<String>> = engine::run(
        ExecutionRequest::new("touch", touch, marker_path),
        &spec,
        StrategyPreference::IsolatedWorker,
    );

    assert!(result.unwrap_err().is_expired());
    assert!(started.elapsed() < Duration::from_millis(50));
    assert!(!marker.exists(), "work ran despite an expired-by-policy spec");
}

#[test]
#[serial]
fn test_negative_duration_behaves_like_zero() {
    init_logging();
    let spec = TimeoutSpec::after_secs(-2.5).unwrap();
    let result = engine::run(
        ExecutionRequest::new("echo", sleep_then_echo, 10u64),
        &spec,
        StrategyPreference::IsolatedWorker,
    );
    assert!(result.unwrap_err().is_expired());
}

#[test]
#[serial]
fn test_alarm_preference_off_primary_thread_still_enforces() {
    init_logging();
    // The selector must fall back to the isolated worker and still preempt.
    let handle = thread::spawn(|| {
        let bounded = Timebound::wrap("sleepy", sleep_then_echo)
            .with_duration(Duration::from_millis(300))
            .use_isolated_worker(false);
        let started = Instant::now();
        let result: Result<u64, TimeoutError<String>> = bounded.call(3_000u64);
        (result, started.elapsed())
    });

    let (result, elapsed) = handle.join().unwrap();
    assert!(result.unwrap_err().is_expired());
    assert!(elapsed < Duration::from_millis(1500), "no real preemption: {elapsed:?}");
}
