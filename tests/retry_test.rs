use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use tokio::time::Instant;
use vedrfolnir::{Result, RetryConfig, RetryStrategy, VedrfolnirError};

fn server_error() -> VedrfolnirError {
    VedrfolnirError::Api {
        status: 503,
        body: "busy".into(),
    }
}

fn backoff(max_attempts: u32, initial_ms: u64) -> RetryStrategy {
    RetryStrategy::ExponentialBackoff(
        RetryConfig::new()
            .max_attempts(max_attempts)
            .initial_delay(Duration::from_millis(initial_ms)),
    )
}

#[tokio::test]
async fn no_retry_invokes_once_and_wraps_failure() {
    let calls = AtomicU32::new(0);
    let calls = &calls;

    let result: Result<String> = RetryStrategy::NoRetry
        .run(|| async move {
            calls.fetch_add(1, Ordering::Relaxed);
            Err(server_error())
        })
        .await;

    assert_eq!(calls.load(Ordering::Relaxed), 1);
    match result {
        Err(VedrfolnirError::RetryDisabled { source }) => {
            assert!(matches!(*source, VedrfolnirError::Api { status: 503, .. }));
        }
        other => panic!("expected RetryDisabled, got {other:?}"),
    }
}

#[tokio::test]
async fn no_retry_passes_success_through() {
    let result: Result<&str> = RetryStrategy::NoRetry.run(|| async { Ok("payload") }).await;
    assert_eq!(result.unwrap(), "payload");
}

#[tokio::test]
async fn no_retry_wraps_cancellation_too() {
    let result: Result<()> = RetryStrategy::NoRetry
        .run(|| async { Err(VedrfolnirError::Cancelled) })
        .await;
    let err = result.unwrap_err();
    assert!(matches!(err, VedrfolnirError::RetryDisabled { .. }));
    assert!(err.is_cancelled());
}

#[tokio::test(start_paused = true)]
async fn backoff_succeeds_after_two_failures_with_doubling_delay() {
    let attempts: Mutex<Vec<Instant>> = Mutex::new(Vec::new());
    let attempts = &attempts;

    let result: Result<usize> = backoff(3, 100)
        .run(|| async move {
            let mut seen = attempts.lock().unwrap();
            seen.push(Instant::now());
            if seen.len() < 3 {
                Err(server_error())
            } else {
                Ok(seen.len())
            }
        })
        .await;

    assert_eq!(result.unwrap(), 3);
    let seen = attempts.lock().unwrap();
    assert_eq!(seen.len(), 3);
    let first_gap = seen[1] - seen[0];
    let second_gap = seen[2] - seen[1];
    assert!(first_gap >= Duration::from_millis(100), "first gap {first_gap:?}");
    assert!(second_gap >= Duration::from_millis(200), "second gap {second_gap:?}");
    assert!(second_gap > first_gap);
}

#[tokio::test(start_paused = true)]
async fn backoff_cap_bounds_the_first_delay() {
    let strategy = RetryStrategy::ExponentialBackoff(
        RetryConfig::new()
            .max_attempts(2)
            .initial_delay(Duration::from_millis(1_000))
            .max_delay(Duration::from_millis(250)),
    );
    let start = Instant::now();

    let result: Result<()> = strategy.run(|| async { Err(server_error()) }).await;

    assert!(matches!(
        result,
        Err(VedrfolnirError::RetryExhausted { attempts: 2, .. })
    ));
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(250), "waited {elapsed:?}");
    assert!(elapsed < Duration::from_millis(1_000), "waited {elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn backoff_exhaustion_reports_attempts_and_last_cause() {
    let calls = AtomicU32::new(0);
    let calls = &calls;

    let result: Result<()> = backoff(3, 10)
        .run(|| async move {
            let n = calls.fetch_add(1, Ordering::Relaxed) + 1;
            Err(VedrfolnirError::Api {
                status: 500,
                body: format!("attempt {n}"),
            })
        })
        .await;

    assert_eq!(calls.load(Ordering::Relaxed), 3);
    match result {
        Err(VedrfolnirError::RetryExhausted { attempts, source }) => {
            assert_eq!(attempts, 3);
            match *source {
                VedrfolnirError::Api { body, .. } => assert_eq!(body, "attempt 3"),
                other => panic!("expected Api, got {other:?}"),
            }
        }
        other => panic!("expected RetryExhausted, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn backoff_single_attempt_has_no_delay() {
    let start = Instant::now();
    let result: Result<()> = backoff(1, 1_000).run(|| async { Err(server_error()) }).await;

    assert!(matches!(
        result,
        Err(VedrfolnirError::RetryExhausted { attempts: 1, .. })
    ));
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn backoff_never_retries_past_cancellation() {
    let calls = AtomicU32::new(0);
    let calls = &calls;

    let result: Result<()> = backoff(5, 100)
        .run(|| async move {
            calls.fetch_add(1, Ordering::Relaxed);
            Err(VedrfolnirError::Cancelled)
        })
        .await;

    assert_eq!(calls.load(Ordering::Relaxed), 1);
    assert!(matches!(result, Err(VedrfolnirError::Cancelled)));
}

#[tokio::test(start_paused = true)]
async fn backoff_retries_every_failure_kind() {
    let calls = AtomicU32::new(0);
    let calls = &calls;

    let result: Result<()> = backoff(3, 10)
        .run(|| async move {
            calls.fetch_add(1, Ordering::Relaxed);
            Err(VedrfolnirError::Api {
                status: 401,
                body: "invalid key".into(),
            })
        })
        .await;

    // Client errors are not special-cased.
    assert_eq!(calls.load(Ordering::Relaxed), 3);
    assert_eq!(result.unwrap_err().status(), Some(401));
}
