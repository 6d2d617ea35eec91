use std::future::Future;
use std::time::Duration;

use apiglue_core::Failure;
use tracing::{debug, info};

/// Attempt numbers stop at `u32::MAX` when retrying without bound.
fn next_attempt(attempt: u32) -> u32 {
    attempt.saturating_add(1)
}

/// Invoke `action` until `predicate` accepts its result.
///
/// Attempts run strictly one after another, with `delay` awaited between a
/// rejected attempt and the next one. An accepted result is returned at once.
/// When `max_attempts` is `Some(n)` and the n-th result is still rejected,
/// that last result is returned as-is: running out of attempts is not an
/// error. `None` retries without bound.
///
/// A failing action aborts the loop and its failure is returned unchanged.
pub async fn retry_until<R, F, Fut, P>(
    mut action: F,
    mut predicate: P,
    max_attempts: Option<u32>,
    delay: Duration,
) -> Result<R, Failure>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<R, Failure>>,
    P: FnMut(&R) -> bool,
{
    if max_attempts == Some(0) {
        return Err(Failure::validation("max attempts must be at least 1"));
    }

    let mut attempt: u32 = 0;
    loop {
        attempt = next_attempt(attempt);
        let result = action().await?;

        if predicate(&result) {
            debug!(attempt, "predicate accepted result");
            return Ok(result);
        }

        if max_attempts.is_some_and(|max| attempt >= max) {
            info!(attempt, "attempt budget exhausted, returning last result");
            return Ok(result);
        }

        debug!(attempt, delay_ms = delay.as_millis(), "predicate rejected result, retrying");
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use tokio::time::Instant;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn accepted_on_first_call_does_not_sleep() {
        let calls = Cell::new(0u32);
        let start = Instant::now();

        let result = retry_until(
            || {
                calls.set(calls.get() + 1);
                async { Ok::<_, Failure>("ready") }
            },
            |r| *r == "ready",
            Some(5),
            Duration::from_secs(1),
        )
        .await
        .unwrap();

        assert_eq!(result, "ready");
        assert_eq!(calls.get(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_budget_returns_last_result() {
        let calls = Cell::new(0u32);
        let start = Instant::now();

        let result = retry_until(
            || {
                calls.set(calls.get() + 1);
                let n = calls.get();
                async move { Ok::<_, Failure>(n) }
            },
            |_| false,
            Some(4),
            Duration::from_millis(500),
        )
        .await
        .unwrap();

        assert_eq!(result, 4);
        assert_eq!(calls.get(), 4);
        // Three waits between four attempts, none after the last.
        assert_eq!(start.elapsed(), Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn unbounded_retries_until_accepted() {
        let calls = Cell::new(0u32);

        let result = retry_until(
            || {
                calls.set(calls.get() + 1);
                let n = calls.get();
                async move { Ok::<_, Failure>(n) }
            },
            |n| *n == 25,
            None,
            Duration::from_millis(100),
        )
        .await
        .unwrap();

        assert_eq!(result, 25);
        assert_eq!(calls.get(), 25);
    }

    #[tokio::test]
    async fn action_failure_stops_retrying() {
        let calls = Cell::new(0u32);

        let err = retry_until(
            || {
                calls.set(calls.get() + 1);
                async { Err::<u32, _>(Failure::validation("submission id is required")) }
            },
            |_| false,
            Some(3),
            Duration::ZERO,
        )
        .await
        .unwrap_err();

        assert_eq!(calls.get(), 1);
        assert!(matches!(err, Failure::Validation { .. }));
    }

    #[tokio::test]
    async fn zero_attempts_is_rejected() {
        let err = retry_until(|| async { Ok::<_, Failure>(()) }, |()| true, Some(0), Duration::ZERO)
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some(400));
    }

    #[test]
    fn attempt_counter_saturates() {
        assert_eq!(next_attempt(0), 1);
        assert_eq!(next_attempt(u32::MAX), u32::MAX);
    }

    #[tokio::test]
    async fn unbounded_without_delay_keeps_polling() {
        let calls = Cell::new(0u32);

        let result = retry_until(
            || {
                calls.set(calls.get() + 1);
                let n = calls.get();
                async move { Ok::<_, Failure>(n) }
            },
            |n| *n == 10_000,
            None,
            Duration::ZERO,
        )
        .await
        .unwrap();

        assert_eq!(result, 10_000);
    }
}
