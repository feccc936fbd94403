use std::future::Future;
use std::time::Duration;

/// Bounded retries with a fixed delay between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// Same policy with no wait between attempts.
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO)
    }
}

/// Every attempt failed; `last` is the final attempt's error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryError<E> {
    pub attempts: u32,
    pub last: E,
}

/// Runs `operation` until it succeeds or `policy.max_attempts` attempts have
/// failed. The closure receives the 1-based attempt number; `on_failure`
/// sees each failed attempt before the delay.
///
/// A policy of zero attempts still runs the operation once.
pub async fn with_retries<T, E, Op, Fut, OnFail>(
    policy: RetryPolicy,
    mut operation: Op,
    mut on_failure: OnFail,
) -> Result<T, RetryError<E>>
where
    Op: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    OnFail: FnMut(u32, &E),
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) => {
                on_failure(attempt, &err);
                if attempt >= max_attempts {
                    return Err(RetryError {
                        attempts: attempt,
                        last: err,
                    });
                }
            }
        }
        if !policy.delay.is_zero() {
            tokio::time::sleep(policy.delay).await;
        }
        attempt += 1;
    }
}
