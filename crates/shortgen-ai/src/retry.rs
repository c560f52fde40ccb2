//! Backoff policy and retry wrapper for service calls.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

/// How many times to try a call and how long to wait in between.
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Delay after the first failed attempt.
    pub base_delay: Duration,
    /// Factor applied to the delay after each further failure.
    pub multiplier: f64,
}

impl BackoffPolicy {
    /// Same pause between every attempt.
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay: delay,
            multiplier: 1.0,
        }
    }

    /// Pause doubles (or grows by `multiplier`) after every failure.
    pub fn exponential(max_attempts: u32, base_delay: Duration, multiplier: f64) -> Self {
        Self {
            max_attempts,
            base_delay,
            multiplier,
        }
    }

    /// Policy for segment analysis: 2 attempts, 1 s apart.
    pub fn analysis() -> Self {
        Self::fixed(2, Duration::from_secs(1))
    }

    /// Policy for metadata generation: 3 attempts, 2 s then 4 s.
    pub fn metadata() -> Self {
        Self::exponential(3, Duration::from_secs(2), 2.0)
    }

    /// Same shape with every delay set to zero.
    pub fn without_delay(mut self) -> Self {
        self.base_delay = Duration::ZERO;
        self
    }

    /// Delay after the failure of attempt `attempt` (0-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.max(0.0).powi(attempt as i32);
        self.base_delay.mul_f64(factor)
    }

    /// Whether another attempt follows attempt `attempt` (0-based).
    pub fn has_attempt_after(&self, attempt: u32) -> bool {
        attempt + 1 < self.max_attempts
    }
}

/// Result of a retried operation.
#[derive(Debug)]
pub enum RetryResult<T, E> {
    /// Operation succeeded.
    Success(T),
    /// Operation failed on its last attempt, or with a non-retryable error.
    Failed { error: E, attempts: u32 },
}

impl<T, E> RetryResult<T, E> {
    /// Returns true if the operation succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, RetryResult::Success(_))
    }

    pub fn into_result(self) -> Result<T, E> {
        match self {
            RetryResult::Success(v) => Ok(v),
            RetryResult::Failed { error, .. } => Err(error),
        }
    }
}

/// Run `operation` under `policy`, retrying errors accepted by `should_retry`.
///
/// Sleeps on the calling task between attempts; there is no jitter.
pub async fn retry_async<F, Fut, T, E, R>(
    policy: &BackoffPolicy,
    operation_name: &str,
    should_retry: R,
    mut operation: F,
) -> RetryResult<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    R: Fn(&E) -> bool,
{
    let mut attempt = 0u32;

    loop {
        match operation().await {
            Ok(value) => return RetryResult::Success(value),
            Err(e) if should_retry(&e) && policy.has_attempt_after(attempt) => {
                let delay = policy.delay_for_attempt(attempt);
                warn!(
                    operation = %operation_name,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    "Attempt failed, retrying: {}",
                    e
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                debug!(
                    operation = %operation_name,
                    attempts = attempt + 1,
                    "Giving up: {}",
                    e
                );
                return RetryResult::Failed {
                    error: e,
                    attempts: attempt + 1,
                };
            }
        }
    }
}
