//! Bounded exponential backoff
//!
//! `retry_with_backoff` is generic over the operation and the error type so it
//! can be tested with a recording sleeper instead of wall-clock waits.

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// How many attempts to make and how long to wait between them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    /// Wait before the second attempt
    pub initial_delay: Duration,
    /// Factor applied to the wait after each failed attempt
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_millis(1000),
            multiplier: 2,
        }
    }
}

impl RetryPolicy {
    /// Waits between consecutive attempts, `max_attempts - 1` of them
    pub fn delays(&self) -> impl Iterator<Item = Duration> {
        let multiplier = self.multiplier;
        std::iter::successors(Some(self.initial_delay), move |d| {
            Some(d.saturating_mul(multiplier))
        })
        .take(self.max_attempts.saturating_sub(1) as usize)
    }
}

/// Source of delays between attempts
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// Every attempt failed with a retryable error
    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: E },
    /// An attempt failed with an error that is not worth retrying
    #[error(transparent)]
    Fatal(E),
}

/// Run `op` until it succeeds, fails with a non-retryable error, or the
/// policy's attempts are used up. `op` receives the 1-based attempt number.
pub async fn retry_with_backoff<T, E, F, Fut, R, S>(
    policy: &RetryPolicy,
    sleeper: &S,
    mut is_retryable: R,
    mut op: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: FnMut(&E) -> bool,
    S: Sleeper + ?Sized,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut delays = policy.delays();
    let mut attempt = 1;

    loop {
        let err = match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if !is_retryable(&err) {
            return Err(RetryError::Fatal(err));
        }
        if attempt >= max_attempts {
            return Err(RetryError::Exhausted {
                attempts: attempt,
                last: err,
            });
        }

        let delay = delays.next().unwrap_or(policy.initial_delay);
        tracing::warn!(
            attempt,
            max_attempts,
            delay_ms = %delay.as_millis(),
            "Retryable failure, backing off"
        );
        sleeper.sleep(delay).await;
        attempt += 1;
    }
}
