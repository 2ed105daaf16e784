//! Bounded retries with exponential, jittered backoff.

use deckgen_core::Result;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// How many times to attempt an operation and how long to wait in between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Delay after the first failure, before jitter.
    pub initial_delay: Duration,
    /// Upper bound on any single delay, jitter included.
    pub max_delay: Duration,
    /// Upper bound of the uniform random delay added to each wait.
    pub jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(8),
            jitter: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// A policy with `max_attempts` attempts and no waiting, for tests.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            jitter: Duration::ZERO,
        }
    }

    /// Delay before the retry that follows failed attempt number `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let base = self.initial_delay.saturating_mul(1u32 << exponent);
        let jitter = if self.jitter.is_zero() {
            Duration::ZERO
        } else {
            let secs = rand::rng().random_range(0.0..=self.jitter.as_secs_f64());
            Duration::from_secs_f64(secs)
        };
        base.saturating_add(jitter).min(self.max_delay)
    }
}

/// Run `op` until it succeeds, fails with a non-retryable error, or the
/// attempts run out. The last error is returned unchanged.
///
/// `op` receives the 1-based attempt number.
pub async fn retry<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_retryable() || attempt >= max_attempts => return Err(e),
            Err(e) => {
                let delay = policy.delay_after(attempt);
                log::warn!(
                    "Attempt {}/{} failed: {}; retrying in {:.1}s",
                    attempt,
                    max_attempts,
                    e,
                    delay.as_secs_f64()
                );
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                attempt += 1;
            }
        }
    }
}
