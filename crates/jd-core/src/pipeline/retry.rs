//! Retry with backoff for model calls.

use crate::invoker::{InvokeError, ModelInvoker};
use std::time::Duration;

/// Defines how failed model calls are retried.
#[derive(Debug, Clone)]
pub enum RetryStrategy {
    /// Fixed delay between retries
    FixedDelay {
        delay: Duration,
        max_retries: u32,
    },
    /// Exponential backoff
    ExponentialBackoff {
        initial_delay: Duration,
        multiplier: f64,
        max_delay: Duration,
        max_retries: u32,
    },
}

impl Default for RetryStrategy {
    fn default() -> Self {
        RetryStrategy::ExponentialBackoff {
            initial_delay: Duration::from_millis(500),
            multiplier: 2.0,
            max_delay: Duration::from_secs(10),
            max_retries: 3,
        }
    }
}

impl RetryStrategy {
    /// Delay before retry number `attempt` (0-based), or `None` when retries
    /// are exhausted.
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        match self {
            RetryStrategy::FixedDelay { delay, max_retries } => {
                (attempt < *max_retries).then_some(*delay)
            }
            RetryStrategy::ExponentialBackoff {
                initial_delay,
                multiplier,
                max_delay,
                max_retries,
            } => {
                if attempt >= *max_retries {
                    return None;
                }
                let delay = Duration::from_secs_f64(
                    initial_delay.as_secs_f64() * multiplier.powi(attempt as i32),
                );
                Some(delay.min(*max_delay))
            }
        }
    }

    pub fn max_retries(&self) -> u32 {
        match self {
            RetryStrategy::FixedDelay { max_retries, .. } => *max_retries,
            RetryStrategy::ExponentialBackoff { max_retries, .. } => *max_retries,
        }
    }
}

/// Invoke the model, retrying per the strategy.
///
/// On exhaustion returns the retry count performed and the last error.
pub(crate) async fn invoke_with_retry(
    invoker: &dyn ModelInvoker,
    prompt: &str,
    strategy: &RetryStrategy,
) -> Result<String, (u32, InvokeError)> {
    let mut attempt: u32 = 0;
    loop {
        match invoker.invoke(prompt).await {
            Ok(text) => return Ok(text),
            Err(err) => match strategy.delay_for(attempt) {
                Some(delay) => {
                    tracing::warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "model call failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                None => return Err((attempt, err)),
            },
        }
    }
}
