use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{error, warn};

use crate::errors::{NutriError, Result};

/// What a single call to the completion service produced.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    Success(Value),
    /// Upstream answered 429.
    RetryableFailure,
    /// Anything else that is not a success. `status` is `None` for transport failures.
    TerminalFailure { status: Option<u16>, body: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Wait after the given 1-based attempt: `base_delay * 2^attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Drives `attempt` until it succeeds, fails terminally, or the policy runs out.
///
/// Only [`AttemptOutcome::RetryableFailure`] is retried. No wait follows the
/// last attempt.
pub async fn run_with_retry<F, Fut>(
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    mut attempt: F,
) -> Result<Value>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = AttemptOutcome>,
{
    let max_attempts = policy.max_attempts.max(1);

    for current in 1..=max_attempts {
        match attempt(current).await {
            AttemptOutcome::Success(body) => return Ok(body),
            AttemptOutcome::TerminalFailure { status, body } => {
                error!(status = ?status, body = %body, attempt = current, "completion request failed");
                return Err(NutriError::Gateway { status, body });
            }
            AttemptOutcome::RetryableFailure if current < max_attempts => {
                let delay = policy.delay_for(current);
                warn!(
                    attempt = current,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    "rate limited by completion service, backing off"
                );
                sleeper.sleep(delay).await;
            }
            AttemptOutcome::RetryableFailure => {}
        }
    }

    error!(attempts = max_attempts, "rate limit persisted after all retries");
    Err(NutriError::RateLimited {
        attempts: max_attempts,
    })
}
