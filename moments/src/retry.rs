use std::future::Future;
use std::time::Duration;

use crate::config::RequestConfig;
use crate::error::{MomentsError, Result};

/// Attempt budget, per-attempt deadline and linear backoff step for one remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub timeout: Duration,
    pub backoff_step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            timeout: Duration::from_millis(15_000),
            backoff_step: Duration::from_millis(300),
        }
    }
}

impl From<&RequestConfig> for RetryPolicy {
    fn from(config: &RequestConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            timeout: config.timeout(),
            backoff_step: config.backoff_step(),
        }
    }
}

impl RetryPolicy {
    /// Delay slept after the given failed attempt (1-based).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.backoff_step * attempt
    }
}

/// Runs `op` until it succeeds or the policy's attempts are used up.
///
/// Each attempt races the operation against `policy.timeout`; losing the race
/// counts as a failed attempt and the in-flight future is dropped. Between
/// attempts the task sleeps `backoff_step × attempt`. The error of the last
/// attempt is returned once the budget is exhausted.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, label: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut last_error: Option<MomentsError> = None;

    for attempt in 1..=max_attempts {
        let outcome = match tokio::time::timeout(policy.timeout, op()).await {
            Ok(result) => result,
            Err(_) => Err(MomentsError::Timeout {
                timeout_ms: policy.timeout.as_millis() as u64,
            }),
        };

        match outcome {
            Ok(value) => return Ok(value),
            Err(error) => {
                if attempt < max_attempts {
                    let delay = policy.backoff_for(attempt);
                    tracing::warn!(
                        request = label,
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "Remote request failed, retrying"
                    );
                    last_error = Some(error);
                    tokio::time::sleep(delay).await;
                } else {
                    tracing::debug!(request = label, attempt, error = %error, "Retries exhausted");
                    last_error = Some(error);
                }
            }
        }
    }

    Err(last_error
        .unwrap_or_else(|| MomentsError::Internal(format!("{label}: request failed after retries"))))
}
