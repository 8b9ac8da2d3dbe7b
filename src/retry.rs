// Bounded connection retry with exponential backoff
// Used for bring-up of the serial port and the input feed.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one (at least 1)
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Delay after the given failed attempt (1-based), doubling up to `max_backoff`
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{what}: gave up after {attempts} attempts, last error: {last_error}")]
pub struct RetryError {
    pub what: String,
    pub attempts: u32,
    pub last_error: String,
}

/// Run `connect` until it succeeds or the policy runs out of attempts
pub async fn with_backoff<T, E, F, Fut>(
    policy: &RetryPolicy,
    what: &str,
    mut connect: F,
) -> Result<T, RetryError>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match connect().await {
            Ok(value) => {
                if attempt > 1 {
                    info!("{} connected after {} attempts", what, attempt);
                }
                return Ok(value);
            }
            Err(e) if attempt >= max_attempts => {
                return Err(RetryError {
                    what: what.to_string(),
                    attempts: attempt,
                    last_error: e.to_string(),
                });
            }
            Err(e) => {
                let delay = policy.backoff(attempt);
                warn!(
                    "{} attempt {}/{} failed: {} (retrying in {:?})",
                    what, attempt, max_attempts, e, delay
                );
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
