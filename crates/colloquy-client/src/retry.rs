//! Bounded retry of transient transport failures.
//!
//! Retries up to `max_retries` times with exponential backoff (1 s, 2 s,
//! 4 s at the defaults) before the failure propagates. Callers above this
//! layer only ever observe the final success or the final failure.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::client::ClientError;

#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Re-attempts after the first failure.
    pub max_retries: u32,
    pub base_backoff_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_retries: 3, base_backoff_secs: 1 }
    }
}

impl RetryConfig {
    fn backoff_secs(&self, attempt: u32) -> u64 {
        self.base_backoff_secs << attempt
    }
}

/// Run `f`, re-running it on transient failures until it succeeds or the
/// retry budget is exhausted. Non-transient errors propagate immediately.
pub async fn with_retry<T, F, Fut>(
    config: &RetryConfig,
    operation: &str,
    mut f: F,
) -> Result<T, ClientError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ClientError>>,
{
    let mut attempt = 0u32;
    loop {
        match f().await {
            Ok(val) => return Ok(val),
            Err(err) => {
                if !err.is_transient() || attempt >= config.max_retries {
                    return Err(err);
                }
                let backoff = config.backoff_secs(attempt);
                attempt += 1;
                warn!(
                    operation,
                    error = %err,
                    backoff_secs = backoff,
                    attempt,
                    max_retries = config.max_retries,
                    "transient failure, retrying"
                );
                tokio::time::sleep(Duration::from_secs(backoff)).await;
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
