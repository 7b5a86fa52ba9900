//! Paged retrieval and retry utilities over an abstract tabular source.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

/// Default page size for batched table reads.
pub const DEFAULT_BATCH_SIZE: u64 = 1000;

/// Hard safety ceiling on rows accumulated by one batched fetch.
///
/// Operational guard against runaway pagination on a degraded backend, not
/// a domain invariant. Callers may override it per fetch.
pub const MAX_ACCUMULATED_ROWS: usize = 50_000;

/// Default number of attempts for [`execute_with_retry`].
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default base delay between retry attempts, in milliseconds.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 500;

/// Default base delay between retry attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(DEFAULT_RETRY_DELAY_MS);

/// Paging and row-cap settings for batched reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchConfig {
    /// Rows requested per round trip.
    pub batch_size: u64,
    /// Safety ceiling on total accumulated rows.
    pub max_rows: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            max_rows: MAX_ACCUMULATED_ROWS,
        }
    }
}

/// Retry settings for single-shot remote calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Base delay; attempt N waits `base_delay * N` (linear backoff).
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

/// Fetch all rows from a paged source by repeatedly calling
/// `query_fn(offset, limit)`.
///
/// Starts at offset 0 and advances by `batch_size` after each full batch.
/// Terminates on an empty or short batch (end of data) or once
/// `config.max_rows` rows have accumulated, in which case the result is
/// truncated to the cap.
///
/// # Errors
///
/// Propagates the first error from `query_fn` immediately; rows accumulated
/// before the failure are discarded, never returned partially.
pub async fn fetch_in_batches<T, E, F, Fut>(mut query_fn: F, config: BatchConfig) -> Result<Vec<T>, E>
where
    F: FnMut(u64, u64) -> Fut,
    Fut: Future<Output = Result<Vec<T>, E>>,
{
    let mut rows: Vec<T> = Vec::new();
    let mut offset: u64 = 0;

    loop {
        let batch = query_fn(offset, config.batch_size).await?;
        let batch_len = batch.len() as u64;
        rows.extend(batch);

        // The ceiling binds even when the final batch is short, so it must
        // be checked before the end-of-data break
        if rows.len() >= config.max_rows {
            warn!(
                accumulated = rows.len(),
                cap = config.max_rows,
                "batched fetch hit the row safety ceiling, truncating"
            );
            rows.truncate(config.max_rows);
            break;
        }
        if batch_len < config.batch_size {
            break;
        }

        offset += config.batch_size;
        debug!(offset, accumulated = rows.len(), "fetching next batch");
    }

    Ok(rows)
}

/// Call `op` up to `policy.max_attempts` times with linear backoff.
///
/// Attempt N sleeps `base_delay * N` before the next try. Every error is
/// retried until the budget is exhausted; no distinction is made between
/// retryable and fatal classes, so this must not wrap non-idempotent
/// mutations.
///
/// # Errors
///
/// Returns the last error once all attempts have failed.
pub async fn execute_with_retry<T, E, F, Fut>(mut op: F, policy: RetryPolicy) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt: u32 = 1;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt >= max_attempts {
                    return Err(err);
                }
                debug!(attempt, max_attempts, "retrying after failed attempt");
                tokio::time::sleep(policy.base_delay * attempt).await;
                attempt += 1;
            }
        }
    }
}
