use std::future::Future;
use std::time::Duration;

use futures_util::future::join_all;
use tracing::warn;

use crate::error::{Error, Result};

/// Chunk operations running at once; the batch is awaited in full before
/// the next one is admitted.
pub const MAX_CONCURRENT_OPS: usize = 5;

/// Attempts per chunk operation before the whole transfer aborts.
pub const MAX_RETRIES: u32 = 3;

pub const RETRY_BASE_DELAY: Duration = Duration::from_secs(1);

/// Runs an ordered list of chunk operations in fixed-size batches.
///
/// Within a batch everything runs concurrently; across batches this is
/// plain admission control, not a work-stealing pool. Every operation gets
/// its own retry loop with exponential backoff, and exhausting it fails
/// the entire run; there is no partial-success mode.
#[derive(Debug, Clone)]
pub struct Scheduler {
    pub batch_size: usize,
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self {
            batch_size: MAX_CONCURRENT_OPS,
            max_retries: MAX_RETRIES,
            base_delay: RETRY_BASE_DELAY,
        }
    }
}

impl Scheduler {
    /// Backoff after a failed attempt: `base * 2^(attempt-1)`, saturating.
    fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }

    async fn run_one<T, F, Fut>(&self, index: u32, op: &F) -> Result<(u32, T)>
    where
        F: Fn(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1u32;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok((index, value)),
                // Integrity and structural failures are final immediately.
                Err(e) if !e.is_retryable() => return Err(e),
                Err(Error::Backend(source)) if attempt >= self.max_retries => {
                    return Err(Error::RetriesExhausted {
                        index,
                        attempts: attempt,
                        source,
                    });
                }
                Err(e) => {
                    let delay = self.delay_after(attempt);
                    warn!(index, attempt, error = %e, ?delay, "chunk operation failed, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Run all operations. `op(attempt)` must produce a fresh future per
    /// attempt; `on_done` fires once per successful operation, as
    /// completions happen.
    pub async fn run<T, F, Fut>(
        &self,
        ops: Vec<(u32, F)>,
        on_done: impl Fn(u32, &T) + Sync,
    ) -> Result<Vec<(u32, T)>>
    where
        F: Fn(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let batch_size = self.batch_size.max(1);
        let mut results = Vec::with_capacity(ops.len());
        for batch in ops.chunks(batch_size) {
            let outcomes = join_all(batch.iter().map(|(index, op)| async {
                let outcome = self.run_one(*index, op).await;
                if let Ok((done_index, value)) = &outcome {
                    on_done(*done_index, value);
                }
                outcome
            }))
            .await;
            // The whole batch has settled; the first exhausted operation
            // aborts the transfer.
            for outcome in outcomes {
                results.push(outcome?);
            }
        }
        Ok(results)
    }
}
