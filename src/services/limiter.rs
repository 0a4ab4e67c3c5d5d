//! Concurrency limiting for external provider calls.

use std::future::Future;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use tokio::sync::Semaphore;

/// Bounds the number of in-flight async operations.
///
/// Excess submissions wait in FIFO order for a free slot; completion
/// order is whatever the operations' own latencies produce.
#[derive(Clone)]
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
    max_concurrency: usize,
}

impl ConcurrencyLimiter {
    pub fn new(max_concurrency: usize) -> Self {
        let max_concurrency = max_concurrency.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrency)),
            max_concurrency,
        }
    }

    /// Run an operation once a slot is free.
    pub async fn run<T, F>(&self, op: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| anyhow!("concurrency limiter has shut down"))?;
        op.await
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Slots currently free.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::join_all;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    async fn max_observed_overlap(limit: usize, ops: usize) -> usize {
        let limiter = ConcurrencyLimiter::new(limit);
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let futures: Vec<_> = (0..ops)
            .map(|_| {
                let limiter = limiter.clone();
                let running = running.clone();
                let peak = peak.clone();
                async move {
                    limiter
                        .run(async move {
                            let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                            peak.fetch_max(now, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(5)).await;
                            running.fetch_sub(1, Ordering::SeqCst);
                            Ok(())
                        })
                        .await
                }
            })
            .collect();

        join_all(futures).await;
        peak.load(Ordering::SeqCst)
    }

    #[tokio::test]
    async fn test_overlap_never_exceeds_limit() {
        for limit in [1usize, 3, 10] {
            let peak = max_observed_overlap(limit, 25).await;
            assert!(
                peak <= limit,
                "observed {} concurrent ops with limit {}",
                peak,
                limit
            );
        }
    }

    #[tokio::test]
    async fn test_failures_release_their_slot() {
        let limiter = ConcurrencyLimiter::new(1);

        let failed: Result<()> = limiter.run(async { Err(anyhow!("boom")) }).await;
        assert!(failed.is_err());

        // The slot freed by the failed op admits the next caller.
        let ok = limiter.run(async { Ok(42) }).await;
        assert_eq!(ok.unwrap(), 42);
        assert_eq!(limiter.available(), 1);
    }

    #[tokio::test]
    async fn test_zero_clamps_to_one() {
        let limiter = ConcurrencyLimiter::new(0);
        assert_eq!(limiter.max_concurrency(), 1);
        let result = limiter.run(async { Ok(()) }).await;
        assert!(result.is_ok());
    }
}
