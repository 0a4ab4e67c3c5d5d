//! Generic request batching.
//!
//! Callers submit independent async operations; a worker task groups
//! them and flushes the group when it reaches the configured size or
//! when the idle timeout elapses after the first queued item, whichever
//! comes first. All operations in a flush run concurrently, every
//! outcome is recorded in isolation, and each caller receives exactly
//! its own result. One operation failing never fails its siblings.

use std::future::Future;
use std::pin::Pin;

use anyhow::{Result, anyhow};
use futures::future::join_all;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Duration, Instant, sleep_until};

use crate::models::BatchConfig;

type BoxedOp<T> = Pin<Box<dyn Future<Output = Result<T>> + Send>>;

struct Pending<T> {
    op: BoxedOp<T>,
    reply: oneshot::Sender<Result<T>>,
}

/// Batches independent async operations by size or elapsed time.
///
/// Construct one per process at startup and clone the handle wherever
/// request coalescing is needed; unrelated call sites that share no
/// rate budget get their own instance. Tests construct fresh instances
/// to avoid cross-test interference.
pub struct BatchCoordinator<T> {
    tx: mpsc::UnboundedSender<Pending<T>>,
    batch_timeout: Duration,
}

impl<T> Clone for BatchCoordinator<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            batch_timeout: self.batch_timeout,
        }
    }
}

impl<T: Send + 'static> BatchCoordinator<T> {
    pub fn new(config: BatchConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let batch_timeout = Duration::from_millis(config.batch_timeout_ms);

        tokio::spawn(worker_loop(rx, config.batch_size.max(1), batch_timeout));

        Self { tx, batch_timeout }
    }

    pub fn with_defaults() -> Self {
        Self::new(BatchConfig::default())
    }

    /// Queue an operation for the next flush and wait for its outcome.
    ///
    /// Resolves exactly once, with this operation's own result.
    pub async fn submit<F>(&self, op: F) -> Result<T>
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Pending {
                op: Box::pin(op),
                reply: reply_tx,
            })
            .map_err(|_| anyhow!("batch coordinator has shut down"))?;

        reply_rx
            .await
            .map_err(|_| anyhow!("batch coordinator dropped the request"))?
    }

    pub fn batch_timeout(&self) -> Duration {
        self.batch_timeout
    }
}

async fn worker_loop<T: Send>(
    mut rx: mpsc::UnboundedReceiver<Pending<T>>,
    batch_size: usize,
    batch_timeout: Duration,
) {
    // The deadline exists only while a batch is open, so a timer can
    // never fire against an empty queue.
    while let Some(first) = rx.recv().await {
        let mut batch = vec![first];
        let deadline = Instant::now() + batch_timeout;

        while batch.len() < batch_size {
            tokio::select! {
                _ = sleep_until(deadline) => break,
                item = rx.recv() => match item {
                    Some(pending) => batch.push(pending),
                    None => {
                        flush(batch).await;
                        return;
                    }
                },
            }
        }

        tracing::debug!(size = batch.len(), "flushing batch");
        flush(batch).await;
    }
}

/// Run every queued operation concurrently, wait for all outcomes, then
/// deliver each caller its own result.
async fn flush<T: Send>(batch: Vec<Pending<T>>) {
    let (ops, replies): (Vec<_>, Vec<_>) =
        batch.into_iter().map(|p| (p.op, p.reply)).unzip();

    let results = join_all(ops).await;

    for (reply, result) in replies.into_iter().zip(results) {
        // Caller may have been dropped; nothing to deliver then.
        let _ = reply.send(result);
    }
}
