//! Embedding backfill pipeline.
//!
//! Brings every catalog offer's `embedding` from absent to populated.
//! Failures are per-record: a failed offer stays unembedded and is
//! picked up again on the next invocation. The run succeeds when every
//! fetched record has been attempted, not when every record succeeded.

use std::sync::Arc;

use anyhow::Context;
use futures::future::join_all;
use tokio::time::{Duration, sleep};
use tracing::{info, warn};

use crate::error::StoreError;
use crate::models::PipelineConfig;
use crate::services::limiter::ConcurrencyLimiter;
use crate::services::provider::EmbeddingProvider;
use crate::services::store::OfferStore;

/// Counts reported by one pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineReport {
    pub fetched: usize,
    pub embedded: usize,
    pub failed: usize,
}

pub struct EmbeddingPipeline {
    provider: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn OfferStore>,
    limiter: ConcurrencyLimiter,
    config: PipelineConfig,
}

impl EmbeddingPipeline {
    pub fn new(
        provider: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn OfferStore>,
        config: PipelineConfig,
    ) -> Self {
        let limiter = ConcurrencyLimiter::new(config.concurrency);
        Self {
            provider,
            store,
            limiter,
            config,
        }
    }

    /// Embed every offer currently lacking a vector.
    ///
    /// Only the initial bulk read can fail the run; everything after it
    /// is isolated per record.
    pub async fn run(&self) -> Result<PipelineReport, StoreError> {
        let offers = self.store.fetch_unembedded().await?;
        let mut report = PipelineReport {
            fetched: offers.len(),
            ..Default::default()
        };

        if offers.is_empty() {
            info!("no offers need embedding");
            return Ok(report);
        }

        let total_chunks = offers.len().div_ceil(self.config.chunk_size.max(1));
        info!(
            offers = offers.len(),
            chunks = total_chunks,
            "starting embedding run"
        );

        // Chunks exist for progress reporting and the inter-chunk rate
        // delay; they carry no correctness semantics.
        for (chunk_index, chunk) in offers.chunks(self.config.chunk_size.max(1)).enumerate() {
            let outcomes = join_all(chunk.iter().map(|offer| {
                let provider = self.provider.clone();
                let store = self.store.clone();
                let limiter = self.limiter.clone();
                let id = offer.id;
                let text = offer.embedding_text();
                async move {
                    limiter
                        .run(async move {
                            let embedding = provider
                                .embed(&text)
                                .await
                                .context("embedding provider call failed")?;
                            store
                                .write_embedding(id, &embedding)
                                .await
                                .context("embedding write failed")?;
                            Ok(())
                        })
                        .await
                }
            }))
            .await;

            for (offer, outcome) in chunk.iter().zip(outcomes) {
                match outcome {
                    Ok(()) => report.embedded += 1,
                    Err(e) => {
                        warn!(
                            offer_id = %offer.id,
                            error = %e,
                            "offer left unembedded; next run will retry"
                        );
                        report.failed += 1;
                    }
                }
            }

            info!(
                chunk = chunk_index + 1,
                total = total_chunks,
                embedded = report.embedded,
                failed = report.failed,
                "chunk complete"
            );

            // Global throttle between chunks; none after the last.
            if chunk_index + 1 < total_chunks {
                sleep(Duration::from_millis(self.config.chunk_delay_ms)).await;
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EMBEDDING_DIM;
    use crate::services::testing::{FakeProvider, MemoryStore, test_offer};

    fn pipeline_config() -> PipelineConfig {
        PipelineConfig {
            chunk_size: 100,
            concurrency: 5,
            chunk_delay_ms: 0,
        }
    }

    #[tokio::test]
    async fn test_partial_failure_leaves_only_failed_record_unembedded() {
        let offers = vec![
            test_offer("milk", "Coop"),
            test_offer("broken cheese", "Coop"),
            test_offer("bread", "Rema"),
        ];
        let ids: Vec<_> = offers.iter().map(|o| o.id).collect();

        let provider = Arc::new(FakeProvider::failing_on(&["broken cheese"]));
        let store = Arc::new(MemoryStore::with_offers(offers));
        let pipeline = EmbeddingPipeline::new(provider, store.clone(), pipeline_config());

        let report = pipeline.run().await.unwrap();
        assert_eq!(report.fetched, 3);
        assert_eq!(report.embedded, 2);
        assert_eq!(report.failed, 1);

        let first = store.embedding_for(ids[0]).unwrap();
        assert_eq!(first.len(), EMBEDDING_DIM);
        assert!(store.embedding_for(ids[1]).is_none());
        assert!(store.embedding_for(ids[2]).is_some());
    }

    #[tokio::test]
    async fn test_failed_record_is_refetched_on_next_run() {
        let offers = vec![test_offer("broken cheese", "Coop")];
        let id = offers[0].id;

        let store = Arc::new(MemoryStore::with_offers(offers));
        let failing = Arc::new(FakeProvider::failing_on(&["broken cheese"]));
        let pipeline = EmbeddingPipeline::new(failing, store.clone(), pipeline_config());
        let report = pipeline.run().await.unwrap();
        assert_eq!(report.failed, 1);

        // Rerun with a healthy provider picks the record up again.
        let healthy = Arc::new(FakeProvider::new());
        let pipeline = EmbeddingPipeline::new(healthy, store.clone(), pipeline_config());
        let report = pipeline.run().await.unwrap();
        assert_eq!(report.fetched, 1);
        assert_eq!(report.embedded, 1);
        assert!(store.embedding_for(id).is_some());
    }

    #[tokio::test]
    async fn test_empty_catalog_is_a_clean_run() {
        let provider = Arc::new(FakeProvider::new());
        let store = Arc::new(MemoryStore::default());
        let pipeline = EmbeddingPipeline::new(provider.clone(), store, pipeline_config());

        let report = pipeline.run().await.unwrap();
        assert_eq!(report, PipelineReport::default());
        assert_eq!(provider.calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_between_chunks_but_not_after_last() {
        let offers: Vec<_> = (0..5).map(|i| test_offer(&format!("item {}", i), "Coop")).collect();
        let provider = Arc::new(FakeProvider::new());
        let store = Arc::new(MemoryStore::with_offers(offers));

        let config = PipelineConfig {
            chunk_size: 2,
            concurrency: 5,
            chunk_delay_ms: 1000,
        };
        let pipeline = EmbeddingPipeline::new(provider, store, config);

        let start = tokio::time::Instant::now();
        let report = pipeline.run().await.unwrap();
        assert_eq!(report.embedded, 5);

        // 3 chunks, so exactly 2 inter-chunk delays.
        assert_eq!(start.elapsed(), Duration::from_millis(2000));
    }
}
