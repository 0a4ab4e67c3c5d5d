mod batcher;
mod limiter;
mod pipeline;
mod provider;
mod ranker;
mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use batcher::BatchCoordinator;
pub use limiter::ConcurrencyLimiter;
pub use pipeline::{EmbeddingPipeline, PipelineReport};
pub use provider::{EmbeddingProvider, HttpEmbeddingProvider};
pub use ranker::HybridRanker;
pub use store::{OfferStore, PgOfferStore};
