//! Relational/vector store abstraction.
//!
//! The store owns the hybrid ranking function; this core only consumes
//! its pre-sorted output and never recomputes scores.

mod pgvector;

pub use pgvector::PgOfferStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{HybridMatch, Offer, PageWindow, SearchWeights};

/// Capability interface over the relational store.
#[async_trait]
pub trait OfferStore: Send + Sync {
    /// All catalog offers still lacking a vector.
    async fn fetch_unembedded(&self) -> Result<Vec<Offer>, StoreError>;

    /// Persist one offer's vector, keyed by id. Each write commits
    /// independently; no transaction spans records.
    async fn write_embedding(&self, id: Uuid, embedding: &[f32]) -> Result<(), StoreError>;

    /// Store-side weighted lexical+semantic ranking. Returns candidates
    /// pre-sorted by combined rank; the scoring formula is the store's.
    async fn hybrid_search(
        &self,
        query_text: &str,
        query_vector: &[f32],
        limit: u32,
        weights: SearchWeights,
    ) -> Result<Vec<HybridMatch>, StoreError>;

    /// Windowed read for paged consumers: one page of offers plus the
    /// total row count, so [`PageWindow::has_more`] can decide.
    async fn fetch_window(&self, window: PageWindow) -> Result<(Vec<Offer>, u64), StoreError>;
}
