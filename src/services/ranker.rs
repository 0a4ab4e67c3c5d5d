//! Hybrid lexical+vector ranking into recommendations.
//!
//! The store computes scores and rank order; this side only vectorizes
//! the query, applies the similarity floor, and projects survivors into
//! savings-annotated recommendations.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::AppError;
use crate::models::{HybridMatch, ItemRecommendations, QueryItem, Recommendation, SearchConfig};
use crate::services::provider::EmbeddingProvider;
use crate::services::store::OfferStore;

pub struct HybridRanker {
    provider: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn OfferStore>,
    config: SearchConfig,
}

impl HybridRanker {
    pub fn new(
        provider: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn OfferStore>,
        config: SearchConfig,
    ) -> Self {
        Self {
            provider,
            store,
            config,
        }
    }

    /// Recommendations for a batch of grocery-list items.
    ///
    /// A provider or store failure for one item yields an empty list
    /// for that item and never blocks the others.
    pub async fn search(&self, items: &[QueryItem]) -> Vec<ItemRecommendations> {
        let mut grouped = Vec::with_capacity(items.len());

        for item in items {
            let result = match self.search_one(item).await {
                Ok(result) => result,
                Err(e) => {
                    warn!(item = %item.text, error = %e, "item skipped");
                    ItemRecommendations {
                        item: item.clone(),
                        recommendations: Vec::new(),
                    }
                }
            };
            grouped.push(result);
        }

        grouped
    }

    /// Recommendations for a single item; errors propagate to the
    /// caller.
    pub async fn search_one(&self, item: &QueryItem) -> Result<ItemRecommendations, AppError> {
        // Query vectors must come from the same model as the catalog;
        // mixed dimensions are never comparable.
        let query_vector = self.provider.embed(&item.text).await?;

        let matches = self
            .store
            .hybrid_search(
                &item.text,
                &query_vector,
                self.config.limit,
                self.config.weights,
            )
            .await?;

        let candidates = matches.len();

        // The blend can rank a low-relevance offer highly when one
        // signal dominates; the similarity gate is an independent
        // relevance floor. Strictly above the threshold survives.
        let recommendations: Vec<Recommendation> = matches
            .into_iter()
            .filter(|m| m.similarity > self.config.similarity_threshold)
            .map(|m| self.project(item, m))
            .collect();

        debug!(
            item = %item.text,
            candidates,
            kept = recommendations.len(),
            "ranked item"
        );

        Ok(ItemRecommendations {
            item: item.clone(),
            recommendations,
        })
    }

    fn project(&self, item: &QueryItem, candidate: HybridMatch) -> Recommendation {
        let savings_percentage = candidate.offer.savings_percentage();
        let reason = format!("On offer at {}", candidate.offer.store_name);
        Recommendation {
            query_item: item.clone(),
            offer: candidate.offer,
            savings_percentage,
            reason,
        }
    }
}
