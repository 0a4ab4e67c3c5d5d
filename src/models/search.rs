//! Search models: query items, ranking output, recommendations.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::offer::Offer;

/// One free-text grocery-list entry to match against the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryItem {
    pub id: Uuid,
    pub text: String,
}

impl QueryItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
        }
    }
}

/// Weights for the store-side lexical/semantic blend.
///
/// Unnormalized multipliers, not a probability mixture; they need not
/// sum to 1.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SearchWeights {
    pub lexical: f32,
    pub semantic: f32,
}

impl Default for SearchWeights {
    fn default() -> Self {
        Self {
            lexical: 1.0,
            semantic: 1.0,
        }
    }
}

/// One candidate returned by the store's hybrid ranking function.
///
/// The store computes all scores and returns candidates pre-sorted by
/// `combined_rank`; this core consumes that order as-is. `similarity`
/// is in [0, 1] and is the only value used for threshold filtering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HybridMatch {
    pub offer: Offer,
    pub lexical_score: f32,
    pub semantic_score: f32,
    pub similarity: f32,
    pub combined_rank: f32,
}

/// A matched offer projected for presentation. Derived, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub query_item: QueryItem,
    pub offer: Offer,
    pub savings_percentage: f64,
    pub reason: String,
}

/// Recommendations grouped by query item. An empty list is a valid
/// outcome for an item, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemRecommendations {
    pub item: QueryItem,
    pub recommendations: Vec<Recommendation>,
}

impl ItemRecommendations {
    pub fn is_empty(&self) -> bool {
        self.recommendations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.recommendations.len()
    }
}
