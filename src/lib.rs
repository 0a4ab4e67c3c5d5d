//! Recommendation core for matching grocery-list items against
//! discounted store offers.
//!
//! The crate is invoked directly by a scheduled job or request handler:
//! [`services::EmbeddingPipeline::run`] backfills offer vectors, and
//! [`services::HybridRanker::search`] turns a list of free-text items
//! into threshold-filtered, savings-annotated recommendations. The
//! batching and concurrency primitives under [`services`] are generic
//! and usable by any caller sharing a rate budget.

pub mod error;
pub mod models;
pub mod services;

pub use error::AppError;
pub use models::{Config, ItemRecommendations, QueryItem, Recommendation};
