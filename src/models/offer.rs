//! Catalog offer model and savings computation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Dimensionality of catalog embeddings. Vectors from a different model
/// or dimension are never comparable and must not be mixed in.
pub const EMBEDDING_DIM: usize = 384;

/// A time-boxed store offer from the catalog.
///
/// Created by catalog ingestion (external). This core only ever writes
/// the `embedding` field, once, through the embedding pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    pub id: Uuid,

    /// Product name as printed in the offer
    pub name: String,

    /// Optional free-text description
    pub description: Option<String>,

    /// Optional category label (e.g. "dairy")
    pub category: Option<String>,

    /// Name of the store running the offer
    pub store_name: String,

    /// Discounted price
    pub current_price: f64,

    /// Pre-discount price, when the source lists one
    pub original_price: Option<f64>,

    /// Stated discount, when the source lists one
    pub discount_percentage: Option<f64>,

    /// Offer validity window
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,

    /// Vector representation; `None` until the pipeline populates it.
    /// Invariant: when present, length is exactly [`EMBEDDING_DIM`].
    pub embedding: Option<Vec<f32>>,
}

impl Offer {
    /// Text fed to the embedding provider: the non-null text fields
    /// joined with single spaces, in catalog order.
    pub fn embedding_text(&self) -> String {
        let mut parts = vec![self.name.as_str()];
        if let Some(ref description) = self.description {
            parts.push(description);
        }
        if let Some(ref category) = self.category {
            parts.push(category);
        }
        parts.join(" ")
    }

    /// Percentage saved by taking the offer.
    ///
    /// The stated `discount_percentage` takes precedence over prices.
    /// Otherwise derived from `original_price`; an absent or zero
    /// original, or one not above the current price, yields 0.
    pub fn savings_percentage(&self) -> f64 {
        if let Some(discount) = self.discount_percentage {
            return discount;
        }

        match self.original_price {
            Some(original) if original > 0.0 => {
                (((original - self.current_price) / original) * 100.0).max(0.0)
            }
            _ => 0.0,
        }
    }

    /// Whether the pipeline still owes this offer a vector.
    pub fn needs_embedding(&self) -> bool {
        self.embedding.is_none()
    }
}
