use async_trait::async_trait;
use pgvector::Vector;
use sqlx::Row;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use std::time::Duration;
use uuid::Uuid;

use super::OfferStore;
use crate::error::StoreError;
use crate::models::{HybridMatch, Offer, PageWindow, SearchWeights, StoreConfig};

/// Postgres + pgvector backend.
///
/// The hybrid ranking lives in the database as the
/// `hybrid_search_offers` SQL function; this backend forwards the query
/// text, query vector and weights and maps the returned rows.
pub struct PgOfferStore {
    pool: PgPool,
}

impl PgOfferStore {
    pub async fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let url = config
            .url
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| StoreError::ConnectionError("store URL not configured".to_string()))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.pool_max)
            .acquire_timeout(Duration::from_secs(config.pool_acquire_timeout_secs))
            .connect(url)
            .await
            .map_err(|e| StoreError::ConnectionError(e.to_string()))?;

        let store = Self { pool };
        store.check_pgvector_extension().await?;
        Ok(store)
    }

    async fn check_pgvector_extension(&self) -> Result<(), StoreError> {
        let result: Option<(String,)> =
            sqlx::query_as("SELECT extname FROM pg_extension WHERE extname = 'vector'")
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| StoreError::QueryError(e.to_string()))?;

        if result.is_none() {
            return Err(StoreError::ConnectionError(
                "pgvector extension is not installed. Run: CREATE EXTENSION vector;".to_string(),
            ));
        }

        Ok(())
    }

    fn offer_from_row(row: &PgRow) -> Offer {
        let embedding: Option<Vector> = row.get("embedding");
        Offer {
            id: row.get("id"),
            name: row.get("name"),
            description: row.get("description"),
            category: row.get("category"),
            store_name: row.get("store_name"),
            current_price: row.get("current_price"),
            original_price: row.get("original_price"),
            discount_percentage: row.get("discount_percentage"),
            valid_from: row.get("valid_from"),
            valid_until: row.get("valid_until"),
            embedding: embedding.map(|v| v.to_vec()),
        }
    }
}

const OFFER_COLUMNS: &str = "id, name, description, category, store_name, current_price, \
     original_price, discount_percentage, valid_from, valid_until, embedding";

#[async_trait]
impl OfferStore for PgOfferStore {
    async fn fetch_unembedded(&self) -> Result<Vec<Offer>, StoreError> {
        let query = format!(
            "SELECT {} FROM offers WHERE embedding IS NULL ORDER BY id",
            OFFER_COLUMNS
        );

        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::QueryError(e.to_string()))?;

        Ok(rows.iter().map(Self::offer_from_row).collect())
    }

    async fn write_embedding(&self, id: Uuid, embedding: &[f32]) -> Result<(), StoreError> {
        let vector = Vector::from(embedding.to_vec());

        let result = sqlx::query("UPDATE offers SET embedding = $2 WHERE id = $1")
            .bind(id)
            .bind(&vector)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::WriteError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::WriteError(format!("no offer with id {}", id)));
        }

        Ok(())
    }

    async fn hybrid_search(
        &self,
        query_text: &str,
        query_vector: &[f32],
        limit: u32,
        weights: SearchWeights,
    ) -> Result<Vec<HybridMatch>, StoreError> {
        let vector = Vector::from(query_vector.to_vec());

        let rows = sqlx::query(
            "SELECT * FROM hybrid_search_offers($1, $2, $3, $4, $5) \
             ORDER BY combined_rank DESC",
        )
        .bind(query_text)
        .bind(&vector)
        .bind(limit as i64)
        .bind(weights.lexical)
        .bind(weights.semantic)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::SearchError(e.to_string()))?;

        let matches = rows
            .iter()
            .map(|row| HybridMatch {
                offer: Self::offer_from_row(row),
                lexical_score: row.get("lexical_score"),
                semantic_score: row.get("semantic_score"),
                similarity: row.get("similarity"),
                combined_rank: row.get("combined_rank"),
            })
            .collect();

        Ok(matches)
    }

    async fn fetch_window(&self, window: PageWindow) -> Result<(Vec<Offer>, u64), StoreError> {
        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM offers")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::QueryError(e.to_string()))?;

        let query = format!(
            "SELECT {} FROM offers ORDER BY id LIMIT $1 OFFSET $2",
            OFFER_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(i64::from(window.page_size))
            .bind(window.from as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::QueryError(e.to_string()))?;

        Ok((
            rows.iter().map(Self::offer_from_row).collect(),
            total.0 as u64,
        ))
    }
}
