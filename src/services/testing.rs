//! In-memory fakes for the provider and store capability interfaces.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{ProviderError, StoreError};
use crate::models::{EMBEDDING_DIM, HybridMatch, Offer, PageWindow, SearchWeights};
use crate::services::provider::EmbeddingProvider;
use crate::services::store::OfferStore;

/// Deterministic provider; configured texts fail with a server error.
#[derive(Default)]
pub struct FakeProvider {
    failing_texts: HashSet<String>,
    pub calls: AtomicUsize,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(texts: &[&str]) -> Self {
        Self {
            failing_texts: texts.iter().map(|t| t.to_string()).collect(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for FakeProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_texts.iter().any(|t| text.contains(t.as_str())) {
            return Err(ProviderError::ServerError("quota exceeded".to_string()));
        }
        // Any fixed-dimension vector will do for the fakes.
        Ok(vec![0.1; EMBEDDING_DIM])
    }
}

/// In-memory store with canned hybrid-search results.
#[derive(Default)]
pub struct MemoryStore {
    pub offers: Mutex<Vec<Offer>>,
    pub embeddings: Mutex<HashMap<Uuid, Vec<f32>>>,
    pub canned_matches: Mutex<Vec<HybridMatch>>,
}

impl MemoryStore {
    pub fn with_offers(offers: Vec<Offer>) -> Self {
        Self {
            offers: Mutex::new(offers),
            ..Default::default()
        }
    }

    pub fn set_matches(&self, matches: Vec<HybridMatch>) {
        *self.canned_matches.lock().unwrap() = matches;
    }

    pub fn embedding_for(&self, id: Uuid) -> Option<Vec<f32>> {
        self.embeddings.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl OfferStore for MemoryStore {
    async fn fetch_unembedded(&self) -> Result<Vec<Offer>, StoreError> {
        let embedded = self.embeddings.lock().unwrap();
        Ok(self
            .offers
            .lock()
            .unwrap()
            .iter()
            .filter(|o| o.embedding.is_none() && !embedded.contains_key(&o.id))
            .cloned()
            .collect())
    }

    async fn write_embedding(&self, id: Uuid, embedding: &[f32]) -> Result<(), StoreError> {
        self.embeddings
            .lock()
            .unwrap()
            .insert(id, embedding.to_vec());
        Ok(())
    }

    async fn hybrid_search(
        &self,
        _query_text: &str,
        _query_vector: &[f32],
        limit: u32,
        _weights: SearchWeights,
    ) -> Result<Vec<HybridMatch>, StoreError> {
        let matches = self.canned_matches.lock().unwrap();
        Ok(matches.iter().take(limit as usize).cloned().collect())
    }

    async fn fetch_window(&self, window: PageWindow) -> Result<(Vec<Offer>, u64), StoreError> {
        let offers = self.offers.lock().unwrap();
        let total = offers.len() as u64;
        let rows = offers
            .iter()
            .skip(window.from as usize)
            .take(window.page_size as usize)
            .cloned()
            .collect();
        Ok((rows, total))
    }
}

/// Minimal offer for tests.
pub fn test_offer(name: &str, store: &str) -> Offer {
    Offer {
        id: Uuid::new_v4(),
        name: name.to_string(),
        description: None,
        category: None,
        store_name: store.to_string(),
        current_price: 8.0,
        original_price: Some(10.0),
        discount_percentage: None,
        valid_from: None,
        valid_until: None,
        embedding: None,
    }
}
