//! Embedding provider interface and HTTP client.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ProviderError;
use crate::models::{EMBEDDING_DIM, ProviderConfig};

/// Capability interface for vectorizing text.
///
/// The pipeline and ranker depend on this trait rather than a concrete
/// SDK, so tests substitute an in-memory fake.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Vectorize one text. May fail per-call (network, quota); callers
    /// treat a failure as retryable-by-rerun, not fatal.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError>;

    /// Fixed output dimensionality of this provider's model.
    fn dimension(&self) -> usize {
        EMBEDDING_DIM
    }
}

/// Request body for the /embed endpoint.
#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    input: &'a str,
    model: &'a str,
}

/// Response from the /embed endpoint.
#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

/// HTTP client for a hosted embedding endpoint.
#[derive(Debug, Clone)]
pub struct HttpEmbeddingProvider {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl HttpEmbeddingProvider {
    /// Create a provider from configuration. Missing credentials are a
    /// startup error; nothing runs partially configured.
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                ProviderError::ConnectionError("provider API key not configured".to_string())
            })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::ConnectionError(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        let url = format!("{}/embed", self.base_url);
        let request = EmbedRequest {
            input: text,
            model: &self.model,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout
                } else {
                    ProviderError::RequestError(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ServerError(format!(
                "status {}: {}",
                status, body
            )));
        }

        let embed_response: EmbedResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        if embed_response.embedding.len() != EMBEDDING_DIM {
            return Err(ProviderError::DimensionMismatch {
                expected: EMBEDDING_DIM,
                actual: embed_response.embedding.len(),
            });
        }

        Ok(embed_response.embedding)
    }
}
