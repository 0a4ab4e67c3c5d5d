use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::search::SearchWeights;

pub const DEFAULT_PROVIDER_URL: &str = "http://localhost:11411";
pub const DEFAULT_EMBEDDING_MODEL: &str = "gte-small";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub batch: BatchConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub search: SearchConfig,
}

impl Config {
    pub fn config_path() -> Option<std::path::PathBuf> {
        dirs::config_dir().map(|p| p.join("offermatch").join("config.toml"))
    }

    /// Load from the platform config dir, falling back to defaults, then
    /// overlay credentials from the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = Self::config_path()
            && path.exists()
        {
            let content = std::fs::read_to_string(&path)?;
            toml::from_str::<Config>(&content)?
        } else {
            Self::default()
        };

        config.apply_env();
        Ok(config)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::config_path().ok_or_else(|| {
            ConfigError::PathError("could not determine config directory".to_string())
        })?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Environment wins over the file so deployments can inject
    /// credentials without editing config.toml.
    fn apply_env(&mut self) {
        dotenvy::dotenv().ok();

        if let Ok(key) = std::env::var("OFFERMATCH_PROVIDER_API_KEY") {
            self.provider.api_key = Some(key);
        }
        if let Ok(url) = std::env::var("OFFERMATCH_PROVIDER_URL") {
            self.provider.url = url;
        }
        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.store.url = Some(url);
        }
    }

    /// Fail fast on missing credentials; a partially configured core
    /// must not start.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.provider.api_key.as_deref().unwrap_or("").is_empty() {
            return Err(ConfigError::MissingCredentials(
                "provider API key not set (OFFERMATCH_PROVIDER_API_KEY)".to_string(),
            ));
        }
        if self.store.url.as_deref().unwrap_or("").is_empty() {
            return Err(ConfigError::MissingCredentials(
                "store URL not set (DATABASE_URL)".to_string(),
            ));
        }
        if self.batch.batch_size == 0 {
            return Err(ConfigError::ValidationError(
                "batch.batch_size must be at least 1".to_string(),
            ));
        }
        if self.pipeline.concurrency == 0 {
            return Err(ConfigError::ValidationError(
                "pipeline.concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_provider_url")]
    pub url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_provider_url() -> String {
    DEFAULT_PROVIDER_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_EMBEDDING_MODEL.to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            url: default_provider_url(),
            model: default_model(),
            api_key: None,
            timeout_secs: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Postgres connection URL; usually injected via DATABASE_URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default = "default_pool_max")]
    pub pool_max: u32,

    #[serde(default = "default_acquire_timeout")]
    pub pool_acquire_timeout_secs: u64,
}

fn default_pool_max() -> u32 {
    5
}

fn default_acquire_timeout() -> u64 {
    10
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: None,
            pool_max: default_pool_max(),
            pool_acquire_timeout_secs: default_acquire_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Queue length that triggers an immediate flush.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Idle time after the first queued item before a flush.
    #[serde(default = "default_batch_timeout_ms")]
    pub batch_timeout_ms: u64,
}

fn default_batch_size() -> usize {
    10
}

fn default_batch_timeout_ms() -> u64 {
    100
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            batch_timeout_ms: default_batch_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Records per progress chunk; no correctness semantics.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Max in-flight provider calls.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Pause between chunks to respect provider rate limits.
    #[serde(default = "default_chunk_delay_ms")]
    pub chunk_delay_ms: u64,
}

fn default_chunk_size() -> usize {
    100
}

fn default_concurrency() -> usize {
    5
}

fn default_chunk_delay_ms() -> u64 {
    1000
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            concurrency: default_concurrency(),
            chunk_delay_ms: default_chunk_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Result-count cap passed to the store's ranking function.
    #[serde(default = "default_limit")]
    pub limit: u32,

    /// Relevance floor; candidates at or below it are dropped.
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,

    #[serde(default)]
    pub weights: SearchWeights,
}

fn default_limit() -> u32 {
    30
}

fn default_similarity_threshold() -> f32 {
    0.3
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            similarity_threshold: default_similarity_threshold(),
            weights: SearchWeights::default(),
        }
    }
}
