mod config;
mod offer;
mod page;
mod search;

pub use config::{
    BatchConfig, Config, DEFAULT_EMBEDDING_MODEL, DEFAULT_PROVIDER_URL, PipelineConfig,
    ProviderConfig, SearchConfig, StoreConfig,
};
pub use offer::{EMBEDDING_DIM, Offer};
pub use page::PageWindow;
pub use search::{HybridMatch, ItemRecommendations, QueryItem, Recommendation, SearchWeights};
