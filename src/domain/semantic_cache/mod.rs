//! Semantic cache domain models and traits
//!
//! Previously answered queries are stored with their embeddings so that
//! paraphrased questions can be answered from the cache. The store only
//! ranks neighbours by distance; deciding whether a neighbour is close
//! enough to reuse belongs to the cache service.

mod config;
mod distance;
mod repository;

pub use config::SemanticCacheConfig;
pub use distance::DistanceMetric;
pub use repository::{
    CachedEntry, Neighbor, SemanticCache, SemanticCacheStats, SemanticSearchParams,
};

#[cfg(test)]
pub use repository::mock::FailingSemanticCache;
