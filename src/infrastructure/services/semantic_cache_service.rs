//! Semantic response caching service
//!
//! Answers previously given to semantically similar queries are reused
//! when the nearest stored query lies strictly closer than the configured
//! distance threshold. Every fault on this path fails closed: a lookup
//! that cannot be completed is a miss, and a write that cannot be
//! completed is logged and dropped.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::embedding::{EmbeddingProvider, EmbeddingRequest};
use crate::domain::query::Query;
use crate::domain::semantic_cache::{
    CachedEntry, SemanticCache, SemanticCacheConfig, SemanticCacheStats, SemanticSearchParams,
};
use crate::domain::DomainError;
use crate::infrastructure::observability::{
    record_cache_lookup, record_cache_write, CacheLookupResult,
};

/// A reusable cached answer
#[derive(Debug, Clone)]
pub struct CacheHit {
    pub entry_id: String,
    pub response: String,
    pub distance: f32,
}

/// Semantic cache service that uses embeddings for similarity matching
#[derive(Debug)]
pub struct SemanticCacheService {
    cache: Arc<dyn SemanticCache>,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    embedding_model: String,
    embedding_timeout: Duration,
    config: SemanticCacheConfig,
}

impl SemanticCacheService {
    /// Create a new semantic cache service
    pub fn new(
        cache: Arc<dyn SemanticCache>,
        embedding_provider: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        Self::with_config(cache, embedding_provider, SemanticCacheConfig::default())
    }

    /// Create a new semantic cache service with custom config
    pub fn with_config(
        cache: Arc<dyn SemanticCache>,
        embedding_provider: Arc<dyn EmbeddingProvider>,
        config: SemanticCacheConfig,
    ) -> Self {
        let embedding_model = embedding_provider.default_model().to_string();

        Self {
            cache,
            embedding_provider,
            embedding_model,
            embedding_timeout: Duration::from_secs(30),
            config,
        }
    }

    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    pub fn with_embedding_timeout(mut self, timeout: Duration) -> Self {
        self.embedding_timeout = timeout;
        self
    }

    /// Check if semantic caching is enabled
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Get the configuration
    pub fn config(&self) -> &SemanticCacheConfig {
        &self.config
    }

    /// Generate an embedding for the given text
    async fn generate_embedding(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        let request = EmbeddingRequest::single(&self.embedding_model, text);

        let response =
            tokio::time::timeout(self.embedding_timeout, self.embedding_provider.embed(request))
                .await
                .map_err(|_| DomainError::timeout("embedding", self.embedding_timeout.as_secs()))??;

        let vector = response
            .into_embeddings()
            .into_iter()
            .next()
            .map(|e| e.into_vector())
            .ok_or_else(|| DomainError::cache("No embedding returned"))?;

        if vector.is_empty() || vector.iter().any(|x| !x.is_finite()) {
            return Err(DomainError::cache("Embedding is empty or not finite"));
        }

        Ok(vector)
    }

    /// Find a cached answer for a semantically similar query.
    ///
    /// Returns a hit only when the nearest neighbour's distance is strictly
    /// below the threshold.
    pub async fn lookup(&self, query: &Query) -> Option<CacheHit> {
        if !self.config.enabled {
            return None;
        }

        match self.try_lookup(query).await {
            Ok(Some(hit)) => {
                record_cache_lookup(CacheLookupResult::Hit);
                Some(hit)
            }
            Ok(None) => {
                debug!("Semantic cache miss");
                record_cache_lookup(CacheLookupResult::Miss);
                None
            }
            Err(e) => {
                warn!(error = %e, "Semantic cache lookup failed, treating as miss");
                record_cache_lookup(CacheLookupResult::Error);
                self.record_miss().await;
                None
            }
        }
    }

    async fn try_lookup(&self, query: &Query) -> Result<Option<CacheHit>, DomainError> {
        let embedding = self.generate_embedding(query.as_str()).await?;
        let params = SemanticSearchParams::new(self.config.metric);

        let nearest = self.cache.nearest(&embedding, &params).await?;

        let Some(neighbor) = nearest else {
            self.record_miss().await;
            return Ok(None);
        };

        // NaN compares false, so a malformed distance is a miss too
        if !(neighbor.distance < self.config.distance_threshold) {
            debug!(
                distance = neighbor.distance,
                threshold = self.config.distance_threshold,
                "Nearest cached query too far"
            );
            self.record_miss().await;
            return Ok(None);
        }

        debug!(
            entry_id = %neighbor.entry.id(),
            matched_query = %neighbor.entry.query_text(),
            cached_at = %neighbor.entry.created_at(),
            distance = neighbor.distance,
            "Semantic cache hit"
        );

        if let Err(e) = self.cache.record_hit(neighbor.entry.id()).await {
            warn!(error = %e, "Failed to record semantic cache hit");
        }

        Ok(Some(CacheHit {
            entry_id: neighbor.entry.id().to_string(),
            response: neighbor.entry.response().to_string(),
            distance: neighbor.distance,
        }))
    }

    async fn record_miss(&self) {
        if let Err(e) = self.cache.record_miss().await {
            warn!(error = %e, "Failed to record semantic cache miss");
        }
    }

    /// Cache `response` for `query`; returns whether an entry was written
    pub async fn store(&self, query: &Query, response: &str) -> bool {
        if !self.config.enabled {
            return false;
        }

        match self.try_store(query, response).await {
            Ok(id) => {
                debug!(entry_id = %id, "Cached query response");
                record_cache_write();
                true
            }
            Err(e) => {
                warn!(error = %e, "Failed to cache query response");
                false
            }
        }
    }

    async fn try_store(&self, query: &Query, response: &str) -> Result<String, DomainError> {
        let embedding = self.generate_embedding(query.as_str()).await?;

        let entry_id = format!("sem:{}", Uuid::new_v4());
        let mut entry = CachedEntry::new(entry_id.clone(), embedding, query.as_str(), response);

        if let Some(ttl) = self.config.ttl() {
            entry = entry.with_ttl(ttl);
        }

        self.cache.store(entry).await?;

        Ok(entry_id)
    }

    /// Get cache statistics
    pub async fn stats(&self) -> Result<SemanticCacheStats, DomainError> {
        self.cache.stats().await
    }

    /// Clean up expired entries
    pub async fn cleanup(&self) -> Result<usize, DomainError> {
        self.cache.cleanup_expired().await
    }

    /// Persist buffered cache state
    pub async fn flush(&self) -> Result<(), DomainError> {
        self.cache.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::embedding::MockEmbeddingProvider;
    use crate::domain::semantic_cache::{DistanceMetric, FailingSemanticCache};
    use crate::infrastructure::semantic_cache::InMemorySemanticCache;

    fn query(text: &str) -> Query {
        Query::new(text).unwrap()
    }

    fn service_with(provider: MockEmbeddingProvider, config: SemanticCacheConfig) -> SemanticCacheService {
        SemanticCacheService::with_config(
            Arc::new(InMemorySemanticCache::new()),
            Arc::new(provider),
            config,
        )
    }

    /// "stored" sits at the origin; each probe text sits at a chosen squared-L2 distance
    fn geometry_provider() -> MockEmbeddingProvider {
        MockEmbeddingProvider::new("mock", 2)
            .with_vector("stored", vec![0.0, 0.0])
            .with_vector("near", vec![0.3, 0.0])
            .with_vector("boundary", vec![0.5f32.sqrt(), 0.0])
            .with_vector("far", vec![1.0, 0.0])
    }

    #[tokio::test]
    async fn test_store_then_lookup_same_text() {
        let service = service_with(MockEmbeddingProvider::new("mock", 16), SemanticCacheConfig::new());

        assert!(service.store(&query("What is the weather in London?"), "sunny").await);

        let hit = service.lookup(&query("What is the weather in London?")).await.unwrap();
        assert_eq!(hit.response, "sunny");
        assert!(hit.entry_id.starts_with("sem:"));
        assert_eq!(hit.distance, 0.0);
    }

    #[tokio::test]
    async fn test_empty_store_misses() {
        let service = service_with(MockEmbeddingProvider::new("mock", 16), SemanticCacheConfig::new());

        assert!(service.lookup(&query("anything at all")).await.is_none());
        assert_eq!(service.stats().await.unwrap().misses, 1);
    }

    #[tokio::test]
    async fn test_threshold_is_strict() {
        let config = SemanticCacheConfig::new()
            .with_distance_threshold(0.5)
            .with_metric(DistanceMetric::SquaredL2);
        let service = service_with(geometry_provider(), config);
        service.store(&query("stored"), "answer").await;

        assert!(service.lookup(&query("near")).await.is_some());
        assert!(service.lookup(&query("far")).await.is_none());

        let boundary = DistanceMetric::SquaredL2
            .distance(&[0.5f32.sqrt(), 0.0], &[0.0, 0.0])
            .unwrap();
        let strict = SemanticCacheConfig::new().with_distance_threshold(boundary);
        let service = service_with(geometry_provider(), strict);
        service.store(&query("stored"), "answer").await;

        assert!(service.lookup(&query("boundary")).await.is_none());
    }

    #[tokio::test]
    async fn test_embedding_failure_fails_closed() {
        let service = service_with(
            MockEmbeddingProvider::new("mock", 4).with_error("embedding service down"),
            SemanticCacheConfig::new(),
        );

        assert!(!service.store(&query("q"), "r").await);
        assert!(service.lookup(&query("q")).await.is_none());
    }

    #[tokio::test]
    async fn test_store_fault_fails_closed() {
        let store = Arc::new(FailingSemanticCache::new());
        let service = SemanticCacheService::new(
            store.clone(),
            Arc::new(MockEmbeddingProvider::new("mock", 4)),
        );

        assert!(service.lookup(&query("What is the weather in London?")).await.is_none());
        assert!(!service.store(&query("What is the weather in London?"), "sunny").await);
        assert_eq!(store.store_attempts(), 1);
        assert!(service.stats().await.is_err());
    }

    #[tokio::test]
    async fn test_non_finite_embedding_fails_closed() {
        let provider = MockEmbeddingProvider::new("mock", 2).with_vector("nan", vec![f32::NAN, 0.0]);
        let service = service_with(provider, SemanticCacheConfig::new());

        assert!(!service.store(&query("nan"), "r").await);
        assert!(service.lookup(&query("nan")).await.is_none());
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_miss() {
        let provider = MockEmbeddingProvider::new("mock", 2)
            .with_vector("two", vec![1.0, 0.0])
            .with_vector("three", vec![1.0, 0.0, 0.0]);
        let service = service_with(provider, SemanticCacheConfig::new());
        service.store(&query("two"), "r").await;

        assert!(service.lookup(&query("three")).await.is_none());
    }

    #[tokio::test]
    async fn test_disabled_cache_never_hits() {
        let service = service_with(
            MockEmbeddingProvider::new("mock", 4),
            SemanticCacheConfig::new().with_enabled(false),
        );

        assert!(!service.store(&query("q"), "r").await);
        assert!(service.lookup(&query("q")).await.is_none());
        assert_eq!(service.stats().await.unwrap().total_entries, 0);
    }

    #[tokio::test]
    async fn test_duplicate_stores_create_distinct_entries() {
        let service = service_with(MockEmbeddingProvider::new("mock", 4), SemanticCacheConfig::new());

        service.store(&query("q"), "first").await;
        service.store(&query("q"), "second").await;

        assert_eq!(service.stats().await.unwrap().total_entries, 2);
    }

    #[tokio::test]
    async fn test_ttl_applies_to_entries() {
        let service = service_with(
            MockEmbeddingProvider::new("mock", 4),
            SemanticCacheConfig::new().with_ttl(Some(Duration::ZERO)),
        );

        service.store(&query("q"), "r").await;

        assert!(service.lookup(&query("q")).await.is_none());
        assert_eq!(service.cleanup().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_hit_statistics() {
        let service = service_with(MockEmbeddingProvider::new("mock", 4), SemanticCacheConfig::new());
        service.store(&query("q"), "r").await;

        service.lookup(&query("q")).await;
        service.lookup(&query("q")).await;

        let stats = service.stats().await.unwrap();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.total_entries, 1);
    }
}
