//! Semantic cache trait and types

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::DistanceMetric;
use crate::domain::DomainError;

/// A cached query/response pair
///
/// Entries are never mutated after creation apart from their hit counter;
/// identity is the generated `id`, so near-identical queries may each own
/// an entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedEntry {
    id: String,
    embedding: Vec<f32>,
    query_text: String,
    response: String,
    created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    hit_count: u32,
}

impl CachedEntry {
    pub fn new(
        id: impl Into<String>,
        embedding: Vec<f32>,
        query_text: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            embedding,
            query_text: query_text.into(),
            response: response.into(),
            created_at: Utc::now(),
            expires_at: None,
            hit_count: 0,
        }
    }

    /// Expire the entry `ttl` after its creation
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| self.created_at.checked_add_signed(ttl));
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn embedding(&self) -> &[f32] {
        &self.embedding
    }

    pub fn query_text(&self) -> &str {
        &self.query_text
    }

    pub fn response(&self) -> &str {
        &self.response
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn hit_count(&self) -> u32 {
        self.hit_count
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Utc::now() >= at)
    }

    pub fn increment_hits(&mut self) {
        self.hit_count = self.hit_count.saturating_add(1);
    }
}

/// A ranked neighbour returned by a cache search
#[derive(Debug, Clone)]
pub struct Neighbor {
    pub entry: CachedEntry,
    /// Distance to the query embedding (lower = more similar)
    pub distance: f32,
}

impl Neighbor {
    pub fn new(entry: CachedEntry, distance: f32) -> Self {
        Self { entry, distance }
    }
}

/// Statistics for the semantic cache
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SemanticCacheStats {
    pub total_entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl SemanticCacheStats {
    pub fn hit_rate(&self) -> f32 {
        let total = self.hits + self.misses;

        if total == 0 {
            return 0.0;
        }

        self.hits as f32 / total as f32
    }
}

/// Search parameters for a nearest-neighbour lookup
#[derive(Debug, Clone)]
pub struct SemanticSearchParams {
    pub metric: DistanceMetric,
    pub limit: usize,
}

impl Default for SemanticSearchParams {
    fn default() -> Self {
        Self {
            metric: DistanceMetric::default(),
            limit: 1,
        }
    }
}

impl SemanticSearchParams {
    pub fn new(metric: DistanceMetric) -> Self {
        Self {
            metric,
            ..Default::default()
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// Nearest-neighbour text store backing the semantic cache
#[async_trait]
pub trait SemanticCache: Send + Sync + Debug {
    /// Rank live entries by distance to `embedding`, closest first.
    ///
    /// Entries whose embedding cannot be compared with the query are skipped.
    async fn search(
        &self,
        embedding: &[f32],
        params: &SemanticSearchParams,
    ) -> Result<Vec<Neighbor>, DomainError>;

    /// Find the single closest entry
    async fn nearest(
        &self,
        embedding: &[f32],
        params: &SemanticSearchParams,
    ) -> Result<Option<Neighbor>, DomainError> {
        let params = params.clone().with_limit(1);
        let results = self.search(embedding, &params).await?;
        Ok(results.into_iter().next())
    }

    /// Append a new entry
    async fn store(&self, entry: CachedEntry) -> Result<(), DomainError>;

    /// Get cache statistics
    async fn stats(&self) -> Result<SemanticCacheStats, DomainError>;

    /// Record a cache hit
    async fn record_hit(&self, id: &str) -> Result<(), DomainError>;

    /// Record a cache miss
    async fn record_miss(&self) -> Result<(), DomainError>;

    /// Remove expired entries, returning how many were removed
    async fn cleanup_expired(&self) -> Result<usize, DomainError>;

    /// Persist any buffered state
    async fn flush(&self) -> Result<(), DomainError> {
        Ok(())
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Store whose every operation fails, as an unreachable index would
    #[derive(Debug, Default)]
    pub struct FailingSemanticCache {
        store_attempts: AtomicUsize,
        flush_attempts: AtomicUsize,
    }

    impl FailingSemanticCache {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn store_attempts(&self) -> usize {
            self.store_attempts.load(Ordering::SeqCst)
        }

        pub fn flush_attempts(&self) -> usize {
            self.flush_attempts.load(Ordering::SeqCst)
        }

        fn fault() -> DomainError {
            DomainError::storage("cache index unreachable")
        }
    }

    #[async_trait]
    impl SemanticCache for FailingSemanticCache {
        async fn search(
            &self,
            _embedding: &[f32],
            _params: &SemanticSearchParams,
        ) -> Result<Vec<Neighbor>, DomainError> {
            Err(Self::fault())
        }

        async fn store(&self, _entry: CachedEntry) -> Result<(), DomainError> {
            self.store_attempts.fetch_add(1, Ordering::SeqCst);
            Err(Self::fault())
        }

        async fn stats(&self) -> Result<SemanticCacheStats, DomainError> {
            Err(Self::fault())
        }

        async fn record_hit(&self, _id: &str) -> Result<(), DomainError> {
            Err(Self::fault())
        }

        async fn record_miss(&self) -> Result<(), DomainError> {
            Err(Self::fault())
        }

        async fn cleanup_expired(&self) -> Result<usize, DomainError> {
            Err(Self::fault())
        }

        async fn flush(&self) -> Result<(), DomainError> {
            self.flush_attempts.fetch_add(1, Ordering::SeqCst);
            Err(Self::fault())
        }
    }
}
