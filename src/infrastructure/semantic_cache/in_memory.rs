//! In-memory semantic cache implementation

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::semantic_cache::{
    CachedEntry, Neighbor, SemanticCache, SemanticCacheStats, SemanticSearchParams,
};
use crate::domain::DomainError;

/// In-memory semantic cache using linear search
///
/// Entries are kept in insertion order, which makes "evict the oldest"
/// a pop from the front. Suitable for the small caches an interactive
/// session builds up; the file-backed store wraps this one.
#[derive(Debug, Default)]
pub struct InMemorySemanticCache {
    entries: RwLock<Vec<CachedEntry>>,
    max_entries: Option<usize>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl InMemorySemanticCache {
    /// Create an unbounded in-memory semantic cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache holding at most `max_entries` entries
    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            max_entries: Some(max_entries),
            ..Default::default()
        }
    }

    /// Seed the cache with previously persisted entries (oldest first).
    ///
    /// Returns the cache and the number of entries dropped to honour
    /// `max_entries`.
    pub(crate) fn from_entries(
        entries: Vec<CachedEntry>,
        max_entries: Option<usize>,
    ) -> (Self, usize) {
        let cache = Self {
            entries: RwLock::new(entries),
            max_entries,
            ..Default::default()
        };

        let evicted = match cache.entries.write() {
            Ok(mut entries) => cache.evict_overflow(&mut entries, 0),
            Err(_) => 0,
        };

        (cache, evicted)
    }

    /// Insert an entry, returning how many old entries were evicted
    pub(crate) fn insert(&self, entry: CachedEntry) -> Result<usize, DomainError> {
        let mut entries = self.entries.write().map_err(|e| {
            DomainError::internal(format!("Failed to acquire write lock: {}", e))
        })?;

        let evicted = self.evict_overflow(&mut entries, 1);
        entries.push(entry);

        Ok(evicted)
    }

    /// Copy of all entries, oldest first
    pub(crate) fn snapshot(&self) -> Result<Vec<CachedEntry>, DomainError> {
        let entries = self.entries.read().map_err(|e| {
            DomainError::internal(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(entries.clone())
    }

    /// Evict oldest entries until `incoming` more fit under the limit
    fn evict_overflow(&self, entries: &mut Vec<CachedEntry>, incoming: usize) -> usize {
        let Some(max) = self.max_entries else {
            return 0;
        };

        let allowed = max.saturating_sub(incoming);
        if entries.len() <= allowed {
            return 0;
        }

        let overflow = entries.len() - allowed;
        entries.drain(..overflow);
        self.evictions.fetch_add(overflow as u64, Ordering::Relaxed);

        overflow
    }
}

#[async_trait]
impl SemanticCache for InMemorySemanticCache {
    async fn search(
        &self,
        embedding: &[f32],
        params: &SemanticSearchParams,
    ) -> Result<Vec<Neighbor>, DomainError> {
        let entries = self.entries.read().map_err(|e| {
            DomainError::internal(format!("Failed to acquire read lock: {}", e))
        })?;

        // Rank by reference; only the returned neighbours are cloned
        let mut ranked: Vec<(&CachedEntry, f32)> = entries
            .iter()
            .filter(|entry| !entry.is_expired())
            .filter_map(|entry| {
                params
                    .metric
                    .distance(embedding, entry.embedding())
                    .map(|distance| (entry, distance))
            })
            .collect();

        // Closest first; ties keep insertion order
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1));

        Ok(ranked
            .into_iter()
            .take(params.limit)
            .map(|(entry, distance)| Neighbor::new(entry.clone(), distance))
            .collect())
    }

    async fn store(&self, entry: CachedEntry) -> Result<(), DomainError> {
        self.insert(entry)?;
        Ok(())
    }

    async fn stats(&self) -> Result<SemanticCacheStats, DomainError> {
        let entries = self.entries.read().map_err(|e| {
            DomainError::internal(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(SemanticCacheStats {
            total_entries: entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        })
    }

    async fn record_hit(&self, id: &str) -> Result<(), DomainError> {
        self.hits.fetch_add(1, Ordering::Relaxed);

        let mut entries = self.entries.write().map_err(|e| {
            DomainError::internal(format!("Failed to acquire write lock: {}", e))
        })?;

        if let Some(entry) = entries.iter_mut().find(|e| e.id() == id) {
            entry.increment_hits();
        }

        Ok(())
    }

    async fn record_miss(&self) -> Result<(), DomainError> {
        self.misses.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn cleanup_expired(&self) -> Result<usize, DomainError> {
        let mut entries = self.entries.write().map_err(|e| {
            DomainError::internal(format!("Failed to acquire write lock: {}", e))
        })?;

        let before = entries.len();
        entries.retain(|e| !e.is_expired());
        let removed = before - entries.len();

        self.evictions.fetch_add(removed as u64, Ordering::Relaxed);

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::semantic_cache::DistanceMetric;
    use std::time::Duration;

    fn entry(id: &str, embedding: Vec<f32>) -> CachedEntry {
        CachedEntry::new(id, embedding, format!("query {}", id), format!("answer {}", id))
    }

    fn ids(cache: &InMemorySemanticCache) -> Vec<String> {
        cache
            .snapshot()
            .unwrap()
            .iter()
            .map(|e| e.id().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_search_empty_cache_returns_nothing() {
        let cache = InMemorySemanticCache::new();
        let results = cache
            .search(&[1.0, 0.0], &SemanticSearchParams::default())
            .await
            .unwrap();

        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_search_ranks_closest_first() {
        let cache = InMemorySemanticCache::new();
        cache.store(entry("far", vec![0.0, 1.0])).await.unwrap();
        cache.store(entry("near", vec![0.9, 0.1])).await.unwrap();
        cache.store(entry("exact", vec![1.0, 0.0])).await.unwrap();

        let params = SemanticSearchParams::new(DistanceMetric::SquaredL2).with_limit(3);
        let results = cache.search(&[1.0, 0.0], &params).await.unwrap();

        let ids: Vec<&str> = results.iter().map(|n| n.entry.id()).collect();
        assert_eq!(ids, vec!["exact", "near", "far"]);
        assert_eq!(results[0].distance, 0.0);
    }

    #[tokio::test]
    async fn test_nearest_returns_single_neighbor() {
        let cache = InMemorySemanticCache::new();
        cache.store(entry("a", vec![1.0, 0.0])).await.unwrap();
        cache.store(entry("b", vec![0.0, 1.0])).await.unwrap();

        let nearest = cache
            .nearest(&[0.0, 1.0], &SemanticSearchParams::default())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(nearest.entry.id(), "b");
    }

    #[tokio::test]
    async fn test_search_returns_at_most_limit_with_ties_in_insertion_order() {
        let cache = InMemorySemanticCache::new();
        for id in ["first", "second", "third", "fourth"] {
            cache.store(entry(id, vec![0.5, 0.5])).await.unwrap();
        }

        let params = SemanticSearchParams::new(DistanceMetric::SquaredL2).with_limit(2);
        let results = cache.search(&[0.5, 0.5], &params).await.unwrap();

        let ids: Vec<&str> = results.iter().map(|n| n.entry.id()).collect();
        assert_eq!(ids, vec!["first", "second"]);

        let nearest = cache
            .nearest(&[0.5, 0.5], &SemanticSearchParams::default())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(nearest.entry.id(), "first");
    }

    #[tokio::test]
    async fn test_search_skips_mismatched_dimensions() {
        let cache = InMemorySemanticCache::new();
        cache.store(entry("old-model", vec![1.0, 0.0, 0.0])).await.unwrap();

        let results = cache
            .search(&[1.0, 0.0], &SemanticSearchParams::default())
            .await
            .unwrap();

        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_max_entries_evicts_oldest() {
        let cache = InMemorySemanticCache::with_max_entries(2);
        cache.store(entry("1", vec![1.0])).await.unwrap();
        cache.store(entry("2", vec![2.0])).await.unwrap();
        cache.store(entry("3", vec![3.0])).await.unwrap();

        assert_eq!(ids(&cache), vec!["2", "3"]);
        assert_eq!(cache.stats().await.unwrap().evictions, 1);
    }

    #[tokio::test]
    async fn test_expired_entries_are_invisible_and_cleaned() {
        let cache = InMemorySemanticCache::new();
        cache
            .store(entry("stale", vec![1.0, 0.0]).with_ttl(Duration::ZERO))
            .await
            .unwrap();
        cache.store(entry("fresh", vec![0.0, 1.0])).await.unwrap();

        let results = cache
            .search(&[1.0, 0.0], &SemanticSearchParams::default().with_limit(5))
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].entry.id(), "fresh");

        assert_eq!(cache.cleanup_expired().await.unwrap(), 1);
        assert_eq!(ids(&cache), vec!["fresh"]);
    }

    #[tokio::test]
    async fn test_hit_and_miss_tracking() {
        let cache = InMemorySemanticCache::new();
        cache.store(entry("a", vec![1.0])).await.unwrap();

        cache.record_hit("a").await.unwrap();
        cache.record_hit("a").await.unwrap();
        cache.record_miss().await.unwrap();

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert_eq!(cache.snapshot().unwrap()[0].hit_count(), 2);
    }

    #[test]
    fn test_from_entries_trims_to_limit() {
        let seeded = vec![entry("1", vec![1.0]), entry("2", vec![2.0]), entry("3", vec![3.0])];
        let (cache, evicted) = InMemorySemanticCache::from_entries(seeded, Some(2));

        assert_eq!(evicted, 1);
        assert_eq!(ids(&cache), vec!["2", "3"]);
    }
}
