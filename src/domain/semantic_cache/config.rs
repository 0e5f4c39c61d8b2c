//! Semantic cache configuration

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::DistanceMetric;

/// Configuration for semantic caching
///
/// Retention is explicit: with `max_entries` and `ttl_secs` unset the cache
/// grows without bound and entries live as long as the backing file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticCacheConfig {
    /// Whether semantic caching is enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Backing JSON Lines file; `None` keeps the cache in memory only
    #[serde(default = "default_path")]
    pub path: Option<PathBuf>,

    /// Maximum distance (exclusive) at which a cached answer is reused.
    /// Lower values are stricter.
    #[serde(default = "default_distance_threshold")]
    pub distance_threshold: f32,

    /// Distance metric the threshold is expressed in
    #[serde(default)]
    pub metric: DistanceMetric,

    /// Maximum number of entries; oldest entries are evicted beyond it
    #[serde(default)]
    pub max_entries: Option<usize>,

    /// Time-to-live for cached entries in seconds
    #[serde(default)]
    pub ttl_secs: Option<u64>,

    /// Also refuse to cache answers whose text contains "Error" or "Sorry"
    #[serde(default)]
    pub legacy_marker_gate: bool,
}

fn default_enabled() -> bool {
    true
}

fn default_path() -> Option<PathBuf> {
    Some(PathBuf::from("./semantic_cache/agent_cache.jsonl"))
}

fn default_distance_threshold() -> f32 {
    0.5
}

impl Default for SemanticCacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            path: default_path(),
            distance_threshold: default_distance_threshold(),
            metric: DistanceMetric::default(),
            max_entries: None,
            ttl_secs: None,
            legacy_marker_gate: false,
        }
    }
}

impl SemanticCacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get TTL as Duration
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_secs.map(Duration::from_secs)
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_path(mut self, path: Option<PathBuf>) -> Self {
        self.path = path;
        self
    }

    /// Set the distance threshold; negative values are clamped to zero
    pub fn with_distance_threshold(mut self, threshold: f32) -> Self {
        self.distance_threshold = threshold.max(0.0);
        self
    }

    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_max_entries(mut self, max: Option<usize>) -> Self {
        self.max_entries = max;
        self
    }

    pub fn with_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.ttl_secs = ttl.map(|t| t.as_secs());
        self
    }

    pub fn with_legacy_marker_gate(mut self, enabled: bool) -> Self {
        self.legacy_marker_gate = enabled;
        self
    }
}
