//! Embedding distance metrics

use serde::{Deserialize, Serialize};

use crate::domain::embedding::cosine_similarity;

/// Distance function used to rank cached entries (lower = more similar)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Sum of squared component differences
    #[default]
    SquaredL2,
    /// 1 - cosine similarity
    Cosine,
}

impl DistanceMetric {
    /// Distance between two vectors.
    ///
    /// `None` when the vectors cannot be compared (empty, different
    /// dimensions, or a non-finite result).
    pub fn distance(&self, a: &[f32], b: &[f32]) -> Option<f32> {
        if a.is_empty() || a.len() != b.len() {
            return None;
        }

        let distance = match self {
            DistanceMetric::SquaredL2 => a
                .iter()
                .zip(b.iter())
                .map(|(x, y)| (x - y) * (x - y))
                .sum::<f32>(),
            DistanceMetric::Cosine => 1.0 - cosine_similarity(a, b),
        };

        distance.is_finite().then_some(distance)
    }
}

impl std::fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DistanceMetric::SquaredL2 => write!(f, "squared_l2"),
            DistanceMetric::Cosine => write!(f, "cosine"),
        }
    }
}
