//! Local feature-hashing embedding provider
//!
//! Needs no network or credentials. Each content word is hashed into a
//! fixed-size signed bag-of-words vector, and the sorted set of content
//! words is hashed into one more "signature" feature carrying as much
//! weight as all the words together. The result is L2-normalized.
//!
//! Queries with the same content words ("What is the weather in London?" /
//! "weather London") embed identically. A query that adds or drops a content
//! word ("London" / "London tomorrow", "York" / "New York") loses the shared
//! signature and lands at a squared L2 distance above 1.0, so it can never
//! be served the other's cached answer. The word features still rank
//! partial overlaps ahead of unrelated entries.
//!
//! The hash is SHA-256 based and therefore stable across processes, which
//! matters because vectors are persisted with the cache.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use unicode_segmentation::UnicodeSegmentation;

use crate::domain::embedding::{Embedding, EmbeddingProvider, EmbeddingRequest, EmbeddingResponse};
use crate::domain::DomainError;

pub const DEFAULT_DIMENSIONS: usize = 256;

const MODEL_NAME: &str = "feature-hashing-v2";

const SIGNATURE_PREFIX: &str = "\u{1}signature:";

const STOP_WORDS: &[&str] = &[
    "a", "about", "an", "and", "any", "are", "at", "can", "could", "do", "does", "for", "give",
    "how", "i", "in", "is", "it", "like", "me", "of", "on", "please", "show", "tell", "the",
    "to", "what", "what's", "whats", "you",
];

/// Deterministic, offline embedding provider
#[derive(Debug, Clone)]
pub struct HashingEmbeddingProvider {
    dimensions: usize,
}

impl HashingEmbeddingProvider {
    pub fn new(dimensions: usize) -> Result<Self, DomainError> {
        if dimensions == 0 {
            return Err(DomainError::configuration(
                "Hashing embedding dimensions must be greater than zero",
            ));
        }

        Ok(Self { dimensions })
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn tokens(text: &str) -> Vec<String> {
        let words: Vec<String> = text.unicode_words().map(|w| w.to_lowercase()).collect();
        let content: Vec<String> = words
            .iter()
            .filter(|w| !STOP_WORDS.contains(&w.as_str()))
            .cloned()
            .collect();

        if content.is_empty() { words } else { content }
    }

    fn bucket(&self, feature: &str) -> (usize, f32) {
        let digest = Sha256::digest(feature.as_bytes());
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        let hash = u64::from_le_bytes(bytes);

        let index = (hash % self.dimensions as u64) as usize;
        let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
        (index, sign)
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut tokens = Self::tokens(text);
        let mut vector = vec![0.0f32; self.dimensions];

        for token in &tokens {
            let (index, sign) = self.bucket(token);
            vector[index] += sign;
        }

        let word_norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();

        tokens.sort();
        tokens.dedup();
        let (index, sign) = self.bucket(&format!("{}{}", SIGNATURE_PREFIX, tokens.join(" ")));
        vector[index] += sign * word_norm;

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }

        vector
    }
}

impl Default for HashingEmbeddingProvider {
    fn default() -> Self {
        Self {
            dimensions: DEFAULT_DIMENSIONS,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for HashingEmbeddingProvider {
    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, DomainError> {
        let embeddings = request
            .inputs()
            .iter()
            .enumerate()
            .map(|(idx, text)| Embedding::new(idx, self.embed_text(text)))
            .collect();

        Ok(EmbeddingResponse::new(MODEL_NAME.to_string(), embeddings))
    }

    fn provider_name(&self) -> &'static str {
        "hashing"
    }

    fn default_model(&self) -> &'static str {
        MODEL_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::semantic_cache::DistanceMetric;

    async fn embed(provider: &HashingEmbeddingProvider, text: &str) -> Vec<f32> {
        provider
            .embed(EmbeddingRequest::single(MODEL_NAME, text))
            .await
            .unwrap()
            .into_embeddings()
            .remove(0)
            .into_vector()
    }

    #[tokio::test]
    async fn test_vectors_are_unit_length() {
        let provider = HashingEmbeddingProvider::default();
        let vector = embed(&provider, "What is the weather in London?").await;

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert_eq!(vector.len(), DEFAULT_DIMENSIONS);
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_paraphrase_with_same_content_words_is_identical() {
        let provider = HashingEmbeddingProvider::default();
        let a = embed(&provider, "What is the weather in London?").await;
        let b = embed(&provider, "weather London").await;

        assert_eq!(DistanceMetric::SquaredL2.distance(&a, &b), Some(0.0));
    }

    #[tokio::test]
    async fn test_different_city_is_not_within_default_threshold() {
        let provider = HashingEmbeddingProvider::default();
        let a = embed(&provider, "What is the weather in London?").await;
        let b = embed(&provider, "What is the weather in Paris?").await;

        let distance = DistanceMetric::SquaredL2.distance(&a, &b).unwrap();
        assert!(distance >= 0.5, "distance was {}", distance);
    }

    #[tokio::test]
    async fn test_added_or_dropped_word_is_not_within_default_threshold() {
        let provider = HashingEmbeddingProvider::default();
        let pairs = [
            ("What is the weather in New York?", "What is the weather in York?"),
            ("What is the weather in London?", "What is the weather in London tomorrow?"),
            ("Tell me news about AI", "Tell me news about AI regulation"),
        ];

        for (first, second) in pairs {
            let a = embed(&provider, first).await;
            let b = embed(&provider, second).await;

            let distance = DistanceMetric::SquaredL2.distance(&a, &b).unwrap();
            assert!(distance >= 0.5, "{:?} vs {:?}: distance was {}", first, second, distance);
        }
    }

    #[tokio::test]
    async fn test_word_order_does_not_matter() {
        let provider = HashingEmbeddingProvider::default();
        let a = embed(&provider, "London weather").await;
        let b = embed(&provider, "weather in London").await;

        let distance = DistanceMetric::SquaredL2.distance(&a, &b).unwrap();
        assert!(distance < 1e-6, "distance was {}", distance);
    }

    #[tokio::test]
    async fn test_partial_overlap_ranks_closer_than_unrelated() {
        let provider = HashingEmbeddingProvider::default();
        let query = embed(&provider, "weather London tomorrow").await;
        let related = embed(&provider, "weather London").await;
        let unrelated = embed(&provider, "news about football").await;

        let near = DistanceMetric::SquaredL2.distance(&query, &related).unwrap();
        let far = DistanceMetric::SquaredL2.distance(&query, &unrelated).unwrap();
        assert!(near < far, "near {} far {}", near, far);
    }

    #[tokio::test]
    async fn test_stop_words_only_still_embeds() {
        let provider = HashingEmbeddingProvider::default();
        let vector = embed(&provider, "what is it").await;

        assert!(vector.iter().any(|x| *x != 0.0));
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(HashingEmbeddingProvider::new(0).is_err());
        assert_eq!(HashingEmbeddingProvider::new(64).unwrap().dimensions(), 64);
    }
}
