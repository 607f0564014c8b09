//! Offline embedding backend using signed feature hashing over lowercase word tokens.
//!
//! Vectors are L2-normalized, so cosine similarity reduces to shared-vocabulary
//! overlap. Deterministic across processes and platforms.

use async_trait::async_trait;

use super::{EmbeddingError, EmbeddingProvider};

pub const DEFAULT_DIMENSION: usize = 384;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

pub struct HashingEmbeddingProvider {
    dimension: usize,
    model_id: String,
}

impl HashingEmbeddingProvider {
    pub fn new(dimension: usize) -> Self {
        let dimension = dimension.max(1);
        Self {
            dimension,
            model_id: format!("hashing-{dimension}"),
        }
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0_f32; self.dimension];

        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let hash = fnv1a(&token.to_lowercase());
            let bucket = (hash % self.dimension as u64) as usize;
            let sign = if hash >> 63 == 1 { -1.0 } else { 1.0 };
            vector[bucket] += sign;
        }

        // no word tokens: nothing to compare against
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm == 0.0 {
            return Vec::new();
        }
        vector.iter_mut().for_each(|v| *v /= norm);
        vector
    }
}

impl Default for HashingEmbeddingProvider {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSION)
    }
}

fn fnv1a(token: &str) -> u64 {
    token.bytes().fold(FNV_OFFSET, |hash, byte| {
        (hash ^ byte as u64).wrapping_mul(FNV_PRIME)
    })
}

#[async_trait]
impl EmbeddingProvider for HashingEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.vectorize(text))
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn dimension(&self) -> Option<usize> {
        Some(self.dimension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::similarity::cosine_similarity;

    #[tokio::test]
    async fn test_empty_text_yields_empty_vector() {
        let provider = HashingEmbeddingProvider::default();
        assert!(provider.embed("").await.unwrap().is_empty());
        assert!(provider.embed("   ").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_punctuation_only_text_yields_empty_vector() {
        let provider = HashingEmbeddingProvider::default();
        assert!(provider.embed("!!! --- ...").await.unwrap().is_empty());
        assert!(provider.embed("•").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fixed_dimension_and_unit_norm() {
        let provider = HashingEmbeddingProvider::new(64);
        let vector = provider.embed("Rust systems engineer").await.unwrap();
        assert_eq!(vector.len(), 64);
        assert_eq!(provider.dimension(), Some(64));
        let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5, "norm was {norm}");
    }

    #[tokio::test]
    async fn test_deterministic_and_case_insensitive() {
        let provider = HashingEmbeddingProvider::default();
        let a = provider.embed("Machine Learning Engineer").await.unwrap();
        let b = provider.embed("machine learning engineer").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_overlap_scores_higher_than_unrelated() {
        let provider = HashingEmbeddingProvider::default();
        let query = provider.embed("python machine learning").await.unwrap();
        let related = provider
            .embed("experienced in python and machine learning pipelines")
            .await
            .unwrap();
        let unrelated = provider.embed("pastry chef bakery").await.unwrap();
        assert!(cosine_similarity(&query, &related) > cosine_similarity(&query, &unrelated));
    }
}
