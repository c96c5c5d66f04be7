//! A deterministic, dependency-free [`EmbeddingService`] used as the
//! default for tests and for folders configured without a real model
//! hosting backend. ONNX/Python model hosting is out of scope for this
//! crate (spec §1); this is the "opaque" implementation that exercises the
//! pipeline end to end.
//!
//! Embeddings are bag-of-words hashes: each token is hashed into a fixed
//! number of buckets with [`seahash`], so texts sharing vocabulary land
//! closer together under cosine similarity than unrelated texts. This is
//! enough to drive the filename-boost and hybrid-keyword scenarios in
//! tests without depending on a real model.

use crate::domain::chunking::tokenizer::tokenize;
use crate::domain::error::Result;
use crate::domain::ports::embedding::EmbeddingService;
use crate::domain::types::{ExtractionStrategy, ModelCapabilities, PrefixFormat};
use async_trait::async_trait;

/// Deterministic hash-based embedding service.
#[derive(Debug, Clone)]
pub struct NullEmbeddingService {
    dimensions: usize,
    capabilities: ModelCapabilities,
}

impl NullEmbeddingService {
    /// Build a null service producing `dimensions`-wide vectors with the
    /// rich extraction strategy and no prefix/normalization requirements.
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            capabilities: ModelCapabilities {
                model_id: "null-hash-embedding".to_string(),
                requires_prefix: false,
                prefix_format: PrefixFormat::default(),
                requires_normalization: false,
                extraction_strategy: ExtractionStrategy::Rich,
            },
        }
    }

    /// Build a null service whose capabilities mimic an E5-family model:
    /// query/passage prefixes required, L2 normalization required,
    /// similarity-only extraction. Used by prefix/normalization tests.
    pub fn e5_like(dimensions: usize) -> Self {
        Self {
            dimensions,
            capabilities: ModelCapabilities {
                model_id: "intfloat/e5-small-v2".to_string(),
                requires_prefix: true,
                prefix_format: PrefixFormat {
                    query: "query: ".to_string(),
                    passage: "passage: ".to_string(),
                },
                requires_normalization: true,
                extraction_strategy: ExtractionStrategy::SimilarityOnly,
            },
        }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return vector;
        }
        for token in &tokens {
            let lower = token.to_lowercase();
            if !lower.chars().any(|c| c.is_alphanumeric()) {
                continue;
            }
            let hash = seahash::hash(lower.as_bytes());
            let bucket = (hash as usize) % self.dimensions;
            let sign = if (hash >> 63) & 1 == 1 { -1.0 } else { 1.0 };
            vector[bucket] += sign;
        }
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

#[async_trait]
impl EmbeddingService for NullEmbeddingService {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_one(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn capabilities(&self) -> ModelCapabilities {
        self.capabilities.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn shared_vocabulary_is_more_similar_than_unrelated_text() {
        let service = NullEmbeddingService::new(64);
        let a = service.embed("vector search index folder watcher").await.unwrap();
        let b = service
            .embed("vector search index chunk semantics")
            .await
            .unwrap();
        let c = service.embed("banana sandwich recipe weekend").await.unwrap();

        let cos = |x: &[f32], y: &[f32]| -> f32 {
            x.iter().zip(y).map(|(p, q)| p * q).sum()
        };
        assert!(cos(&a, &b) > cos(&a, &c));
    }

    #[tokio::test]
    async fn embedding_is_idempotent() {
        let service = NullEmbeddingService::new(32);
        let first = service.embed("idempotent text").await.unwrap();
        let second = service.embed("idempotent text").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn vectors_are_l2_normalized() {
        let service = NullEmbeddingService::new(16);
        let v = service.embed("some reasonably long piece of text").await.unwrap();
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4 || norm == 0.0);
    }
}
