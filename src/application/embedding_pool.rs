//! Embedding Worker Pool (§4.5): applies model-specific prefix and
//! normalization transforms around the opaque [`EmbeddingService`], batches
//! requests, and bounds concurrency with a semaphore sized from
//! `workers * threads_per_worker`.
//!
//! Mirrors the teacher's actor-style worker pools in spirit (a fixed number
//! of concurrent slots consuming bounded work) without the teacher's
//! message-passing machinery, since each call here is already a single
//! bounded async operation rather than a long-lived actor loop.

use crate::domain::constants::{
    DEFAULT_EMBEDDING_BATCH_SIZE, DEFAULT_EMBEDDING_THREADS_PER_WORKER, DEFAULT_EMBEDDING_WORKERS,
    MAX_RETRY_ATTEMPTS, RETRY_BASE_DELAY,
};
use crate::domain::error::{Error, Result};
use crate::domain::ports::embedding::EmbeddingService;
use crate::domain::types::{Embedding, ModelCapabilities};
use crate::infrastructure::resilience::retry_with_backoff;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::instrument;

/// Bounded pool fronting an [`EmbeddingService`], applying the transforms
/// and concurrency/retry policy of §4.5.
pub struct EmbeddingWorkerPool {
    service: Arc<dyn EmbeddingService>,
    semaphore: Arc<Semaphore>,
    batch_size: usize,
}

impl EmbeddingWorkerPool {
    /// Build a pool with explicit concurrency knobs, as spec §4.5 requires
    /// implementations to expose.
    pub fn new(
        service: Arc<dyn EmbeddingService>,
        workers: usize,
        threads_per_worker: usize,
        batch_size: usize,
    ) -> Self {
        Self {
            service,
            semaphore: Arc::new(Semaphore::new((workers * threads_per_worker).max(1))),
            batch_size: batch_size.max(1),
        }
    }

    /// Build a pool using the spec's measured-sweet-spot defaults: 2
    /// workers x 2 intra-worker threads, batch size 1.
    pub fn with_defaults(service: Arc<dyn EmbeddingService>) -> Self {
        Self::new(
            service,
            DEFAULT_EMBEDDING_WORKERS,
            DEFAULT_EMBEDDING_THREADS_PER_WORKER,
            DEFAULT_EMBEDDING_BATCH_SIZE,
        )
    }

    /// This pool's model capabilities, as reported by the underlying service.
    pub fn capabilities(&self) -> ModelCapabilities {
        self.service.capabilities()
    }

    /// The underlying service, for callers (the Chunk Semantic Extractor's
    /// similarity-only strategy) that need to embed small candidate batches
    /// directly rather than through this pool's prefix/normalization policy.
    pub fn raw_service(&self) -> &dyn EmbeddingService {
        self.service.as_ref()
    }

    /// Embed passages (indexed content), applying the passage prefix and
    /// normalization per the model's capabilities. Batches internally at
    /// the configured batch size; each item's outcome is reported
    /// independently so a persistent batch failure doesn't lose successful
    /// siblings processed in earlier batches.
    #[instrument(skip(self, texts), fields(count = texts.len()))]
    pub async fn embed_passages(&self, texts: &[String]) -> Vec<Result<Embedding>> {
        let capabilities = self.capabilities();
        let mut results = Vec::with_capacity(texts.len());

        for batch in texts.chunks(self.batch_size) {
            let prefixed: Vec<String> = batch
                .iter()
                .map(|t| apply_prefix(&capabilities, t, false))
                .collect();

            let permit = self.semaphore.acquire().await;
            let outcome = retry_with_backoff(
                MAX_RETRY_ATTEMPTS,
                RETRY_BASE_DELAY,
                "embedding_batch",
                || {
                    let service = self.service.clone();
                    let prefixed = prefixed.clone();
                    async move { service.embed_batch(&prefixed).await }
                },
            )
            .await;
            drop(permit);

            match outcome {
                Ok(vectors) => {
                    for vector in vectors {
                        results.push(Ok(finish_embedding(&capabilities, vector)));
                    }
                }
                Err(err) => {
                    let message = err.to_string();
                    for _ in batch {
                        results.push(Err(Error::embedding_failed(message.clone())));
                    }
                }
            }
        }

        results
    }

    /// Embed a single retrieval query, applying the query prefix and
    /// normalization so the query lands in the same vector space as the
    /// index (spec §4.5's "E5 consistency" contract).
    #[instrument(skip(self, text))]
    pub async fn embed_query(&self, text: &str) -> Result<Embedding> {
        let capabilities = self.capabilities();
        let prefixed = apply_prefix(&capabilities, text, true);
        let permit = self.semaphore.acquire().await;
        let vector = retry_with_backoff(
            MAX_RETRY_ATTEMPTS,
            RETRY_BASE_DELAY,
            "embedding_query",
            || {
                let service = self.service.clone();
                let prefixed = prefixed.clone();
                async move { service.embed(&prefixed).await }
            },
        )
        .await
        .map_err(|e| Error::embedding_failed(e.to_string()))?;
        drop(permit);
        Ok(finish_embedding(&capabilities, vector))
    }
}

fn apply_prefix(capabilities: &ModelCapabilities, text: &str, is_query: bool) -> String {
    if !capabilities.requires_prefix {
        return text.to_string();
    }
    let prefix = if is_query {
        &capabilities.prefix_format.query
    } else {
        &capabilities.prefix_format.passage
    };
    format!("{prefix}{text}")
}

fn finish_embedding(capabilities: &ModelCapabilities, mut vector: Vec<f32>) -> Embedding {
    if capabilities.requires_normalization {
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for v in &mut vector {
                *v /= norm;
            }
        }
    }
    Embedding {
        dimensions: vector.len(),
        vector,
        model: capabilities.model_id.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::providers::embedding::null::NullEmbeddingService;

    #[tokio::test]
    async fn embed_passages_returns_one_result_per_input() {
        let pool = EmbeddingWorkerPool::with_defaults(Arc::new(NullEmbeddingService::new(16)));
        let texts = vec!["alpha".to_string(), "beta".to_string(), "gamma".to_string()];
        let results = pool.embed_passages(&texts).await;
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.is_ok()));
    }

    #[tokio::test]
    async fn query_and_passage_share_vector_space_for_prefixed_models() {
        let pool = EmbeddingWorkerPool::with_defaults(Arc::new(NullEmbeddingService::e5_like(32)));
        let query = pool.embed_query("budget report").await.unwrap();
        let passages = pool
            .embed_passages(&["budget report".to_string()])
            .await;
        let passage = passages.into_iter().next().unwrap().unwrap();
        // Different prefixes (query: vs passage:) but both normalized and
        // in the same space, so cosine similarity should still be high for
        // identical underlying text.
        assert!(query.cosine_similarity(&passage) > 0.3);
        let norm: f32 = query.vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-3);
    }

    #[tokio::test]
    async fn embedding_is_idempotent_for_same_query() {
        let pool = EmbeddingWorkerPool::with_defaults(Arc::new(NullEmbeddingService::e5_like(16)));
        let first = pool.embed_query("repeatable query").await.unwrap();
        let second = pool.embed_query("repeatable query").await.unwrap();
        assert_eq!(first.vector, second.vector);
    }
}
