//! The embedding service port: the opaque model-hosting boundary.
//!
//! `EmbeddingService` is the only contact point with model hosting
//! internals (ONNX/Python runtimes, local or remote). Implementations must
//! be idempotent and side-effect free: calling `embed_batch` twice with the
//! same input yields the same vectors up to floating-point epsilon.

use crate::domain::error::Result;
use crate::domain::types::ModelCapabilities;
use async_trait::async_trait;

/// Transforms text into semantic embedding vectors.
///
/// Implementations do not apply model-specific prefixes or normalization
/// themselves — that is the Embedding Worker Pool's responsibility, driven
/// by [`ModelCapabilities`] returned from [`EmbeddingService::capabilities`].
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    /// Embed a single piece of already-prefixed, already-batched-as-one text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of already-prefixed text in one call. The returned
    /// vector has the same length and order as `texts`.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Output vector dimensionality.
    fn dimensions(&self) -> usize;

    /// Capabilities describing prefixing/normalization/extraction strategy
    /// requirements for this model.
    fn capabilities(&self) -> ModelCapabilities;

    /// Health check for the provider. Default implementation performs a
    /// trivial embed call.
    async fn health_check(&self) -> Result<()> {
        self.embed("health check").await?;
        Ok(())
    }
}
