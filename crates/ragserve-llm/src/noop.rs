//! No-op embedder for development and tests.

use async_trait::async_trait;
use ragserve_core::{Embedder, LlmError};

/// Embedder that returns zero-vectors without touching the network.
///
/// Useful for exercising the ingest and storage paths when no model server is
/// running. Every input embeds to the same vector, so similarity ordering is
/// meaningless with this embedder.
pub struct NoopEmbedder {
    dimension: usize,
}

impl NoopEmbedder {
    /// Create a no-op embedder with the given dimension.
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

#[async_trait]
impl Embedder for NoopEmbedder {
    fn model_name(&self) -> &str {
        "noop"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>, LlmError> {
        Ok(vec![0.0; self.dimension])
    }
}
