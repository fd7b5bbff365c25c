//! Trait seams between the pipeline stages.
//!
//! - [`ContentExtractor`]: extract text from uploaded files
//! - [`Chunker`]: split text into overlapping windows
//! - [`Embedder`]: generate vector embeddings
//! - [`TextGenerator`]: generate text from a prompt
//! - [`VectorStore`]: store and search embedded chunks
//!
//! Handlers and chains hold `Arc<dyn ...>` values of these traits, so tests
//! can substitute deterministic fakes for the network-backed implementations.

use async_trait::async_trait;
use std::path::Path;

use crate::error::{ChunkError, ExtractError, LlmError, StoreError};
use crate::types::{Chunk, ChunkConfig, ChunkOutput, ExtractedContent, GenerationOptions, SearchResult};

// ============================================================================
// Content Extraction
// ============================================================================

/// Trait for extracting text content from files.
#[async_trait]
pub trait ContentExtractor: Send + Sync {
    /// File extensions this extractor handles (lowercase, without the dot).
    fn supported_extensions(&self) -> &[&str];

    /// Check if this extractor can handle the given file.
    fn can_extract(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.supported_extensions()
                    .contains(&ext.to_lowercase().as_str())
            })
    }

    /// Extract content from a file on disk.
    async fn extract(&self, path: &Path) -> Result<ExtractedContent, ExtractError>;
}

// ============================================================================
// Chunking
// ============================================================================

/// Trait for splitting text into chunks.
#[async_trait]
pub trait Chunker: Send + Sync {
    /// Name of this chunking strategy.
    fn name(&self) -> &str;

    /// Split `text` into windows per `config`.
    async fn chunk(&self, text: &str, config: &ChunkConfig) -> Result<Vec<ChunkOutput>, ChunkError>;
}

// ============================================================================
// Embedding
// ============================================================================

/// Trait for generating embeddings.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Model name/identifier.
    fn model_name(&self) -> &str;

    /// Embedding dimension.
    fn dimension(&self) -> usize;

    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError>;

    /// Embed a batch of texts.
    ///
    /// The default implementation embeds serially; the model server is the
    /// throughput bottleneck either way.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, LlmError> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }
}

// ============================================================================
// Generation
// ============================================================================

/// Trait for prompt-in, text-out generation.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Model name/identifier.
    fn model_name(&self) -> &str;

    /// Generate a completion for `prompt`.
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, LlmError>;
}

// ============================================================================
// Vector Storage
// ============================================================================

/// Trait for vector storage and similarity search.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Initialize the store (create the backing table if needed).
    async fn init(&self) -> Result<(), StoreError>;

    /// Append embedded chunks to the collection.
    async fn add_chunks(&self, chunks: &[Chunk]) -> Result<(), StoreError>;

    /// Return the `k` nearest chunks to `embedding`, closest first.
    async fn search(&self, embedding: &[f32], k: usize) -> Result<Vec<SearchResult>, StoreError>;

    /// Number of chunks in the collection.
    ///
    /// Read failures are reported as 0, not as an error. This is a status
    /// query; an unreadable index and an empty index look the same to callers.
    async fn count(&self) -> u64;

    /// Irreversibly remove every chunk in the collection.
    async fn delete_all(&self) -> Result<(), StoreError>;
}
