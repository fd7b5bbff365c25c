//! Core types for ragserve.
//!
//! ## Content
//! - [`ExtractedContent`]: raw text pulled out of an uploaded file
//! - [`Chunk`]: a stored span of document text with its embedding
//! - [`ChunkConfig`] / [`ChunkOutput`]: chunking parameters and results
//!
//! ## Search
//! - [`SearchResult`]: a matching chunk with its distance to the query
//!
//! ## Generation
//! - [`GenerationOptions`]: sampling parameters passed to the model server
//! - [`ChatTurn`] / [`ChatRole`]: one exchange of the chat history window

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use uuid::Uuid;

// ============================================================================
// Extraction
// ============================================================================

/// Text content extracted from an uploaded file.
#[derive(Debug, Clone)]
pub struct ExtractedContent {
    /// The full text of the document
    pub text: String,
    /// Page count, when the source format has pages
    pub page_count: Option<u32>,
}

impl ExtractedContent {
    /// Content with no page structure (plain text, markdown).
    #[must_use]
    pub fn text_only(text: String) -> Self {
        Self {
            text,
            page_count: None,
        }
    }
}

// ============================================================================
// Chunks
// ============================================================================

/// A chunk of document text stored in the collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique chunk identifier
    pub id: Uuid,
    /// Source file name the chunk was cut from
    pub source: String,
    /// Position of this chunk within its source (0-indexed)
    pub chunk_index: u32,
    /// The chunk text
    pub content: String,
    /// Character range in the extracted source text
    pub char_range: Range<usize>,
    /// Embedding vector, once computed
    pub embedding: Option<Vec<f32>>,
    /// Additional metadata
    pub metadata: ChunkMetadata,
}

/// Metadata recorded alongside a chunk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Embedding model used
    pub embedding_model: Option<String>,
    /// When the chunk was ingested
    pub ingested_at: Option<DateTime<Utc>>,
}

/// Configuration for chunking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkConfig {
    /// Maximum chunk size in characters
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Output from a chunker, before identity and embedding are attached.
#[derive(Debug, Clone)]
pub struct ChunkOutput {
    /// Chunk text
    pub content: String,
    /// Character range in the source text
    pub char_range: Range<usize>,
}

// ============================================================================
// Search
// ============================================================================

/// A search result: a stored chunk with its distance to the query.
///
/// Distance orientation is "smaller is closer" for every backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Chunk identifier
    pub chunk_id: Uuid,
    /// Source file name
    pub source: String,
    /// Position of the chunk within its source
    pub chunk_index: u32,
    /// The chunk text
    pub content: String,
    /// Distance to the query embedding (smaller = closer)
    pub distance: f32,
}

// ============================================================================
// Generation
// ============================================================================

/// Sampling parameters for text generation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum number of tokens to generate
    pub max_tokens: u32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 2000,
        }
    }
}

/// Speaker of one chat history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One entry of the chat history sent by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    /// Who spoke
    pub role: ChatRole,
    /// What was said
    pub content: String,
}
