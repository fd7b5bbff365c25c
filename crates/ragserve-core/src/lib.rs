//! # ragserve-core
//!
//! Shared types, trait seams, and the error taxonomy for ragserve.
//!
//! Every pipeline stage is defined here as a trait so that backends can be
//! swapped without touching the rest of the system:
//!
//! - [`ContentExtractor`]: turn an uploaded file into raw text
//! - [`Chunker`]: split text into overlapping windows
//! - [`Embedder`]: turn text into a fixed-length vector
//! - [`TextGenerator`]: turn a prompt into generated text
//! - [`VectorStore`]: persist embedded chunks and search them by distance

pub mod error;
pub mod traits;
pub mod types;

pub use error::{ChunkError, Error, ExtractError, LlmError, Result, StoreError};
pub use traits::{Chunker, ContentExtractor, Embedder, TextGenerator, VectorStore};
pub use types::{
    ChatRole, ChatTurn, Chunk, ChunkConfig, ChunkMetadata, ChunkOutput, ExtractedContent,
    GenerationOptions, SearchResult,
};
