//! Text chunking for the ragserve ingestion pipeline.

pub mod recursive;

pub use recursive::RecursiveChunker;
