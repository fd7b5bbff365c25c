//! # ragserve-extract
//!
//! Content extraction for the ragserve ingestion pipeline.
//!
//! Uploaded files are routed by extension to an extractor that produces
//! [`ExtractedContent`](ragserve_core::ExtractedContent) for downstream
//! chunking and embedding.
//!
//! | Extractor | Formats |
//! |-----------|---------|
//! | [`TextExtractor`] | `.txt`, `.md` (UTF-8 text) |
//! | [`PdfExtractor`] | `.pdf` (text layer via `pdf-extract`) |
//!
//! Any other extension is rejected by the [`ExtractorRegistry`] with
//! [`ExtractError::UnsupportedType`](ragserve_core::ExtractError) before the
//! file is read.

pub mod pdf;
pub mod registry;
pub mod text;

pub use pdf::PdfExtractor;
pub use registry::ExtractorRegistry;
pub use text::TextExtractor;
