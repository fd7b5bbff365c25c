//! Error types for ragserve.
//!
//! The taxonomy distinguishes user-correctable validation failures (bad file
//! extension, empty question) from upstream failures (model server
//! unreachable, storage unreadable). The HTTP layer maps the former to
//! 400-class and the latter to 500-class responses.

use thiserror::Error;

/// Main error type for ragserve operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Content extraction failed
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractError),

    /// Chunking failed
    #[error("chunking error: {0}")]
    Chunking(#[from] ChunkError),

    /// Model server call failed
    #[error("llm error: {0}")]
    Llm(#[from] LlmError),

    /// Vector store operation failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Request validation failed (user-correctable)
    #[error("{0}")]
    Validation(String),

    /// I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),
}

impl Error {
    /// Whether this error is caused by user input and should map to a
    /// 400-class response.
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Error::Validation(_) | Error::Extraction(ExtractError::UnsupportedType(_))
        )
    }
}

/// Content extraction errors.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("unsupported file type: {0}. Only PDF, TXT and MD files are accepted")]
    UnsupportedType(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Chunking errors.
#[derive(Error, Debug)]
pub enum ChunkError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Model server (embedding + generation) errors.
///
/// All variants are upstream/connectivity failures, never user errors.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("model server unreachable: {0}")]
    Connection(String),

    #[error("model server returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed model server response: {0}")]
    MalformedResponse(String),
}

/// Vector store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store initialization failed: {0}")]
    Init(String),

    #[error("insert failed: {0}")]
    Insert(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("delete failed: {0}")]
    Delete(String),
}

/// Result type alias for ragserve operations.
pub type Result<T> = std::result::Result<T, Error>;
