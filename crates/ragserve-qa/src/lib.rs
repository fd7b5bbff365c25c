//! # ragserve-qa
//!
//! Question answering over the retrieval pipeline.
//!
//! - [`Retriever`]: embeds a query and searches the vector store
//! - [`PromptTemplate`]: the fixed RAG prompt (context block + question)
//! - [`QaChain`]: retrieve → format prompt → generate → answer with sources
//! - [`ChatChain`]: direct generation with a short history window, no
//!   retrieval

pub mod chain;
pub mod prompt;
pub mod retriever;

pub use chain::{Answer, ChatChain, QaChain};
pub use prompt::{format_context, PromptTemplate};
pub use retriever::Retriever;
