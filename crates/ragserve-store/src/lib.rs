//! Vector storage for ragserve.
//!
//! Implements the [`VectorStore`](ragserve_core::VectorStore) seam twice:
//!
//! - [`LanceStore`]: disk-backed storage on LanceDB, one table per
//!   configured collection name
//! - [`MemoryStore`]: brute-force in-memory store for tests and development
//!
//! Both report distance with the same orientation: smaller = closer.

pub mod lancedb;
pub mod memory;

pub use crate::lancedb::LanceStore;
pub use memory::MemoryStore;
