//! # ragserve
//!
//! The ragserve application: configuration, the document ingest service, and
//! the HTTP API server. The `ragserve` binary wires these together; tests
//! drive them with fake pipeline stages.

pub mod config;
pub mod ingest;
pub mod server;

pub use config::Config;
pub use ingest::DocumentIngestor;
