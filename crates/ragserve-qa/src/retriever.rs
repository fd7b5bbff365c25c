//! Query-side retrieval: embed the question, search the store.

use ragserve_core::{Embedder, Error, SearchResult, VectorStore};
use std::sync::Arc;
use tracing::debug;

/// Retriever over a vector store and an embedder.
pub struct Retriever {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    default_k: usize,
}

impl Retriever {
    /// Create a new retriever with a default result count.
    pub fn new(store: Arc<dyn VectorStore>, embedder: Arc<dyn Embedder>, default_k: usize) -> Self {
        Self {
            store,
            embedder,
            default_k,
        }
    }

    /// The configured default result count.
    #[must_use]
    pub fn default_k(&self) -> usize {
        self.default_k
    }

    /// Retrieve the nearest chunks for `query`, closest first.
    ///
    /// `k` overrides the configured default for this call.
    pub async fn retrieve(&self, query: &str, k: Option<usize>) -> Result<Vec<SearchResult>, Error> {
        let k = k.unwrap_or(self.default_k);
        debug!("retrieving top {} for query ({} chars)", k, query.chars().count());

        let embedding = self.embedder.embed(query).await?;
        let results = self.store.search(&embedding, k).await?;

        debug!("retrieved {} chunks", results.len());
        Ok(results)
    }
}
