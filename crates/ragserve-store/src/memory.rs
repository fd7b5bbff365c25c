//! In-memory store for testing without LanceDB.

use async_trait::async_trait;
use ragserve_core::{Chunk, SearchResult, StoreError, VectorStore};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// In-memory vector store.
///
/// Keeps chunks in a map and searches by brute-force cosine distance. Not
/// persistent; the standard test double for the storage seam.
pub struct MemoryStore {
    chunks: Arc<RwLock<HashMap<Uuid, Chunk>>>,
}

impl MemoryStore {
    /// Create an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            chunks: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Cosine distance between two vectors (0 = identical direction).
    fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() {
            return f32::MAX;
        }

        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            return f32::MAX;
        }

        1.0 - dot / (norm_a * norm_b)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for MemoryStore {
    async fn init(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn add_chunks(&self, chunks: &[Chunk]) -> Result<(), StoreError> {
        let mut store = self.chunks.write().await;
        for chunk in chunks {
            if chunk.embedding.is_none() {
                return Err(StoreError::Insert(format!(
                    "chunk {} has no embedding",
                    chunk.id
                )));
            }
            store.insert(chunk.id, chunk.clone());
        }
        debug!("added {} chunks ({} total)", chunks.len(), store.len());
        Ok(())
    }

    async fn search(&self, embedding: &[f32], k: usize) -> Result<Vec<SearchResult>, StoreError> {
        let chunks = self.chunks.read().await;
        let mut scored: Vec<(f32, &Chunk)> = chunks
            .values()
            .filter_map(|chunk| {
                chunk
                    .embedding
                    .as_ref()
                    .map(|e| (Self::cosine_distance(embedding, e), chunk))
            })
            .collect();

        // Smaller distance first
        scored.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(distance, chunk)| SearchResult {
                chunk_id: chunk.id,
                source: chunk.source.clone(),
                chunk_index: chunk.chunk_index,
                content: chunk.content.clone(),
                distance,
            })
            .collect())
    }

    async fn count(&self) -> u64 {
        self.chunks.read().await.len() as u64
    }

    async fn delete_all(&self) -> Result<(), StoreError> {
        let mut chunks = self.chunks.write().await;
        let removed = chunks.len();
        chunks.clear();
        debug!("deleted all {} chunks", removed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragserve_core::ChunkMetadata;

    fn chunk(source: &str, index: u32, content: &str, embedding: Vec<f32>) -> Chunk {
        Chunk {
            id: Uuid::new_v4(),
            source: source.to_string(),
            chunk_index: index,
            content: content.to_string(),
            char_range: 0..content.chars().count(),
            embedding: Some(embedding),
            metadata: ChunkMetadata::default(),
        }
    }

    #[tokio::test]
    async fn test_new_store_is_empty() {
        let store = MemoryStore::new();
        store.init().await.unwrap();
        assert_eq!(store.count().await, 0);
    }

    #[tokio::test]
    async fn test_add_increases_count() {
        let store = MemoryStore::new();
        store
            .add_chunks(&[
                chunk("a.txt", 0, "first", vec![1.0, 0.0]),
                chunk("a.txt", 1, "second", vec![0.0, 1.0]),
            ])
            .await
            .unwrap();
        assert_eq!(store.count().await, 2);
    }

    #[tokio::test]
    async fn test_add_rejects_unembedded_chunk() {
        let store = MemoryStore::new();
        let mut c = chunk("a.txt", 0, "text", vec![1.0]);
        c.embedding = None;
        let result = store.add_chunks(&[c]).await;
        assert!(matches!(result, Err(StoreError::Insert(_))));
    }

    #[tokio::test]
    async fn test_search_orders_by_distance_ascending() {
        let store = MemoryStore::new();
        store
            .add_chunks(&[
                chunk("a.txt", 0, "exact", vec![1.0, 0.0]),
                chunk("a.txt", 1, "orthogonal", vec![0.0, 1.0]),
                chunk("a.txt", 2, "opposite", vec![-1.0, 0.0]),
            ])
            .await
            .unwrap();

        let results = store.search(&[1.0, 0.0], 3).await.unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].content, "exact");
        assert_eq!(results[1].content, "orthogonal");
        assert_eq!(results[2].content, "opposite");
        assert!(results[0].distance < results[1].distance);
        assert!(results[1].distance < results[2].distance);
    }

    #[tokio::test]
    async fn test_search_respects_k() {
        let store = MemoryStore::new();
        store
            .add_chunks(&[
                chunk("a.txt", 0, "one", vec![1.0, 0.0]),
                chunk("a.txt", 1, "two", vec![0.9, 0.1]),
                chunk("a.txt", 2, "three", vec![0.0, 1.0]),
            ])
            .await
            .unwrap();

        let results = store.search(&[1.0, 0.0], 2).await.unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_search_empty_store_returns_nothing() {
        let store = MemoryStore::new();
        let results = store.search(&[1.0, 0.0], 5).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_delete_all_clears_collection() {
        let store = MemoryStore::new();
        store
            .add_chunks(&[chunk("a.txt", 0, "text", vec![1.0, 0.0])])
            .await
            .unwrap();
        assert_eq!(store.count().await, 1);

        store.delete_all().await.unwrap();
        assert_eq!(store.count().await, 0);
        assert!(store.search(&[1.0, 0.0], 5).await.unwrap().is_empty());
    }

    #[test]
    fn test_cosine_distance_identical_is_zero() {
        let d = MemoryStore::cosine_distance(&[0.5, 0.5], &[0.5, 0.5]);
        assert!(d.abs() < 1e-6);
    }

    #[test]
    fn test_cosine_distance_orthogonal_is_one() {
        let d = MemoryStore::cosine_distance(&[1.0, 0.0], &[0.0, 1.0]);
        assert!((d - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_distance_mismatched_lengths() {
        let d = MemoryStore::cosine_distance(&[1.0], &[1.0, 0.0]);
        assert_eq!(d, f32::MAX);
    }

    #[test]
    fn test_cosine_distance_zero_vector() {
        let d = MemoryStore::cosine_distance(&[0.0, 0.0], &[1.0, 0.0]);
        assert_eq!(d, f32::MAX);
    }
}
