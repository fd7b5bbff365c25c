//! LanceDB implementation of `VectorStore`.

use arrow_array::types::Float32Type;
use arrow_array::{
    Array, ArrayRef, FixedSizeListArray, Float32Array, RecordBatch, RecordBatchIterator,
    StringArray, UInt32Array, UInt64Array,
};
use arrow_schema::{DataType, Field, Schema};
use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{connect, Connection, Table};
use ragserve_core::{Chunk, SearchResult, StoreError, VectorStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Disk-backed vector store on LanceDB.
///
/// The collection is a single table named after the configured collection
/// name; it is created lazily on first use and recreated after
/// [`delete_all`](VectorStore::delete_all).
pub struct LanceStore {
    /// Path to the LanceDB database directory
    db_path: PathBuf,
    /// Table name for the collection
    collection: String,
    /// Embedding dimension
    embedding_dim: usize,
    /// Database connection (lazy)
    connection: RwLock<Option<Connection>>,
    /// Collection table handle (lazy, invalidated by `delete_all`)
    table: RwLock<Option<Table>>,
}

impl LanceStore {
    /// Create a new `LanceStore`.
    #[must_use]
    pub fn new(db_path: PathBuf, collection: impl Into<String>, embedding_dim: usize) -> Self {
        Self {
            db_path,
            collection: collection.into(),
            embedding_dim,
            connection: RwLock::new(None),
            table: RwLock::new(None),
        }
    }

    /// The database path.
    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// The collection (table) name.
    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Get or create the connection.
    async fn get_connection(&self) -> Result<Connection, StoreError> {
        {
            let conn = self.connection.read().await;
            if let Some(ref c) = *conn {
                return Ok(c.clone());
            }
        }

        let mut conn = self.connection.write().await;
        if conn.is_none() {
            let db_path_str = self.db_path.to_string_lossy().to_string();
            let new_conn = connect(&db_path_str)
                .execute()
                .await
                .map_err(|e| StoreError::Init(format!("failed to connect to LanceDB: {e}")))?;
            *conn = Some(new_conn);
        }
        conn.clone()
            .ok_or_else(|| StoreError::Init("connection missing after initialization".to_string()))
    }

    /// Build the collection table schema.
    fn schema(&self) -> Schema {
        Schema::new(vec![
            Field::new("chunk_id", DataType::Utf8, false),
            Field::new("source", DataType::Utf8, false),
            Field::new("chunk_index", DataType::UInt32, false),
            Field::new("start_char", DataType::UInt64, false),
            Field::new("end_char", DataType::UInt64, false),
            Field::new("content", DataType::Utf8, false),
            Field::new(
                "vector",
                DataType::FixedSizeList(
                    Arc::new(Field::new("item", DataType::Float32, true)),
                    self.embedding_dim as i32,
                ),
                false,
            ),
            Field::new("embedding_model", DataType::Utf8, true),
            Field::new("ingested_at", DataType::Utf8, false),
        ])
    }

    /// Get the collection table, opening or creating it as needed.
    async fn ensure_table(&self) -> Result<Table, StoreError> {
        {
            let table = self.table.read().await;
            if let Some(ref t) = *table {
                return Ok(t.clone());
            }
        }

        let conn = self.get_connection().await?;
        let mut table_lock = self.table.write().await;

        if table_lock.is_none() {
            let tables = conn
                .table_names()
                .execute()
                .await
                .map_err(|e| StoreError::Init(format!("failed to list tables: {e}")))?;

            let t = if tables.contains(&self.collection) {
                conn.open_table(&self.collection)
                    .execute()
                    .await
                    .map_err(|e| StoreError::Init(format!("failed to open collection: {e}")))?
            } else {
                info!("creating collection table '{}'", self.collection);
                conn.create_empty_table(&self.collection, Arc::new(self.schema()))
                    .execute()
                    .await
                    .map_err(|e| StoreError::Init(format!("failed to create collection: {e}")))?
            };
            *table_lock = Some(t);
        }

        table_lock
            .clone()
            .ok_or_else(|| StoreError::Init("table missing after initialization".to_string()))
    }

    /// Convert chunks to an Arrow `RecordBatch`.
    fn chunks_to_batch(&self, chunks: &[Chunk]) -> Result<RecordBatch, StoreError> {
        let mut embeddings = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let embedding = chunk.embedding.as_ref().ok_or_else(|| {
                StoreError::Insert(format!("chunk {} has no embedding", chunk.id))
            })?;
            if embedding.len() != self.embedding_dim {
                return Err(StoreError::Insert(format!(
                    "chunk {} embedding dimension {} does not match store dimension {}",
                    chunk.id,
                    embedding.len(),
                    self.embedding_dim
                )));
            }
            embeddings.push(embedding.clone());
        }

        let chunk_ids: Vec<_> = chunks.iter().map(|c| c.id.to_string()).collect();
        let sources: Vec<_> = chunks.iter().map(|c| c.source.clone()).collect();
        let chunk_indices: Vec<_> = chunks.iter().map(|c| c.chunk_index).collect();
        let start_chars: Vec<_> = chunks.iter().map(|c| c.char_range.start as u64).collect();
        let end_chars: Vec<_> = chunks.iter().map(|c| c.char_range.end as u64).collect();
        let contents: Vec<_> = chunks.iter().map(|c| c.content.clone()).collect();
        let embedding_models: Vec<_> = chunks
            .iter()
            .map(|c| c.metadata.embedding_model.clone())
            .collect();
        let ingested_ats: Vec<_> = chunks
            .iter()
            .map(|c| {
                c.metadata
                    .ingested_at
                    .map_or_else(|| Utc::now().to_rfc3339(), |t| t.to_rfc3339())
            })
            .collect();

        let vector_array = build_vector_array(&embeddings, self.embedding_dim);

        RecordBatch::try_new(
            Arc::new(self.schema()),
            vec![
                Arc::new(StringArray::from(chunk_ids)),
                Arc::new(StringArray::from(sources)),
                Arc::new(UInt32Array::from(chunk_indices)),
                Arc::new(UInt64Array::from(start_chars)),
                Arc::new(UInt64Array::from(end_chars)),
                Arc::new(StringArray::from(contents)),
                vector_array,
                Arc::new(StringArray::from(embedding_models)),
                Arc::new(StringArray::from(ingested_ats)),
            ],
        )
        .map_err(|e| StoreError::Insert(format!("failed to build RecordBatch: {e}")))
    }
}

#[async_trait]
impl VectorStore for LanceStore {
    async fn init(&self) -> Result<(), StoreError> {
        info!("initializing LanceDB at {:?}", self.db_path);

        if let Some(parent) = self.db_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::Init(format!("failed to create db directory: {e}")))?;
        }

        self.ensure_table().await?;
        Ok(())
    }

    async fn add_chunks(&self, chunks: &[Chunk]) -> Result<(), StoreError> {
        if chunks.is_empty() {
            return Ok(());
        }

        debug!("adding {} chunks to '{}'", chunks.len(), self.collection);

        let table = self.ensure_table().await?;
        let batch = self.chunks_to_batch(chunks)?;
        let schema = batch.schema();
        let batches = RecordBatchIterator::new(vec![Ok(batch)], schema);

        table
            .add(Box::new(batches))
            .execute()
            .await
            .map_err(|e| StoreError::Insert(format!("failed to insert chunks: {e}")))?;

        Ok(())
    }

    async fn search(&self, embedding: &[f32], k: usize) -> Result<Vec<SearchResult>, StoreError> {
        debug!("searching '{}' with k={}", self.collection, k);

        let table = self.ensure_table().await?;

        let mut stream = table
            .vector_search(embedding.to_vec())
            .map_err(|e| StoreError::Query(format!("failed to build search: {e}")))?
            .limit(k)
            .execute()
            .await
            .map_err(|e| StoreError::Query(format!("failed to execute search: {e}")))?;

        let mut results = Vec::new();
        while let Some(batch) = stream
            .try_next()
            .await
            .map_err(|e| StoreError::Query(format!("failed to fetch results: {e}")))?
        {
            results.extend(batch_to_search_results(&batch)?);
        }

        debug!("found {} results", results.len());
        Ok(results)
    }

    async fn count(&self) -> u64 {
        // Lenient status query: any failure reads as an empty collection.
        let table = match self.ensure_table().await {
            Ok(t) => t,
            Err(e) => {
                warn!("count: collection unreadable, reporting 0: {e}");
                return 0;
            }
        };

        match table.count_rows(None).await {
            Ok(n) => n as u64,
            Err(e) => {
                warn!("count: count_rows failed, reporting 0: {e}");
                0
            }
        }
    }

    async fn delete_all(&self) -> Result<(), StoreError> {
        info!("dropping collection table '{}'", self.collection);

        let conn = self.get_connection().await?;
        let tables = conn
            .table_names()
            .execute()
            .await
            .map_err(|e| StoreError::Delete(format!("failed to list tables: {e}")))?;

        if tables.contains(&self.collection) {
            conn.drop_table(&self.collection)
                .await
                .map_err(|e| StoreError::Delete(format!("failed to drop collection: {e}")))?;
        }

        // Invalidate the cached handle; the next access recreates the table.
        let mut table = self.table.write().await;
        *table = None;
        Ok(())
    }
}

/// Build the fixed-size-list vector column.
fn build_vector_array(embeddings: &[Vec<f32>], dim: usize) -> ArrayRef {
    let iter = embeddings
        .iter()
        .map(|e| Some(e.iter().map(|&v| Some(v)).collect::<Vec<_>>()));
    Arc::new(FixedSizeListArray::from_iter_primitive::<Float32Type, _, _>(
        iter, dim as i32,
    ))
}

/// Convert a result batch into `SearchResult`s.
fn batch_to_search_results(batch: &RecordBatch) -> Result<Vec<SearchResult>, StoreError> {
    let chunk_ids = batch
        .column_by_name("chunk_id")
        .and_then(|c| c.as_any().downcast_ref::<StringArray>());
    let sources = batch
        .column_by_name("source")
        .and_then(|c| c.as_any().downcast_ref::<StringArray>());
    let chunk_indices = batch
        .column_by_name("chunk_index")
        .and_then(|c| c.as_any().downcast_ref::<UInt32Array>());
    let contents = batch
        .column_by_name("content")
        .and_then(|c| c.as_any().downcast_ref::<StringArray>());
    let distances = batch
        .column_by_name("_distance")
        .and_then(|c| c.as_any().downcast_ref::<Float32Array>());

    let (Some(chunk_ids), Some(sources), Some(chunk_indices), Some(contents)) =
        (chunk_ids, sources, chunk_indices, contents)
    else {
        return Err(StoreError::Query("missing required columns".to_string()));
    };

    let mut results = Vec::with_capacity(batch.num_rows());
    for i in 0..batch.num_rows() {
        results.push(SearchResult {
            chunk_id: Uuid::parse_str(chunk_ids.value(i)).unwrap_or_default(),
            source: sources.value(i).to_string(),
            chunk_index: chunk_indices.value(i),
            content: contents.value(i).to_string(),
            distance: distances.map_or(0.0, |d| d.value(i)),
        });
    }

    Ok(results)
}
