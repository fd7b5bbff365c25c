//! Document ingestion: save → extract → chunk → embed → store.

use chrono::Utc;
use ragserve_core::{
    Chunk, ChunkConfig, ChunkMetadata, Chunker, Embedder, Error, ExtractError, VectorStore,
};
use ragserve_extract::ExtractorRegistry;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Result of ingesting one uploaded file.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    /// File name the upload was saved under
    pub filename: String,
    /// Number of chunks produced and stored
    pub chunk_count: usize,
}

/// A file sitting in the upload directory.
#[derive(Debug, Clone, Serialize)]
pub struct UploadedFile {
    /// File name
    pub filename: String,
    /// Size in bytes
    pub size: u64,
}

/// The ingestion pipeline for uploaded documents.
///
/// One file per call; the extension allow-list is checked before anything is
/// written, chunked, embedded, or stored.
pub struct DocumentIngestor {
    upload_dir: PathBuf,
    extractors: ExtractorRegistry,
    chunker: Arc<dyn Chunker>,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    chunk_config: ChunkConfig,
}

impl DocumentIngestor {
    /// Create a new ingestor.
    pub fn new(
        upload_dir: PathBuf,
        extractors: ExtractorRegistry,
        chunker: Arc<dyn Chunker>,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        chunk_config: ChunkConfig,
    ) -> Self {
        Self {
            upload_dir,
            extractors,
            chunker,
            embedder,
            store,
            chunk_config,
        }
    }

    /// The upload directory.
    #[must_use]
    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// Ingest one uploaded file.
    ///
    /// Saves `bytes` under the upload directory, extracts text, chunks it,
    /// embeds every chunk, and appends the chunks to the store.
    pub async fn ingest_bytes(&self, filename: &str, bytes: &[u8]) -> Result<IngestReport, Error> {
        // Uploads carry client-controlled names; keep only the final
        // component so they cannot escape the upload directory.
        let filename = Path::new(filename)
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::Validation("invalid file name".to_string()))?
            .to_string();

        // Extension check happens before any write or pipeline work.
        if !self.extractors.is_supported(Path::new(&filename)) {
            let ext = Path::new(&filename)
                .extension()
                .and_then(|e| e.to_str())
                .map_or_else(|| "(none)".to_string(), |e| format!(".{e}"));
            return Err(ExtractError::UnsupportedType(ext).into());
        }

        tokio::fs::create_dir_all(&self.upload_dir).await?;
        let path = self.upload_dir.join(&filename);
        tokio::fs::write(&path, bytes).await?;
        debug!("saved upload to {:?} ({} bytes)", path, bytes.len());

        let content = self.extractors.extract(&path).await?;
        let outputs = self.chunker.chunk(&content.text, &self.chunk_config).await?;

        let texts: Vec<&str> = outputs.iter().map(|o| o.content.as_str()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        let ingested_at = Utc::now();
        let chunks: Vec<Chunk> = outputs
            .into_iter()
            .zip(embeddings)
            .enumerate()
            .map(|(i, (output, embedding))| Chunk {
                id: Uuid::new_v4(),
                source: filename.clone(),
                chunk_index: i as u32,
                content: output.content,
                char_range: output.char_range,
                embedding: Some(embedding),
                metadata: ChunkMetadata {
                    embedding_model: Some(self.embedder.model_name().to_string()),
                    ingested_at: Some(ingested_at),
                },
            })
            .collect();

        self.store.add_chunks(&chunks).await?;

        info!("ingested '{}' into {} chunks", filename, chunks.len());
        Ok(IngestReport {
            filename,
            chunk_count: chunks.len(),
        })
    }

    /// List the files currently in the upload directory.
    ///
    /// A missing directory reads as an empty list.
    pub async fn list_uploaded_files(&self) -> Result<Vec<UploadedFile>, Error> {
        let mut files = Vec::new();

        let mut entries = match tokio::fs::read_dir(&self.upload_dir).await {
            Ok(entries) => entries,
            Err(_) => return Ok(files),
        };

        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            if metadata.is_file() {
                files.push(UploadedFile {
                    filename: entry.file_name().to_string_lossy().to_string(),
                    size: metadata.len(),
                });
            }
        }

        files.sort_by(|a, b| a.filename.cmp(&b.filename));
        Ok(files)
    }
}
