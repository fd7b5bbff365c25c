//! Document upload, RAG query, and collection management endpoints.

use axum::extract::{Multipart, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use super::{ApiError, AppState};
use crate::ingest::UploadedFile;

/// Response for a successful upload.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub status: String,
    pub message: String,
    pub filename: String,
    /// Chunks produced from this upload
    pub chunks: usize,
    /// Collection size after the upload
    pub total_chunks: u64,
}

/// RAG query request.
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub question: String,
    /// Overrides the configured top-K for this query
    #[serde(default)]
    pub top_k: Option<usize>,
}

/// RAG query response.
#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub question: String,
    pub answer: String,
    pub source_documents: Vec<SourceDocument>,
}

/// One retrieved chunk, reshaped for the client.
#[derive(Debug, Serialize)]
pub struct SourceDocument {
    pub content: String,
    pub metadata: SourceMetadata,
}

/// Provenance of a retrieved chunk.
#[derive(Debug, Serialize)]
pub struct SourceMetadata {
    pub source: String,
    pub chunk_index: u32,
    pub distance: f32,
}

/// Documents listing response.
#[derive(Debug, Serialize)]
pub struct DocumentsInfo {
    pub total_chunks: u64,
    pub uploaded_files: Vec<UploadedFile>,
    pub collection_name: String,
}

/// `POST /api/rag/upload`: accept a multipart file, ingest it.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("invalid multipart body: {e}")))?
    {
        if field.name() == Some("file") {
            let filename = field
                .file_name()
                .map(str::to_string)
                .ok_or_else(|| ApiError::bad_request("'file' field carries no file name"))?;
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(format!("failed to read upload: {e}")))?;
            file = Some((filename, bytes.to_vec()));
        }
    }

    let (filename, bytes) =
        file.ok_or_else(|| ApiError::bad_request("multipart body is missing a 'file' field"))?;

    info!("upload received: '{}' ({} bytes)", filename, bytes.len());

    let report = state.ingestor.ingest_bytes(&filename, &bytes).await?;
    let total_chunks = state.store.count().await;

    Ok(Json(UploadResponse {
        status: "success".to_string(),
        message: "document uploaded and embedded successfully".to_string(),
        filename: report.filename,
        chunks: report.chunk_count,
        total_chunks,
    }))
}

/// `POST /api/rag/query`: answer a question from the collection.
pub async fn query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    if state.store.count().await == 0 {
        return Err(ApiError::bad_request(
            "no documents have been uploaded yet. Upload a document first",
        ));
    }

    let answer = state
        .qa_chain
        .query(&request.question, request.top_k)
        .await?;

    let source_documents = answer
        .source_chunks
        .into_iter()
        .map(|chunk| SourceDocument {
            content: chunk.content,
            metadata: SourceMetadata {
                source: chunk.source,
                chunk_index: chunk.chunk_index,
                distance: chunk.distance,
            },
        })
        .collect();

    Ok(Json(QueryResponse {
        question: answer.question,
        answer: answer.answer,
        source_documents,
    }))
}

/// `GET /api/rag/documents`: collection status.
pub async fn documents_info(
    State(state): State<AppState>,
) -> Result<Json<DocumentsInfo>, ApiError> {
    let total_chunks = state.store.count().await;
    let uploaded_files = state.ingestor.list_uploaded_files().await?;

    Ok(Json(DocumentsInfo {
        total_chunks,
        uploaded_files,
        collection_name: state.collection_name.clone(),
    }))
}

/// `DELETE /api/rag/documents`: clear the collection.
pub async fn delete_documents(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .store
        .delete_all()
        .await
        .map_err(ragserve_core::Error::from)?;

    info!("collection cleared");
    Ok(Json(json!({
        "status": "success",
        "message": "all documents deleted",
    })))
}
