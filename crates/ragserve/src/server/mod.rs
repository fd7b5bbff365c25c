//! The ragserve HTTP API.
//!
//! Handlers validate input, call an injected service, and reshape the result
//! into a JSON response. All services are constructed at startup and passed
//! in through [`AppState`]; there is no process-wide mutable state.

pub mod chat;
pub mod error;
pub mod rag;

use axum::extract::DefaultBodyLimit;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use ragserve_core::{TextGenerator, VectorStore};
use ragserve_qa::{ChatChain, QaChain};
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::ingest::DocumentIngestor;

pub use error::ApiError;

/// Services shared with every handler.
#[derive(Clone)]
pub struct AppState {
    /// Upload pipeline
    pub ingestor: Arc<DocumentIngestor>,
    /// Retrieval-augmented QA
    pub qa_chain: Arc<QaChain>,
    /// Direct chat
    pub chat_chain: Arc<ChatChain>,
    /// Raw generator handle, for the connectivity probe
    pub generator: Arc<dyn TextGenerator>,
    /// Vector store, for count/delete status operations
    pub store: Arc<dyn VectorStore>,
    /// Collection name reported by the documents endpoint
    pub collection_name: String,
    /// Model server URL reported by the health endpoint
    pub ollama_url: String,
    /// Generation model name reported by the health endpoint
    pub model: String,
}

/// PDF uploads routinely exceed axum's 2 MB default body limit.
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/ui", get(ui))
        .route("/api/rag/upload", post(rag::upload))
        .route("/api/rag/query", post(rag::query))
        .route(
            "/api/rag/documents",
            get(rag::documents_info).delete(rag::delete_documents),
        )
        .route("/api/chat/query", post(chat::query))
        .route("/api/chat/test", get(chat::test_connection))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let app = router(state);
    let listener = TcpListener::bind((host, port)).await?;
    info!("listening on http://{}:{}", host, port);
    axum::serve(listener, app).await?;
    Ok(())
}

/// Welcome document listing the endpoints.
async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Welcome to the ragserve RAG API",
        "endpoints": {
            "chat": "/api/chat/query",
            "rag_upload": "/api/rag/upload",
            "rag_query": "/api/rag/query",
            "rag_documents": "/api/rag/documents",
            "ui": "/ui"
        }
    }))
}

/// Health probe.
async fn health(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "ollama_url": state.ollama_url,
        "model": state.model,
    }))
}

/// The interactive test client.
async fn ui() -> Html<&'static str> {
    Html(include_str!("../../assets/index.html"))
}
