//! Direct chat endpoints (no retrieval).

use axum::extract::State;
use axum::Json;
use ragserve_core::{ChatTurn, GenerationOptions};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{ApiError, AppState};

/// Chat request.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Overrides the configured temperature for this message
    #[serde(default)]
    pub temperature: Option<f32>,
    /// Prior exchanges; only the most recent window is used
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

/// Chat response.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

/// `POST /api/chat/query`: send a message straight to the model.
pub async fn query(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let response = state
        .chat_chain
        .chat(&request.message, request.temperature, &request.history)
        .await?;

    Ok(Json(ChatResponse { response }))
}

/// `GET /api/chat/test`: model server connectivity probe.
///
/// Reports failure in the body rather than via the status code; the probe
/// succeeding as an HTTP call is the point.
pub async fn test_connection(State(state): State<AppState>) -> Json<serde_json::Value> {
    let options = GenerationOptions {
        max_tokens: 64,
        ..GenerationOptions::default()
    };

    match state.generator.generate("Hello!", &options).await {
        Ok(response) => Json(json!({
            "status": "success",
            "message": "model server connection ok",
            "response": response,
        })),
        Err(e) => Json(json!({
            "status": "error",
            "message": format!("model server connection failed: {e}"),
        })),
    }
}
