//! Ollama HTTP client.

use async_trait::async_trait;
use ragserve_core::{Embedder, GenerationOptions, LlmError, TextGenerator};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Client for a locally reachable Ollama server.
///
/// One client serves both embedding and generation; the two use separate
/// model names since embedding models and chat models are distinct.
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    embedding_model: String,
    embedding_dim: usize,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    embedding: Vec<f32>,
}

impl OllamaClient {
    /// Create a new client.
    ///
    /// `base_url` is the server root (e.g. `http://localhost:11434`); a
    /// trailing slash is tolerated. `embedding_dim` is the dimension the
    /// configured embedding model produces and must match the store schema.
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        embedding_model: impl Into<String>,
        embedding_dim: usize,
    ) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            http: reqwest::Client::new(),
            base_url,
            model: model.into(),
            embedding_model: embedding_model.into(),
            embedding_dim,
        }
    }

    /// The server root this client talks to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, LlmError> {
        let url = format!("{}{path}", self.base_url);

        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| LlmError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| LlmError::MalformedResponse(e.to_string()))
    }
}

#[async_trait]
impl TextGenerator for OllamaClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, LlmError> {
        debug!(
            "generate: model={} temperature={} max_tokens={} prompt_chars={}",
            self.model,
            options.temperature,
            options.max_tokens,
            prompt.chars().count()
        );

        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: OllamaOptions {
                temperature: options.temperature,
                num_predict: options.max_tokens,
            },
        };

        let response: GenerateResponse = self.post_json("/api/generate", &request).await?;
        Ok(response.response)
    }
}

#[async_trait]
impl Embedder for OllamaClient {
    fn model_name(&self) -> &str {
        &self.embedding_model
    }

    fn dimension(&self) -> usize {
        self.embedding_dim
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        debug!(
            "embed: model={} text_chars={}",
            self.embedding_model,
            text.chars().count()
        );

        let request = EmbeddingsRequest {
            model: &self.embedding_model,
            prompt: text,
        };

        let response: EmbeddingsResponse = self.post_json("/api/embeddings", &request).await?;

        if response.embedding.len() != self.embedding_dim {
            return Err(LlmError::MalformedResponse(format!(
                "embedding dimension {} does not match configured dimension {}",
                response.embedding.len(),
                self.embedding_dim
            )));
        }

        Ok(response.embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_strips_trailing_slash() {
        let client = OllamaClient::new("http://localhost:11434/", "llama3.1", "nomic", 768);
        assert_eq!(client.base_url(), "http://localhost:11434");
    }

    #[test]
    fn test_model_names_are_separate() {
        let client = OllamaClient::new("http://localhost:11434", "llama3.1", "nomic", 768);
        assert_eq!(TextGenerator::model_name(&client), "llama3.1");
        assert_eq!(Embedder::model_name(&client), "nomic");
        assert_eq!(client.dimension(), 768);
    }

    #[test]
    fn test_generate_request_wire_shape() {
        let request = GenerateRequest {
            model: "llama3.1",
            prompt: "hello",
            stream: false,
            options: OllamaOptions {
                temperature: 0.7,
                num_predict: 2000,
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "llama3.1");
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["num_predict"], 2000);
    }

    #[test]
    fn test_embeddings_response_parses() {
        let response: EmbeddingsResponse =
            serde_json::from_str(r#"{"embedding": [0.1, 0.2, 0.3]}"#).unwrap();
        assert_eq!(response.embedding.len(), 3);
    }

    #[test]
    fn test_generate_response_tolerates_extra_fields() {
        let response: GenerateResponse = serde_json::from_str(
            r#"{"model": "llama3.1", "response": "hi", "done": true, "total_duration": 12}"#,
        )
        .unwrap();
        assert_eq!(response.response, "hi");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_connection_error() {
        // Nothing listens on this port.
        let client = OllamaClient::new("http://127.0.0.1:1", "llama3.1", "nomic", 768);
        let result = client.generate("hi", &GenerationOptions::default()).await;
        assert!(matches!(result, Err(LlmError::Connection(_))));

        let result = client.embed("hi").await;
        assert!(matches!(result, Err(LlmError::Connection(_))));
    }
}
