//! Ollama embeddings adapter.

use super::{
    EmbeddingClient, EmbeddingClientError, RetryPolicy, check_dimension, http_client,
    send_with_retry,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

/// Calls `POST {base_url}/api/embeddings` on a local Ollama runtime.
pub struct OllamaEmbeddingClient {
    http: Client,
    base_url: String,
    model: String,
    dimension: usize,
    retry: RetryPolicy,
}

impl OllamaEmbeddingClient {
    /// Construct a client for the Ollama runtime at `base_url`.
    pub fn new(
        base_url: &str,
        model: &str,
        dimension: usize,
        retry: RetryPolicy,
    ) -> Result<Self, EmbeddingClientError> {
        Ok(Self {
            http: http_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            dimension,
            retry,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/api/embeddings", self.base_url)
    }
}

#[derive(Deserialize)]
struct OllamaEmbeddingResponse {
    #[serde(default)]
    embedding: Vec<f32>,
}

#[async_trait]
impl EmbeddingClient for OllamaEmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingClientError> {
        let body = json!({
            "model": self.model,
            "prompt": text,
        });
        let endpoint = self.endpoint();

        let response =
            send_with_retry(|| self.http.post(&endpoint).json(&body), &self.retry).await?;

        let payload: OllamaEmbeddingResponse = response.json().await.map_err(|error| {
            EmbeddingClientError::InvalidResponse(format!(
                "failed to decode Ollama response: {error}"
            ))
        })?;

        check_dimension(payload.embedding, self.dimension)
    }

    fn model(&self) -> &str {
        &self.model
    }
}
