//! OpenAI-compatible embeddings adapter.

use super::{
    EmbeddingClient, EmbeddingClientError, RetryPolicy, check_dimension, http_client,
    send_with_retry,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

/// Calls `POST {base_url}/embeddings` with bearer authentication.
pub struct OpenAiEmbeddingClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
    dimension: usize,
    retry: RetryPolicy,
}

impl OpenAiEmbeddingClient {
    /// Construct a client for an OpenAI-compatible endpoint.
    pub fn new(
        base_url: &str,
        api_key: &str,
        model: &str,
        dimension: usize,
        retry: RetryPolicy,
    ) -> Result<Self, EmbeddingClientError> {
        Ok(Self {
            http: http_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.trim().to_string(),
            model: model.to_string(),
            dimension,
            retry,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/embeddings", self.base_url)
    }
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

#[async_trait]
impl EmbeddingClient for OpenAiEmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingClientError> {
        let body = json!({
            "model": self.model,
            "input": text,
        });
        let endpoint = self.endpoint();

        let response = send_with_retry(
            || {
                self.http
                    .post(&endpoint)
                    .bearer_auth(&self.api_key)
                    .json(&body)
            },
            &self.retry,
        )
        .await?;

        let mut payload: EmbeddingResponse = response.json().await.map_err(|error| {
            EmbeddingClientError::InvalidResponse(format!(
                "failed to decode OpenAI response: {error}"
            ))
        })?;
        payload.data.sort_by_key(|entry| entry.index);
        let vector = payload
            .data
            .into_iter()
            .next()
            .map(|entry| entry.embedding)
            .ok_or_else(|| EmbeddingClientError::InvalidResponse("response held no data".into()))?;

        check_dimension(vector, self.dimension)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};
    use std::time::Duration;

    fn client(server: &MockServer, dimension: usize, max_retries: usize) -> OpenAiEmbeddingClient {
        OpenAiEmbeddingClient::new(
            &format!("{}/v1/", server.base_url()),
            "sk-test",
            "text-embedding-ada-002",
            dimension,
            RetryPolicy {
                max_retries,
                base_delay: Duration::from_millis(1),
            },
        )
        .expect("client")
    }

    #[tokio::test]
    async fn embed_sends_model_and_input() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/embeddings")
                    .header("authorization", "Bearer sk-test")
                    .json_body(json!({
                        "model": "text-embedding-ada-002",
                        "input": "class Student {}"
                    }));
                then.status(200).json_body(json!({
                    "object": "list",
                    "data": [
                        { "object": "embedding", "index": 0, "embedding": [0.25, -0.5, 1.0] }
                    ],
                    "model": "text-embedding-ada-002"
                }));
            })
            .await;

        let vector = client(&server, 3, 0)
            .embed("class Student {}")
            .await
            .expect("embedding");

        mock.assert();
        assert_eq!(vector, vec![0.25, -0.5, 1.0]);
    }

    #[tokio::test]
    async fn embed_rejects_wrong_dimension() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/embeddings");
                then.status(200)
                    .json_body(json!({ "data": [ { "index": 0, "embedding": [0.1, 0.2] } ] }));
            })
            .await;

        let error = client(&server, 1536, 0).embed("text").await.unwrap_err();
        assert!(matches!(
            error,
            EmbeddingClientError::DimensionMismatch {
                expected: 1536,
                actual: 2
            }
        ));
    }

    #[tokio::test]
    async fn embed_reports_client_errors_without_retrying() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/embeddings");
                then.status(401).body("invalid api key");
            })
            .await;

        let error = client(&server, 3, 3).embed("text").await.unwrap_err();
        mock.assert_hits(1);
        assert!(
            matches!(error, EmbeddingClientError::UnexpectedStatus { status, ref body } if status.as_u16() == 401 && body.contains("invalid"))
        );
    }

    #[tokio::test]
    async fn embed_retries_rate_limits() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/embeddings");
                then.status(429).body("slow down");
            })
            .await;

        let error = client(&server, 3, 2).embed("text").await.unwrap_err();
        mock.assert_hits(3);
        assert!(matches!(error, EmbeddingClientError::UnexpectedStatus { .. }));
    }

    #[tokio::test]
    async fn embed_rejects_malformed_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/embeddings");
                then.status(200).json_body(json!({ "data": [] }));
            })
            .await;

        let error = client(&server, 3, 0).embed("text").await.unwrap_err();
        assert!(matches!(error, EmbeddingClientError::InvalidResponse(_)));
    }
}
