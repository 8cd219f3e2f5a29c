//! Embedding client abstraction and HTTP adapters.
//!
//! The indexer only needs one operation, text in and vector out, so providers sit behind
//! [`EmbeddingClient`]. Adapters validate the returned dimensionality and retry transient
//! failures (HTTP 429, 5xx, timeouts, refused connections) with exponential backoff.

mod ollama;
mod openai;

pub use ollama::OllamaEmbeddingClient;
pub use openai::OpenAiEmbeddingClient;

use crate::config::{Config, Credentials, EmbeddingProvider};
use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = "sms-toolkit/0.1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Errors raised by embedding providers.
#[derive(Debug, Error)]
pub enum EmbeddingClientError {
    /// HTTP layer failed before a response was received.
    #[error("Embedding request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Provider answered with a non-success status.
    #[error("Embedding provider returned {status}: {body}")]
    UnexpectedStatus {
        /// HTTP status returned by the provider.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
    /// Response body could not be decoded or held no vector.
    #[error("Malformed embedding response: {0}")]
    InvalidResponse(String),
    /// Provider returned a vector of the wrong length.
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension configured for the index.
        expected: usize,
        /// Dimension actually produced by the provider.
        actual: usize,
    },
}

/// Interface implemented by embedding backends.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Produce the embedding vector for one chunk of text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingClientError>;

    /// Model identifier sent with every request.
    fn model(&self) -> &str;
}

/// Retry budget for transient provider failures.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries attempted after the first request; `0` disables retrying.
    pub max_retries: usize,
    /// Delay before the first retry, doubled on every further attempt.
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Policy with the default 500ms base delay.
    pub fn new(max_retries: usize) -> Self {
        Self {
            max_retries,
            base_delay: Duration::from_millis(500),
        }
    }

    fn backoff(&self, attempt: usize) -> Duration {
        let exponent = attempt.saturating_sub(1).min(5) as u32;
        self.base_delay * (1u32 << exponent)
    }
}

/// Build the embedding client selected by the configuration.
pub fn build_embedding_client(
    config: &Config,
    credentials: &Credentials,
) -> Result<Box<dyn EmbeddingClient>, EmbeddingClientError> {
    let retry = RetryPolicy::new(config.embedding_max_retries);
    tracing::debug!(
        provider = ?config.embedding_provider,
        model = %config.embedding_model,
        dimension = config.embedding_dimension,
        max_retries = retry.max_retries,
        "Building embedding client"
    );
    match config.embedding_provider {
        EmbeddingProvider::OpenAI => {
            let api_key = credentials.openai_api_key.clone().unwrap_or_default();
            Ok(Box::new(OpenAiEmbeddingClient::new(
                &config.openai_base_url,
                &api_key,
                &config.embedding_model,
                config.embedding_dimension,
                retry,
            )?))
        }
        EmbeddingProvider::Ollama => Ok(Box::new(OllamaEmbeddingClient::new(
            &config.ollama_url,
            &config.embedding_model,
            config.embedding_dimension,
            retry,
        )?)),
    }
}

pub(crate) fn http_client() -> Result<reqwest::Client, EmbeddingClientError> {
    Ok(reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()?)
}

/// Send the request produced by `build`, retrying transient failures per `policy`.
///
/// Returns the first successful response, or the error of the last attempt.
pub(crate) async fn send_with_retry<F>(
    build: F,
    policy: &RetryPolicy,
) -> Result<Response, EmbeddingClientError>
where
    F: Fn() -> RequestBuilder,
{
    let mut attempt = 0usize;
    loop {
        match build().send().await {
            Ok(response) if response.status().is_success() => return Ok(response),
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                if is_transient_status(status) && attempt < policy.max_retries {
                    attempt += 1;
                    let delay = policy.backoff(attempt);
                    tracing::warn!(%status, attempt, delay_ms = delay.as_millis() as u64, "Embedding request throttled; retrying");
                    tokio::time::sleep(delay).await;
                    continue;
                }
                return Err(EmbeddingClientError::UnexpectedStatus { status, body });
            }
            Err(err) => {
                if (err.is_timeout() || err.is_connect()) && attempt < policy.max_retries {
                    attempt += 1;
                    let delay = policy.backoff(attempt);
                    tracing::warn!(error = %err, attempt, delay_ms = delay.as_millis() as u64, "Embedding request failed; retrying");
                    tokio::time::sleep(delay).await;
                    continue;
                }
                return Err(err.into());
            }
        }
    }
}

fn is_transient_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

pub(crate) fn check_dimension(
    vector: Vec<f32>,
    expected: usize,
) -> Result<Vec<f32>, EmbeddingClientError> {
    if vector.is_empty() {
        return Err(EmbeddingClientError::InvalidResponse(
            "provider returned an empty vector".into(),
        ));
    }
    if vector.len() != expected {
        return Err(EmbeddingClientError::DimensionMismatch {
            expected,
            actual: vector.len(),
        });
    }
    Ok(vector)
}
