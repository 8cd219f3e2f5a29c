//! HTTP client wrapper for the Pinecone control and data planes.

use crate::pinecone::types::{
    INDEX_METRIC, IndexDescription, IndexSpec, IndexStats, ListIndexesResponse, PineconeError,
    UpsertResponse,
};
use crate::pinecone::VectorStore;
use crate::record::IndexRecord;
use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

const API_VERSION: &str = "2024-07";

/// Polling budget applied after creating an index.
#[derive(Debug, Clone, Copy)]
pub struct ReadinessPolicy {
    /// Number of `describe_index` checks before giving up.
    pub attempts: usize,
    /// Delay between checks.
    pub interval: Duration,
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self {
            attempts: 120,
            interval: Duration::from_secs(1),
        }
    }
}

/// Lightweight HTTP client for Pinecone operations.
///
/// Control-plane calls go to the controller URL; upserts and statistics go to the index's
/// own host, resolved once through `describe_index` and cached per index name.
pub struct PineconeService {
    pub(crate) client: Client,
    pub(crate) controller_url: String,
    pub(crate) api_key: String,
    pub(crate) readiness: ReadinessPolicy,
    hosts: Mutex<HashMap<String, String>>,
}

impl PineconeService {
    /// Construct a client for the given controller URL and API key.
    pub fn new(controller_url: &str, api_key: &str) -> Result<Self, PineconeError> {
        let client = Client::builder()
            .user_agent("sms-toolkit/0.1")
            .timeout(Duration::from_secs(60))
            .build()?;
        let controller_url = normalize_base_url(controller_url).map_err(PineconeError::InvalidUrl)?;
        tracing::debug!(url = %controller_url, "Initialized Pinecone HTTP client");

        Ok(Self::with_client(client, controller_url, api_key.to_string()))
    }

    pub(crate) fn with_client(client: Client, controller_url: String, api_key: String) -> Self {
        Self {
            client,
            controller_url,
            api_key,
            readiness: ReadinessPolicy::default(),
            hosts: Mutex::new(HashMap::new()),
        }
    }

    /// Override how long [`VectorStore::create_index`] waits for the index to become ready.
    pub fn with_readiness(mut self, readiness: ReadinessPolicy) -> Self {
        self.readiness = readiness;
        self
    }

    /// Retrieve the names of all indexes in the project.
    pub async fn list_index_names(&self) -> Result<Vec<String>, PineconeError> {
        let response = self
            .request(Method::GET, &format_endpoint(&self.controller_url, "indexes"))
            .send()
            .await?;

        if response.status().is_success() {
            let payload: ListIndexesResponse = response.json().await?;
            Ok(payload.indexes.into_iter().map(|index| index.name).collect())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = PineconeError::UnexpectedStatus { status, body };
            tracing::error!(error = %error, "Failed to list indexes");
            Err(error)
        }
    }

    /// Create a serverless index. An index that already exists is not an error.
    pub async fn create_serverless_index(&self, spec: &IndexSpec) -> Result<(), PineconeError> {
        let body = json!({
            "name": spec.name,
            "dimension": spec.dimension,
            "metric": INDEX_METRIC,
            "spec": {
                "serverless": {
                    "cloud": spec.placement.cloud,
                    "region": spec.placement.region,
                }
            }
        });

        let response = self
            .request(Method::POST, &format_endpoint(&self.controller_url, "indexes"))
            .json(&body)
            .send()
            .await?;

        if response.status() == StatusCode::CONFLICT {
            tracing::debug!(index = %spec.name, "Index already exists");
            return Ok(());
        }

        self.ensure_success(response, || {
            tracing::debug!(
                index = %spec.name,
                dimension = spec.dimension,
                cloud = %spec.placement.cloud,
                region = %spec.placement.region,
                "Index creation accepted"
            );
        })
        .await
    }

    /// Poll `describe_index` until the index reports ready.
    pub async fn wait_until_ready(&self, name: &str) -> Result<(), PineconeError> {
        for attempt in 1..=self.readiness.attempts {
            let description = self.describe_index(name).await?;
            let ready = description
                .status
                .as_ref()
                .map(|status| status.ready)
                .unwrap_or(false);
            if ready {
                self.remember_host(&description);
                tracing::debug!(index = name, attempt, "Index ready");
                return Ok(());
            }
            tracing::debug!(
                index = name,
                attempt,
                state = ?description.status.as_ref().and_then(|status| status.state.as_deref()),
                "Waiting for index"
            );
            tokio::time::sleep(self.readiness.interval).await;
        }

        Err(PineconeError::IndexNotReady {
            name: name.to_string(),
            attempts: self.readiness.attempts,
        })
    }

    /// Write a batch of records to the index, returning the count Pinecone acknowledged.
    pub async fn upsert_records(
        &self,
        index: &str,
        records: &[IndexRecord],
    ) -> Result<usize, PineconeError> {
        if records.is_empty() {
            return Ok(0);
        }

        let host = self.index_host(index).await?;
        let response = self
            .request(Method::POST, &format_endpoint(&host, "vectors/upsert"))
            .json(&json!({ "vectors": records }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = PineconeError::UnexpectedStatus { status, body };
            tracing::error!(index, records = records.len(), error = %error, "Upsert failed");
            return Err(error);
        }

        let payload: UpsertResponse = response.json().await?;
        let upserted = payload.upserted_count.unwrap_or(records.len());
        tracing::debug!(index, upserted, "Records upserted");
        Ok(upserted)
    }

    /// Fetch fresh statistics for the index.
    pub async fn index_stats(&self, index: &str) -> Result<IndexStats, PineconeError> {
        let host = self.index_host(index).await?;
        let response = self
            .request(Method::POST, &format_endpoint(&host, "describe_index_stats"))
            .json(&json!({}))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = PineconeError::UnexpectedStatus { status, body };
            tracing::error!(index, error = %error, "Failed to describe index stats");
            Err(error)
        }
    }

    async fn describe_index(&self, name: &str) -> Result<IndexDescription, PineconeError> {
        let response = self
            .request(
                Method::GET,
                &format_endpoint(&self.controller_url, &format!("indexes/{name}")),
            )
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = PineconeError::UnexpectedStatus { status, body };
            tracing::error!(index = name, error = %error, "Failed to describe index");
            Err(error)
        }
    }

    async fn index_host(&self, name: &str) -> Result<String, PineconeError> {
        if let Some(host) = self.cached_host(name) {
            return Ok(host);
        }
        let description = self.describe_index(name).await?;
        self.remember_host(&description)
            .ok_or_else(|| PineconeError::MissingHost(name.to_string()))
    }

    fn cached_host(&self, name: &str) -> Option<String> {
        self.hosts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(name)
            .cloned()
    }

    fn remember_host(&self, description: &IndexDescription) -> Option<String> {
        let host = description
            .host
            .as_deref()
            .map(str::trim)
            .filter(|host| !host.is_empty())
            .map(host_url)?;
        self.hosts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(description.name.clone(), host.clone());
        Some(host)
    }

    fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
    }

    async fn ensure_success<F>(
        &self,
        response: reqwest::Response,
        on_success: F,
    ) -> Result<(), PineconeError>
    where
        F: FnOnce(),
    {
        if response.status().is_success() {
            on_success();
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = PineconeError::UnexpectedStatus { status, body };
            tracing::error!(error = %error, "Pinecone request failed");
            Err(error)
        }
    }
}

#[async_trait]
impl VectorStore for PineconeService {
    async fn list_indexes(&self) -> Result<Vec<String>, PineconeError> {
        self.list_index_names().await
    }

    async fn create_index(&self, spec: &IndexSpec) -> Result<(), PineconeError> {
        self.create_serverless_index(spec).await?;
        self.wait_until_ready(&spec.name).await
    }

    async fn describe_index_stats(&self, index: &str) -> Result<IndexStats, PineconeError> {
        self.index_stats(index).await
    }

    async fn upsert(&self, index: &str, records: &[IndexRecord]) -> Result<usize, PineconeError> {
        self.upsert_records(index, records).await
    }
}

fn normalize_base_url(url: &str) -> Result<String, String> {
    let mut parsed = reqwest::Url::parse(url).map_err(|err| err.to_string())?;
    let path = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&path);
    Ok(parsed.to_string())
}

fn format_endpoint(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}

/// Pinecone reports bare host names; local test servers report full URLs.
fn host_url(host: &str) -> String {
    if host.starts_with("http://") || host.starts_with("https://") {
        host.trim_end_matches('/').to_string()
    } else {
        format!("https://{host}")
    }
}
