//! Shared types used by the Pinecone client.

use crate::config::Placement;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Errors returned while interacting with Pinecone.
#[derive(Debug, Error)]
pub enum PineconeError {
    /// Base URL failed to parse or normalize.
    #[error("Invalid Pinecone URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed before receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Pinecone responded with an unexpected status code.
    #[error("Unexpected Pinecone response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned from Pinecone.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
    /// The index never reported ready within the polling budget.
    #[error("Index '{name}' not ready after {attempts} checks")]
    IndexNotReady {
        /// Index being waited on.
        name: String,
        /// Number of readiness checks performed.
        attempts: usize,
    },
    /// The index description carried no data-plane host.
    #[error("Index '{0}' has no host yet")]
    MissingHost(String),
}

/// Parameters used when an index has to be created.
#[derive(Debug, Clone)]
pub struct IndexSpec {
    /// Index name.
    pub name: String,
    /// Vector dimensionality.
    pub dimension: usize,
    /// Serverless cloud/region placement.
    pub placement: Placement,
}

/// Similarity metric used for every index this tool creates.
pub const INDEX_METRIC: &str = "cosine";

/// Statistics reported by `describe_index_stats`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStats {
    /// Number of vectors stored across all namespaces.
    #[serde(default)]
    pub total_vector_count: u64,
    /// Dimension of the index, when reported.
    #[serde(default)]
    pub dimension: Option<usize>,
}

#[derive(Deserialize)]
pub(crate) struct ListIndexesResponse {
    #[serde(default)]
    pub(crate) indexes: Vec<IndexDescription>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IndexDescription {
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) host: Option<String>,
    #[serde(default)]
    pub(crate) status: Option<IndexStatus>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IndexStatus {
    #[serde(default)]
    pub(crate) ready: bool,
    #[serde(default)]
    pub(crate) state: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpsertResponse {
    #[serde(default)]
    pub(crate) upserted_count: Option<usize>,
}
