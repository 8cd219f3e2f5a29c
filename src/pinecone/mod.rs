//! Pinecone vector index integration.

pub mod client;
pub mod types;

pub use client::{PineconeService, ReadinessPolicy};
pub use types::{INDEX_METRIC, IndexSpec, IndexStats, PineconeError};

use crate::record::IndexRecord;
use async_trait::async_trait;

/// Operations the indexer needs from a hosted vector index.
///
/// [`PineconeService`] talks to the real service; tests substitute in-memory fakes.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Names of the indexes that currently exist.
    async fn list_indexes(&self) -> Result<Vec<String>, PineconeError>;

    /// Create an index and return once it can accept writes.
    async fn create_index(&self, spec: &IndexSpec) -> Result<(), PineconeError>;

    /// Fresh statistics for an index.
    async fn describe_index_stats(&self, index: &str) -> Result<IndexStats, PineconeError>;

    /// Insert or overwrite records by id, returning the acknowledged count.
    async fn upsert(&self, index: &str, records: &[IndexRecord]) -> Result<usize, PineconeError>;
}
