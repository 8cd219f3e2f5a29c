//! Codebase indexing pipeline: select, chunk, embed and upsert.

mod service;
#[cfg(test)]
pub(crate) mod testing;
pub mod writer;

pub use service::CodebaseIndexer;
pub use writer::{IndexLifecycle, IndexWriter, WriterSummary};

use crate::config::Config;
use crate::metrics::MetricsSnapshot;
use crate::pinecone::{IndexSpec, PineconeError};
use crate::selector::SelectionRules;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop an indexing run.
///
/// Failures scoped to one chunk or one file are logged and skipped; only problems with the
/// root directory or the index itself surface here.
#[derive(Debug, Error)]
pub enum IndexingError {
    /// The configured root is not a readable directory.
    #[error("Index root {0} is not a directory")]
    MissingRoot(PathBuf),
    /// The vector index rejected a request.
    #[error(transparent)]
    Store(#[from] PineconeError),
}

/// Parameters for one indexing run.
#[derive(Debug, Clone)]
pub struct IndexingOptions {
    /// Directory walked for source files.
    pub root: PathBuf,
    /// File selection predicates.
    pub rules: SelectionRules,
    /// Character threshold for the line chunker.
    pub chunk_size: usize,
    /// Records per upsert request.
    pub batch_size: usize,
    /// Characters of chunk text kept in metadata.
    pub preview_chars: usize,
    /// Target index and its creation parameters.
    pub index: IndexSpec,
}

impl IndexingOptions {
    /// Derive run options from the loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            root: config.root.clone(),
            rules: config.selection_rules(),
            chunk_size: config.chunk_size,
            batch_size: config.batch_size,
            preview_chars: config.preview_chars,
            index: IndexSpec {
                name: config.index_name.clone(),
                dimension: config.embedding_dimension,
                placement: config.placement.clone(),
            },
        }
    }
}

/// Final summary of an indexing run.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct IndexingReport {
    /// Index written to.
    pub index_name: String,
    /// Embedding model that produced the vectors.
    pub embedding_model: String,
    /// Whether the index had to be created.
    pub index_created: bool,
    /// Files that passed selection.
    pub files_selected: usize,
    /// Per-file and per-chunk counters.
    pub metrics: MetricsSnapshot,
    /// Upsert requests issued.
    pub batches_flushed: usize,
    /// Vector count reported before any writes.
    pub vectors_before: u64,
    /// Vector count fetched after the final flush.
    pub vectors_after: u64,
}
