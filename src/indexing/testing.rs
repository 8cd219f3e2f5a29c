//! In-memory doubles shared by the indexing tests.

use crate::embedding::{EmbeddingClient, EmbeddingClientError};
use crate::pinecone::{IndexSpec, IndexStats, PineconeError, VectorStore};
use crate::record::{IndexRecord, RecordMetadata};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

pub(crate) fn record(id: &str) -> IndexRecord {
    IndexRecord {
        id: id.to_string(),
        vector: vec![0.1, 0.2, 0.3],
        metadata: RecordMetadata {
            file_name: "file.cs".into(),
            file_path: "file.cs".into(),
            file_type: "cs".into(),
            content: String::new(),
            start_line: 1,
            end_line: 1,
            chunk_index: 0,
            total_chunks: 1,
        },
    }
}

/// Vector store keeping records in a map keyed by id.
#[derive(Default)]
pub(crate) struct MemoryStore {
    indexes: Mutex<BTreeSet<String>>,
    created: Mutex<Vec<String>>,
    batches: Mutex<Vec<Vec<String>>>,
    stored: Mutex<BTreeMap<String, IndexRecord>>,
    fail_on_upsert: Option<usize>,
}

impl MemoryStore {
    pub(crate) fn with_index(name: &str) -> Self {
        let store = Self::default();
        store
            .indexes
            .lock()
            .expect("indexes lock")
            .insert(name.to_string());
        store
    }

    /// Fail the `call`-th upsert (1-based).
    pub(crate) fn failing_on_upsert(mut self, call: usize) -> Self {
        self.fail_on_upsert = Some(call);
        self
    }

    pub(crate) fn created(&self) -> Vec<String> {
        self.created.lock().expect("created lock").clone()
    }

    pub(crate) fn batch_sizes(&self) -> Vec<usize> {
        self.batches
            .lock()
            .expect("batches lock")
            .iter()
            .map(Vec::len)
            .collect()
    }

    pub(crate) fn stored_ids(&self) -> Vec<String> {
        self.stored
            .lock()
            .expect("stored lock")
            .keys()
            .cloned()
            .collect()
    }

    pub(crate) fn stored(&self, id: &str) -> Option<IndexRecord> {
        self.stored.lock().expect("stored lock").get(id).cloned()
    }
}

#[async_trait]
impl VectorStore for MemoryStore {
    async fn list_indexes(&self) -> Result<Vec<String>, PineconeError> {
        Ok(self
            .indexes
            .lock()
            .expect("indexes lock")
            .iter()
            .cloned()
            .collect())
    }

    async fn create_index(&self, spec: &IndexSpec) -> Result<(), PineconeError> {
        self.indexes
            .lock()
            .expect("indexes lock")
            .insert(spec.name.clone());
        self.created
            .lock()
            .expect("created lock")
            .push(spec.name.clone());
        Ok(())
    }

    async fn describe_index_stats(&self, _index: &str) -> Result<IndexStats, PineconeError> {
        Ok(IndexStats {
            total_vector_count: self.stored.lock().expect("stored lock").len() as u64,
            dimension: Some(3),
        })
    }

    async fn upsert(&self, _index: &str, records: &[IndexRecord]) -> Result<usize, PineconeError> {
        let mut batches = self.batches.lock().expect("batches lock");
        if self.fail_on_upsert == Some(batches.len() + 1) {
            return Err(PineconeError::UnexpectedStatus {
                status: StatusCode::BAD_REQUEST,
                body: "rejected".into(),
            });
        }
        batches.push(records.iter().map(|record| record.id.clone()).collect());
        let mut stored = self.stored.lock().expect("stored lock");
        for record in records {
            stored.insert(record.id.clone(), record.clone());
        }
        Ok(records.len())
    }
}

/// Embedder returning a fixed vector. Like the hosted APIs it rejects blank input, and it
/// also fails for texts containing a marker.
pub(crate) struct StubEmbedder {
    fail_marker: Option<String>,
    calls: AtomicUsize,
}

impl StubEmbedder {
    pub(crate) fn new() -> Self {
        Self {
            fail_marker: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn failing_on(marker: &str) -> Self {
        Self {
            fail_marker: Some(marker.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingClient for StubEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if text.trim().is_empty() {
            return Err(EmbeddingClientError::UnexpectedStatus {
                status: StatusCode::BAD_REQUEST,
                body: "input must not be empty".into(),
            });
        }
        if let Some(marker) = &self.fail_marker
            && text.contains(marker.as_str())
        {
            return Err(EmbeddingClientError::InvalidResponse("stub failure".into()));
        }
        Ok(vec![text.chars().count() as f32, 0.0, 1.0])
    }

    fn model(&self) -> &str {
        "stub"
    }
}
