//! Batched writes into the remote index.

use crate::pinecone::{IndexSpec, PineconeError, VectorStore};
use crate::record::IndexRecord;

/// How the target index was found when the writer opened it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexLifecycle {
    /// The index already existed.
    Existing,
    /// The index was missing and has been created.
    Created,
}

/// Totals reported once the writer has been drained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterSummary {
    /// Number of upsert requests issued.
    pub batches_flushed: usize,
    /// Records sent across all batches.
    pub records_written: usize,
}

/// Accumulates records and upserts them in fixed-size batches.
///
/// A writer only exists for an index that is ready to accept writes; see [`IndexWriter::open`].
/// The tail of the last batch is written by [`IndexWriter::finish`], which consumes the writer.
pub struct IndexWriter<'a> {
    store: &'a dyn VectorStore,
    index_name: String,
    batch_size: usize,
    batch: Vec<IndexRecord>,
    summary: WriterSummary,
}

impl<'a> IndexWriter<'a> {
    /// Make sure the index described by `spec` exists, creating it if needed, and return a
    /// writer for it.
    pub async fn open(
        store: &'a dyn VectorStore,
        spec: &IndexSpec,
        batch_size: usize,
    ) -> Result<(Self, IndexLifecycle), PineconeError> {
        let existing = store.list_indexes().await?;
        let lifecycle = if existing.iter().any(|name| name == &spec.name) {
            tracing::info!(index = %spec.name, "Index exists");
            IndexLifecycle::Existing
        } else {
            tracing::info!(
                index = %spec.name,
                dimension = spec.dimension,
                cloud = %spec.placement.cloud,
                region = %spec.placement.region,
                "Creating index"
            );
            store.create_index(spec).await?;
            tracing::info!(index = %spec.name, "Index created");
            IndexLifecycle::Created
        };

        let batch_size = batch_size.max(1);
        let writer = Self {
            store,
            index_name: spec.name.clone(),
            batch_size,
            batch: Vec::with_capacity(batch_size),
            summary: WriterSummary::default(),
        };
        Ok((writer, lifecycle))
    }

    /// Records buffered but not yet upserted.
    pub fn pending(&self) -> usize {
        self.batch.len()
    }

    /// Buffer a record, flushing when the batch is full.
    ///
    /// Returns the size of the flushed batch when a flush happened.
    pub async fn push(&mut self, record: IndexRecord) -> Result<Option<usize>, PineconeError> {
        self.batch.push(record);
        if self.batch.len() >= self.batch_size {
            return self.flush().await.map(Some);
        }
        Ok(None)
    }

    /// Flush the remaining partial batch and report totals.
    pub async fn finish(mut self) -> Result<WriterSummary, PineconeError> {
        if !self.batch.is_empty() {
            let size = self.flush().await?;
            tracing::info!(index = %self.index_name, records = size, "Upserted final batch");
        }
        Ok(self.summary)
    }

    async fn flush(&mut self) -> Result<usize, PineconeError> {
        if self.batch.is_empty() {
            return Ok(0);
        }
        let size = self.batch.len();
        self.store.upsert(&self.index_name, &self.batch).await?;
        self.batch.clear();
        self.summary.batches_flushed += 1;
        self.summary.records_written += size;
        tracing::info!(
            index = %self.index_name,
            records = size,
            batch = self.summary.batches_flushed,
            "Upserted batch"
        );
        Ok(size)
    }
}
