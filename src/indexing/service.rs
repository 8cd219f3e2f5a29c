//! Indexing service driving one full pass over a source tree.

use super::writer::{IndexLifecycle, IndexWriter};
use super::{IndexingError, IndexingOptions, IndexingReport};
use crate::chunking::chunk_lines;
use crate::embedding::EmbeddingClient;
use crate::metrics::IndexingMetrics;
use crate::pinecone::VectorStore;
use crate::record::IndexRecord;
use crate::selector::{FileCandidate, select_files};

/// Walks the configured root and writes one vector per chunk into the index.
///
/// The service borrows its embedding client and vector store so callers decide how they are
/// built; tests hand in in-memory doubles.
pub struct CodebaseIndexer<'a> {
    embedder: &'a dyn EmbeddingClient,
    store: &'a dyn VectorStore,
    options: IndexingOptions,
    metrics: IndexingMetrics,
}

impl<'a> CodebaseIndexer<'a> {
    /// Build an indexer over the given collaborators.
    pub fn new(
        embedder: &'a dyn EmbeddingClient,
        store: &'a dyn VectorStore,
        options: IndexingOptions,
    ) -> Self {
        Self {
            embedder,
            store,
            options,
            metrics: IndexingMetrics::new(),
        }
    }

    /// Run the pipeline to completion.
    ///
    /// Chunk embedding failures and unreadable files are logged and skipped. Index failures
    /// abort the run. Records buffered before the end are always flushed, and the returned
    /// report carries a vector count fetched after that final flush.
    pub async fn run(&self) -> Result<IndexingReport, IndexingError> {
        if !self.options.root.is_dir() {
            return Err(IndexingError::MissingRoot(self.options.root.clone()));
        }

        let (mut writer, lifecycle) =
            IndexWriter::open(self.store, &self.options.index, self.options.batch_size).await?;
        let before = self
            .store
            .describe_index_stats(&self.options.index.name)
            .await?;
        tracing::info!(
            index = %self.options.index.name,
            vectors = before.total_vector_count,
            "Current vectors in index"
        );

        tracing::info!(
            root = %self.options.root.display(),
            model = %self.embedder.model(),
            "Scanning files"
        );
        let files: Vec<FileCandidate> =
            select_files(&self.options.root, &self.options.rules).collect();
        let total_files = files.len();
        tracing::info!(files = total_files, "Found files to index");

        for (position, file) in files.iter().enumerate() {
            tracing::info!(
                progress = %format_args!("{}/{}", position + 1, total_files),
                file = %file.relative_path,
                "Processing file"
            );
            self.index_file(file, &mut writer).await?;
        }

        let summary = writer.finish().await?;
        let after = self
            .store
            .describe_index_stats(&self.options.index.name)
            .await?;
        let metrics = self.metrics.snapshot();
        tracing::info!(
            files = metrics.files_processed,
            chunks = metrics.chunks_indexed,
            failed_chunks = metrics.chunks_failed,
            vectors = after.total_vector_count,
            "Indexing complete"
        );

        Ok(IndexingReport {
            index_name: self.options.index.name.clone(),
            embedding_model: self.embedder.model().to_string(),
            index_created: lifecycle == IndexLifecycle::Created,
            files_selected: total_files,
            metrics,
            batches_flushed: summary.batches_flushed,
            vectors_before: before.total_vector_count,
            vectors_after: after.total_vector_count,
        })
    }

    async fn index_file(
        &self,
        file: &FileCandidate,
        writer: &mut IndexWriter<'_>,
    ) -> Result<(), IndexingError> {
        let bytes = match tokio::fs::read(&file.path).await {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(file = %file.relative_path, error = %err, "Failed to read file");
                self.metrics.record_failed_file();
                return Ok(());
            }
        };
        let content = String::from_utf8_lossy(&bytes);
        if content.trim().is_empty() {
            tracing::info!(file = %file.relative_path, "Skipped empty file");
            self.metrics.record_skipped_file();
            return Ok(());
        }

        let chunks = chunk_lines(&content, self.options.chunk_size);
        let total_chunks = chunks.len();
        tracing::info!(file = %file.relative_path, chunks = total_chunks, "Chunked file");

        let mut indexed = 0u64;
        for (chunk_index, chunk) in chunks.iter().enumerate() {
            let vector = match self.embedder.embed(&chunk.text).await {
                Ok(vector) => vector,
                Err(err) => {
                    tracing::warn!(
                        file = %file.relative_path,
                        chunk = chunk_index,
                        error = %err,
                        "Failed to embed chunk"
                    );
                    self.metrics.record_chunk_failure();
                    continue;
                }
            };
            let record = IndexRecord::new(
                file,
                chunk,
                chunk_index,
                total_chunks,
                vector,
                self.options.preview_chars,
            );
            writer.push(record).await?;
            indexed += 1;
        }
        self.metrics.record_file(indexed);
        Ok(())
    }
}
