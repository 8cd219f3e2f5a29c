use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing one indexing run.
#[derive(Default)]
pub struct IndexingMetrics {
    files_processed: AtomicU64,
    files_skipped: AtomicU64,
    files_failed: AtomicU64,
    chunks_indexed: AtomicU64,
    chunks_failed: AtomicU64,
}

impl IndexingMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a processed file and the number of chunks it contributed.
    pub fn record_file(&self, chunk_count: u64) {
        self.files_processed.fetch_add(1, Ordering::Relaxed);
        self.chunks_indexed.fetch_add(chunk_count, Ordering::Relaxed);
    }

    /// Record a file skipped because it held no content.
    pub fn record_skipped_file(&self) {
        self.files_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a file that could not be read.
    pub fn record_failed_file(&self) {
        self.files_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a chunk dropped because its embedding failed.
    pub fn record_chunk_failure(&self) {
        self.chunks_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            files_processed: self.files_processed.load(Ordering::Relaxed),
            files_skipped: self.files_skipped.load(Ordering::Relaxed),
            files_failed: self.files_failed.load(Ordering::Relaxed),
            chunks_indexed: self.chunks_indexed.load(Ordering::Relaxed),
            chunks_failed: self.chunks_failed.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of the run counters used for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Files read and chunked (including those whose chunks all failed to embed).
    pub files_processed: u64,
    /// Files skipped because they were empty or whitespace only.
    pub files_skipped: u64,
    /// Files that could not be read.
    pub files_failed: u64,
    /// Chunks embedded and handed to the index writer.
    pub chunks_indexed: u64,
    /// Chunks dropped after an embedding failure.
    pub chunks_failed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_files_and_chunks() {
        let metrics = IndexingMetrics::new();
        metrics.record_file(2);
        metrics.record_file(3);
        metrics.record_skipped_file();
        metrics.record_failed_file();
        metrics.record_chunk_failure();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.files_processed, 2);
        assert_eq!(snapshot.chunks_indexed, 5);
        assert_eq!(snapshot.files_skipped, 1);
        assert_eq!(snapshot.files_failed, 1);
        assert_eq!(snapshot.chunks_failed, 1);
    }

    #[test]
    fn snapshot_starts_empty() {
        assert_eq!(IndexingMetrics::new().snapshot(), MetricsSnapshot::default());
    }
}
