//! Records persisted in the vector index.

use crate::chunking::Chunk;
use crate::selector::FileCandidate;
use serde::Serialize;

/// Default cap on the chunk text copied into metadata.
pub const DEFAULT_PREVIEW_CHARS: usize = 1000;

/// Metadata stored next to every vector. Only strings and integers, as the index requires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordMetadata {
    /// Final path component of the source file.
    pub file_name: String,
    /// Root-relative, `/`-separated source path.
    pub file_path: String,
    /// Source extension without the dot.
    pub file_type: String,
    /// Chunk text, truncated to the preview limit.
    pub content: String,
    /// First line of the chunk (1-based).
    pub start_line: usize,
    /// Last line of the chunk (inclusive).
    pub end_line: usize,
    /// Position of the chunk within its file (0-based).
    pub chunk_index: usize,
    /// Number of chunks produced for the file.
    pub total_chunks: usize,
}

/// One vector plus identity and metadata, ready for upsert.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexRecord {
    /// Deterministic identifier, unique per file path and chunk ordinal.
    pub id: String,
    /// Embedding vector.
    #[serde(rename = "values")]
    pub vector: Vec<f32>,
    /// Typed metadata payload.
    pub metadata: RecordMetadata,
}

impl IndexRecord {
    /// Assemble the record for chunk `chunk_index` of `total_chunks` taken from `file`.
    pub fn new(
        file: &FileCandidate,
        chunk: &Chunk,
        chunk_index: usize,
        total_chunks: usize,
        vector: Vec<f32>,
        preview_chars: usize,
    ) -> Self {
        Self {
            id: record_id(&file.relative_path, chunk_index),
            vector,
            metadata: RecordMetadata {
                file_name: file.file_name().to_string(),
                file_path: file.relative_path.clone(),
                file_type: file.extension.clone(),
                content: truncate_chars(&chunk.text, preview_chars).to_string(),
                start_line: chunk.start_line,
                end_line: chunk.end_line,
                chunk_index,
                total_chunks,
            },
        }
    }
}

/// Identifier of chunk `chunk_index` of the file at `relative_path`.
pub fn record_id(relative_path: &str, chunk_index: usize) -> String {
    format!("{relative_path}::chunk_{chunk_index}")
}

/// Longest prefix of `text` holding at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn candidate() -> FileCandidate {
        FileCandidate {
            path: PathBuf::from("./Controllers/StudentsController.cs"),
            relative_path: "Controllers/StudentsController.cs".into(),
            extension: "cs".into(),
            size: 2048,
        }
    }

    #[test]
    fn record_carries_identity_and_metadata() {
        let chunk = Chunk {
            text: "public class StudentsController".into(),
            start_line: 12,
            end_line: 30,
            char_count: 31,
        };
        let record = IndexRecord::new(&candidate(), &chunk, 2, 5, vec![0.5; 3], 1000);

        assert_eq!(record.id, "Controllers/StudentsController.cs::chunk_2");
        assert_eq!(record.metadata.file_name, "StudentsController.cs");
        assert_eq!(record.metadata.file_path, "Controllers/StudentsController.cs");
        assert_eq!(record.metadata.file_type, "cs");
        assert_eq!(record.metadata.start_line, 12);
        assert_eq!(record.metadata.end_line, 30);
        assert_eq!(record.metadata.chunk_index, 2);
        assert_eq!(record.metadata.total_chunks, 5);
    }

    #[test]
    fn preview_is_truncated_on_char_boundary() {
        let chunk = Chunk {
            text: "điểm số ".repeat(300),
            start_line: 1,
            end_line: 1,
            char_count: 2400,
        };
        let record = IndexRecord::new(&candidate(), &chunk, 0, 1, vec![0.0], 1000);
        assert_eq!(record.metadata.content.chars().count(), 1000);
        assert!(chunk.text.starts_with(&record.metadata.content));
    }

    #[test]
    fn truncate_keeps_short_text() {
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 3), "abc");
        assert_eq!(truncate_chars("abcd", 3), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn serializes_to_upsert_shape() {
        let chunk = Chunk {
            text: "x".into(),
            start_line: 1,
            end_line: 1,
            char_count: 1,
        };
        let record = IndexRecord::new(&candidate(), &chunk, 0, 1, vec![1.0, 2.0], 1000);
        let value = serde_json::to_value(&record).expect("json");
        assert_eq!(value["id"], "Controllers/StudentsController.cs::chunk_0");
        assert_eq!(value["values"], serde_json::json!([1.0, 2.0]));
        assert_eq!(value["metadata"]["file_type"], "cs");
        assert_eq!(value["metadata"]["total_chunks"], 1);
    }
}
