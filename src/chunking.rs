//! Line-based chunking of source files.
//!
//! Files are split into contiguous runs of lines whose combined character count stays within
//! a threshold. Characters are Unicode scalar values; the `\n` separators and the `\r` of a
//! CRLF line ending are not part of a line. A single line longer than the threshold becomes a
//! chunk on its own (blank lines around it may join it); it is never split.
//! Chunks of one file are ordered, disjoint, and together cover every line of the input.

/// Default character threshold per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// A contiguous run of lines taken from one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Lines of the chunk joined with `\n`.
    pub text: String,
    /// First line, 1-based and inclusive.
    pub start_line: usize,
    /// Last line, inclusive.
    pub end_line: usize,
    /// Sum of the character counts of the chunk's lines.
    pub char_count: usize,
}

impl Chunk {
    /// Number of lines covered by the chunk.
    pub fn line_count(&self) -> usize {
        self.end_line + 1 - self.start_line
    }
}

/// Split `content` into line-run chunks bounded by `threshold` characters.
///
/// Returns an empty vector when the content is empty or whitespace only. Otherwise a line is
/// appended to the open chunk unless it is non-empty and would push a chunk that already holds
/// characters past `threshold`, in which case the open chunk is emitted first. Empty lines
/// never open a chunk of their own, so no chunk is text-free. The last open chunk is always
/// emitted, trailing blank lines included.
pub fn chunk_lines(content: &str, threshold: usize) -> Vec<Chunk> {
    if content.trim().is_empty() {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut buffer: Vec<&str> = Vec::new();
    let mut buffer_chars = 0usize;
    let mut start_line = 1usize;

    for (index, line) in content.split('\n').enumerate() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let line_number = index + 1;
        let line_chars = line.chars().count();

        if line_chars > 0 && buffer_chars > 0 && buffer_chars + line_chars > threshold {
            chunks.push(Chunk {
                text: buffer.join("\n"),
                start_line,
                end_line: line_number - 1,
                char_count: buffer_chars,
            });
            buffer.clear();
            buffer_chars = 0;
            start_line = line_number;
        }

        buffer.push(line);
        buffer_chars += line_chars;
    }

    if !buffer.is_empty() {
        let end_line = start_line + buffer.len() - 1;
        chunks.push(Chunk {
            text: buffer.join("\n"),
            start_line,
            end_line,
            char_count: buffer_chars,
        });
    }

    chunks
}
