//! Document chunking.
//!
//! Provides the `Chunker` trait and the fixed-window implementation used for
//! brand documents: windows of `chunk_size` characters, each starting
//! `chunk_size - overlap` characters after the previous one.

use serde::Serialize;

use super::config::ChunkingConfig;

/// A raw chunk before it is embedded and stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawChunk {
    /// Zero-based position in the chunk sequence.
    pub index: usize,

    /// Character range in the trimmed source text (start, end).
    pub char_range: (usize, usize),

    /// The text content of this chunk.
    pub content: String,
}

impl RawChunk {
    /// Get character count.
    pub fn char_count(&self) -> usize {
        self.char_range.1 - self.char_range.0
    }

    /// Get byte length of the content.
    pub fn byte_len(&self) -> usize {
        self.content.len()
    }
}

/// Trait for document chunking strategies.
pub trait Chunker: Send + Sync {
    /// Split document content into chunks.
    fn chunk(&self, content: &str, config: &ChunkingConfig) -> Vec<RawChunk>;
}

/// Fixed-size sliding window chunker with overlap.
///
/// Algorithm:
/// 1. Trim surrounding whitespace; empty input yields no chunks
/// 2. A zero window size yields the whole text as one chunk
/// 3. Emit windows left to right, advancing by `config.step()`
/// 4. Stop as soon as a window reaches the end of the text
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowChunker;

impl WindowChunker {
    /// Create a new window chunker.
    pub fn new() -> Self {
        Self
    }
}

impl Chunker for WindowChunker {
    fn chunk(&self, content: &str, config: &ChunkingConfig) -> Vec<RawChunk> {
        let text = content.trim();
        if text.is_empty() {
            return Vec::new();
        }

        // Byte offset of every char boundary, plus the end of the text
        let boundaries: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let char_len = boundaries.len() - 1;

        if config.chunk_size == 0 {
            return vec![RawChunk {
                index: 0,
                char_range: (0, char_len),
                content: text.to_string(),
            }];
        }

        let step = config.step();
        let mut chunks = Vec::with_capacity(char_len / step + 1);
        let mut start = 0;

        while start < char_len {
            let end = (start + config.chunk_size).min(char_len);
            chunks.push(RawChunk {
                index: chunks.len(),
                char_range: (start, end),
                content: text[boundaries[start]..boundaries[end]].to_string(),
            });

            if end == char_len {
                break;
            }
            start += step;
        }

        chunks
    }
}

/// Split `text` into overlapping windows and return just the strings.
///
/// Parameters are not validated here. With `overlap >= chunk_size` the step
/// clamps to one character and every start position yields a window, so
/// callers taking sizes from outside should run [`ChunkingConfig::validate`]
/// first.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    WindowChunker
        .chunk(text, &ChunkingConfig::new(chunk_size, overlap))
        .into_iter()
        .map(|c| c.content)
        .collect()
}
