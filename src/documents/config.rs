//! Configuration types for document chunking.

use serde::{Deserialize, Serialize};

/// Configuration for splitting brand documents into chunks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Window size in characters. Zero disables splitting.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Characters shared between consecutive windows.
    #[serde(default = "default_overlap")]
    pub overlap: usize,
}

fn default_chunk_size() -> usize {
    1200
}

fn default_overlap() -> usize {
    200
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            overlap: default_overlap(),
        }
    }
}

impl ChunkingConfig {
    /// Create a config with explicit size and overlap.
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        Self {
            chunk_size,
            overlap,
        }
    }

    /// Distance between the starts of consecutive windows.
    ///
    /// Never zero, so chunking always advances even with a bad overlap.
    pub fn step(&self) -> usize {
        self.chunk_size.saturating_sub(self.overlap).max(1)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.chunk_size > 0 && self.overlap >= self.chunk_size {
            return Err(format!(
                "overlap ({}) must be less than chunk_size ({})",
                self.overlap, self.chunk_size
            ));
        }

        Ok(())
    }
}
