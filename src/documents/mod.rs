//! Brand documents: chunking and the row types exchanged with storage.
//!
//! This module provides:
//! - Fixed-window chunking with overlap
//! - Document, chunk and match types
//! - Chunking configuration

pub mod chunker;
pub mod config;
pub mod types;

pub use chunker::{Chunker, RawChunk, WindowChunker, chunk_text};
pub use config::ChunkingConfig;
pub use types::{
    BrandMatch, DEFAULT_SOURCE_TYPE, Document, DocumentId, IngestOutcome, Metadata, NewChunk,
    NewDocument, SimilarityQuery,
};
