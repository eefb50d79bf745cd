//! Brand knowledge memory: chunk, embed, store and retrieve per-client
//! brand documents for content-generating agents.

pub mod config;
pub mod documents;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod logging;
pub mod storage;
pub mod tools;
pub mod vector;

pub mod cli;

#[cfg(feature = "http-server")]
pub mod api;

pub use config::Settings;
pub use documents::{BrandMatch, ChunkingConfig, DocumentId, IngestOutcome, chunk_text};
pub use embedding::{EmbeddingBackend, OpenAiEmbedder};
pub use engine::{BrandMemory, IngestRequest, SearchOptions};
pub use error::{BackendKind, BrandMemoryError, Result};
pub use storage::{BrandStore, InMemoryStore, PostgrestStore};
pub use tools::{BrandTool, ToolInput, ToolOutput};
pub use vector::{decode_vector, encode_vector};
