//! Brand memory engine.
//!
//! Ingestion: persist document → chunk → embed all chunks in one batch →
//! encode vectors → persist chunk rows. Search: embed the query → encode →
//! delegate ranking to the store's similarity search.
//!
//! A failure after the document row is written leaves that document without
//! chunks; nothing is rolled back.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{SearchConfig, Settings};
use crate::documents::{
    BrandMatch, Chunker, ChunkingConfig, DEFAULT_SOURCE_TYPE, IngestOutcome, Metadata,
    NewChunk, NewDocument, RawChunk, SimilarityQuery, WindowChunker,
};
use crate::embedding::{EmbeddingBackend, OpenAiEmbedder};
use crate::error::{BackendKind, BrandMemoryError, Result};
use crate::storage::{BrandStore, open_store};
use crate::vector::encode_vector;

/// Chunk metadata key holding the document title.
pub const TITLE_KEY: &str = "title";
/// Chunk metadata key holding the chunk length in characters.
pub const LENGTH_KEY: &str = "length";

/// Input for one ingestion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestRequest {
    pub client_id: String,
    #[serde(default)]
    pub title: Option<String>,
    pub content: String,
    #[serde(default)]
    pub source_type: Option<String>,
    #[serde(default)]
    pub source_ref: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl IngestRequest {
    /// Minimal request: tenant and body, everything else defaulted.
    pub fn new(client_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Search parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Maximum number of matches.
    pub match_count: u32,
    /// Minimum similarity score, passed to the backend as given.
    pub similarity_threshold: f64,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchConfig::default().into()
    }
}

impl From<SearchConfig> for SearchOptions {
    fn from(config: SearchConfig) -> Self {
        Self {
            match_count: config.match_count,
            similarity_threshold: config.similarity_threshold,
        }
    }
}

/// Orchestrates chunking, embedding and storage for brand documents.
pub struct BrandMemory {
    embedder: Arc<dyn EmbeddingBackend>,
    store: Arc<dyn BrandStore>,
    chunker: Box<dyn Chunker>,
    chunking: ChunkingConfig,
    search_defaults: SearchOptions,
}

impl std::fmt::Debug for BrandMemory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrandMemory")
            .field("model", &self.embedder.model_name())
            .field("dimensions", &self.embedder.dimensions())
            .field("chunking", &self.chunking)
            .field("search_defaults", &self.search_defaults)
            .finish()
    }
}

/// Chunk metadata: document metadata overlaid with title and length.
fn chunk_metadata(document: &Metadata, title: Option<&str>, chunk: &RawChunk) -> Metadata {
    let mut metadata = document.clone();
    metadata.insert(
        TITLE_KEY.to_string(),
        title.map_or(Value::Null, |t| Value::String(t.to_string())),
    );
    metadata.insert(LENGTH_KEY.to_string(), Value::from(chunk.char_count()));
    metadata
}

impl BrandMemory {
    /// Create an engine with default chunking (1200/200) and search (8/0.70).
    pub fn new(embedder: Arc<dyn EmbeddingBackend>, store: Arc<dyn BrandStore>) -> Self {
        Self {
            embedder,
            store,
            chunker: Box::new(WindowChunker::new()),
            chunking: ChunkingConfig::default(),
            search_defaults: SearchOptions::default(),
        }
    }

    /// Wire the configured embedding backend and store.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        settings.validate().map_err(BrandMemoryError::Configuration)?;

        let embedder = Arc::new(OpenAiEmbedder::from_config(&settings.embedding)?);
        let store = open_store(&settings.store)?;

        Ok(Self::new(embedder, store)
            .with_chunking(settings.chunking.clone())
            .with_search_defaults(settings.search.clone().into()))
    }

    pub fn with_chunking(mut self, chunking: ChunkingConfig) -> Self {
        self.chunking = chunking;
        self
    }

    pub fn with_search_defaults(mut self, defaults: SearchOptions) -> Self {
        self.search_defaults = defaults;
        self
    }

    pub fn with_chunker(mut self, chunker: Box<dyn Chunker>) -> Self {
        self.chunker = chunker;
        self
    }

    pub fn chunking(&self) -> &ChunkingConfig {
        &self.chunking
    }

    pub fn search_defaults(&self) -> SearchOptions {
        self.search_defaults
    }

    /// Reject chunking where windows would not advance past their overlap.
    fn checked_chunking(&self) -> Result<&ChunkingConfig> {
        self.chunking
            .validate()
            .map_err(BrandMemoryError::Configuration)?;
        Ok(&self.chunking)
    }

    /// Ingest one document and return its id and chunk count.
    ///
    /// Content that trims to nothing still creates the document row and
    /// reports zero chunks. An invalid chunking config fails before anything
    /// is written.
    pub async fn ingest(&self, request: IngestRequest) -> Result<IngestOutcome> {
        let chunking = self.checked_chunking()?;
        let IngestRequest {
            client_id,
            title,
            content,
            source_type,
            source_ref,
            created_by,
            metadata,
        } = request;

        let document = NewDocument {
            client_id,
            title,
            source_type: source_type.unwrap_or_else(|| DEFAULT_SOURCE_TYPE.to_string()),
            source_ref,
            content,
            metadata,
            created_by,
        };

        let document_id = self.store.insert_document(&document).await?.ok_or_else(|| {
            BrandMemoryError::Persistence("document insert returned no id".to_string())
        })?;
        crate::debug_event!(
            "engine",
            "document persisted",
            "{document_id} for client {}",
            document.client_id
        );

        let chunks = self.chunker.chunk(&document.content, chunking);
        if chunks.is_empty() {
            crate::log_event!("engine", "ingested", "{document_id} with no chunks");
            return Ok(IngestOutcome {
                document_id,
                chunks_created: 0,
            });
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let vectors = self.embedder.embed(&texts).await?;
        if vectors.len() != chunks.len() {
            return Err(BrandMemoryError::backend(
                BackendKind::Embedding,
                None,
                format!(
                    "returned {} embeddings for {} chunks",
                    vectors.len(),
                    chunks.len()
                ),
            ));
        }
        crate::debug_event!("engine", "embedded", "{} chunks", vectors.len());

        let rows: Vec<NewChunk> = chunks
            .iter()
            .zip(&vectors)
            .map(|(chunk, vector)| NewChunk {
                client_id: document.client_id.clone(),
                document_id: document_id.clone(),
                chunk_index: chunk.index,
                content: chunk.content.clone(),
                metadata: chunk_metadata(&document.metadata, document.title.as_deref(), chunk),
                embedding: encode_vector(vector),
            })
            .collect();

        self.store.insert_chunks(&rows).await?;

        crate::log_event!("engine", "ingested", "{document_id} with {} chunks", rows.len());
        Ok(IngestOutcome {
            document_id,
            chunks_created: rows.len(),
        })
    }

    /// Retrieve the stored chunks most similar to `query` for one tenant.
    ///
    /// Options go to the backend untouched; no local clamping or re-ranking.
    pub async fn search(
        &self,
        client_id: &str,
        query: &str,
        options: SearchOptions,
    ) -> Result<Vec<BrandMatch>> {
        let mut vectors = self.embedder.embed(&[query.to_string()]).await?;
        let vector = match (vectors.pop(), vectors.is_empty()) {
            (Some(vector), true) => vector,
            _ => {
                return Err(BrandMemoryError::backend(
                    BackendKind::Embedding,
                    None,
                    "expected exactly one embedding for the query",
                ));
            }
        };

        let query = SimilarityQuery {
            client_id: client_id.to_string(),
            query_embedding: encode_vector(&vector),
            match_count: options.match_count,
            similarity_threshold: options.similarity_threshold,
        };

        let matches = self.store.similarity_search(&query).await?;
        crate::debug_event!(
            "engine",
            "search",
            "{} matches for client {client_id}",
            matches.len()
        );
        Ok(matches)
    }

    /// [`search`](Self::search) with the configured default options.
    pub async fn search_with_defaults(
        &self,
        client_id: &str,
        query: &str,
    ) -> Result<Vec<BrandMatch>> {
        self.search(client_id, query, self.search_defaults).await
    }

    /// Split content the same way ingestion would, without touching backends.
    pub fn preview_chunks(&self, content: &str) -> Result<Vec<RawChunk>> {
        let chunking = self.checked_chunking()?;
        Ok(self.chunker.chunk(content, chunking))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chunk_metadata_overrides_document_keys() {
        let mut document = Metadata::new();
        document.insert("title".to_string(), json!("stale"));
        document.insert("campaign".to_string(), json!("summer"));

        let chunk = RawChunk {
            index: 0,
            char_range: (0, 5),
            content: "hello".to_string(),
        };

        let metadata = chunk_metadata(&document, Some("Voice guide"), &chunk);
        assert_eq!(metadata.get("title"), Some(&json!("Voice guide")));
        assert_eq!(metadata.get("campaign"), Some(&json!("summer")));
        assert_eq!(metadata.get("length"), Some(&json!(5)));
    }

    #[test]
    fn test_chunk_metadata_without_title() {
        let chunk = RawChunk {
            index: 2,
            char_range: (10, 13),
            content: "abc".to_string(),
        };
        let metadata = chunk_metadata(&Metadata::new(), None, &chunk);
        assert_eq!(metadata.get("title"), Some(&Value::Null));
        assert_eq!(metadata.get("length"), Some(&json!(3)));
    }

    #[test]
    fn test_search_options_default() {
        let options = SearchOptions::default();
        assert_eq!(options.match_count, 8);
        assert!((options.similarity_threshold - 0.70).abs() < f64::EPSILON);
    }
}
