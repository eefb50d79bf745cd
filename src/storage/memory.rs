//! Process-local store.
//!
//! Holds documents and chunks in memory and answers similarity queries the
//! way the SQL match function does: cosine similarity, tenant scoping,
//! threshold filter, best first, capped at `match_count`.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use serde_json::Value;
use uuid::Uuid;

use super::BrandStore;
use crate::documents::{BrandMatch, Document, DocumentId, NewChunk, NewDocument, SimilarityQuery};
use crate::error::{BackendKind, BrandMemoryError, Result};
use crate::vector::{cosine_similarity, decode_vector};

/// A stored chunk with its decoded embedding.
#[derive(Debug, Clone)]
pub struct StoredChunk {
    pub id: u64,
    pub row: NewChunk,
    pub vector: Vec<f64>,
}

#[derive(Debug, Default)]
struct State {
    documents: Vec<Document>,
    chunks: Vec<StoredChunk>,
    next_chunk_id: u64,
}

/// In-memory [`BrandStore`].
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all stored documents.
    pub fn documents(&self) -> Vec<Document> {
        self.state.read().documents.clone()
    }

    /// Snapshot of the chunks belonging to one document, in index order.
    pub fn chunks_for(&self, document_id: &DocumentId) -> Vec<StoredChunk> {
        let mut chunks: Vec<StoredChunk> = self
            .state
            .read()
            .chunks
            .iter()
            .filter(|c| &c.row.document_id == document_id)
            .cloned()
            .collect();
        chunks.sort_by_key(|c| c.row.chunk_index);
        chunks
    }

    /// Total number of stored chunks across all tenants.
    pub fn chunk_count(&self) -> usize {
        self.state.read().chunks.len()
    }
}

fn invalid_row(message: String) -> BrandMemoryError {
    BrandMemoryError::backend(BackendKind::Persistence, Some(400), message)
}

#[async_trait]
impl BrandStore for InMemoryStore {
    async fn insert_document(&self, document: &NewDocument) -> Result<Option<DocumentId>> {
        let id = DocumentId::new(Uuid::new_v4().to_string());
        let stored = Document {
            id: id.clone(),
            client_id: document.client_id.clone(),
            title: document.title.clone(),
            source_type: document.source_type.clone(),
            source_ref: document.source_ref.clone(),
            content: document.content.clone(),
            metadata: document.metadata.clone(),
            created_by: document.created_by.clone(),
            created_at: Utc::now(),
        };

        self.state.write().documents.push(stored);
        Ok(Some(id))
    }

    async fn insert_chunks(&self, chunks: &[NewChunk]) -> Result<()> {
        // Decode everything first so a bad row leaves the store untouched
        let decoded = chunks
            .iter()
            .map(|row| {
                decode_vector(&row.embedding)
                    .map(|vector| (row.clone(), vector))
                    .map_err(|e| invalid_row(format!("chunk {}: {e}", row.chunk_index)))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut state = self.state.write();
        if let Some((orphan, _)) = decoded
            .iter()
            .find(|(row, _)| !state.documents.iter().any(|d| d.id == row.document_id))
        {
            return Err(invalid_row(format!(
                "chunk {} references unknown document {}",
                orphan.chunk_index, orphan.document_id
            )));
        }

        for (row, vector) in decoded {
            state.next_chunk_id += 1;
            let id = state.next_chunk_id;
            state.chunks.push(StoredChunk { id, row, vector });
        }
        Ok(())
    }

    async fn similarity_search(&self, query: &SimilarityQuery) -> Result<Vec<BrandMatch>> {
        let query_vector = decode_vector(&query.query_embedding)
            .map_err(|e| invalid_row(format!("query embedding: {e}")))?;

        let state = self.state.read();
        let mut scored: Vec<(f64, &StoredChunk)> = state
            .chunks
            .iter()
            .filter(|c| c.row.client_id == query.client_id)
            .map(|c| (cosine_similarity(&query_vector, &c.vector), c))
            .filter(|(score, _)| *score >= query.similarity_threshold)
            .collect();

        // Sort by similarity descending
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored.truncate(query.match_count as usize);

        Ok(scored
            .into_iter()
            .map(|(similarity, chunk)| BrandMatch {
                id: Some(Value::from(chunk.id)),
                document_id: Some(Value::from(chunk.row.document_id.as_str())),
                chunk_index: Some(chunk.row.chunk_index as i64),
                content: chunk.row.content.clone(),
                metadata: chunk.row.metadata.clone(),
                similarity,
                extra: Default::default(),
            })
            .collect())
    }
}
