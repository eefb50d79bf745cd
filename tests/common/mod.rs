//! Fakes shared by the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use brand_memory::documents::{
    BrandMatch, DocumentId, Metadata, NewChunk, NewDocument, SimilarityQuery,
};
use brand_memory::{BackendKind, BrandMemoryError, BrandStore, EmbeddingBackend, Result};
use parking_lot::Mutex;
use serde_json::json;

/// Deterministic embedder: each text becomes a small vector derived from its
/// bytes, so equal texts get equal vectors.
#[derive(Debug, Default)]
pub struct HashEmbedder {
    calls: Mutex<Vec<Vec<String>>>,
}

pub fn hash_vector(text: &str) -> Vec<f64> {
    let mut v = vec![0.0; 4];
    for (i, b) in text.bytes().enumerate() {
        v[i % 4] += f64::from(b) / 255.0;
    }
    let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm > 0.0 {
        v.iter_mut().for_each(|x| *x /= norm);
    }
    v
}

impl HashEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every batch passed to `embed`, in call order.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl EmbeddingBackend for HashEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f64>>> {
        self.calls.lock().push(texts.to_vec());
        Ok(texts.iter().map(|t| hash_vector(t)).collect())
    }

    fn model_name(&self) -> &str {
        "hash-test"
    }

    fn dimensions(&self) -> usize {
        4
    }
}

/// Embedder whose backend is always down.
#[derive(Debug, Default)]
pub struct FailingEmbedder;

#[async_trait]
impl EmbeddingBackend for FailingEmbedder {
    async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f64>>> {
        Err(BrandMemoryError::backend(
            BackendKind::Embedding,
            Some(503),
            "service unavailable",
        ))
    }

    fn model_name(&self) -> &str {
        "failing-test"
    }

    fn dimensions(&self) -> usize {
        4
    }
}

/// Store that records every call and answers searches with canned rows.
#[derive(Debug, Default)]
pub struct RecordingStore {
    pub documents: Mutex<Vec<NewDocument>>,
    pub chunk_batches: Mutex<Vec<Vec<NewChunk>>>,
    pub queries: Mutex<Vec<SimilarityQuery>>,
    pub canned_matches: Vec<BrandMatch>,
    /// Simulate an insert that returns no row.
    pub drop_document_ids: bool,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_matches(matches: Vec<BrandMatch>) -> Self {
        Self {
            canned_matches: matches,
            ..Self::default()
        }
    }

    pub fn all_chunks(&self) -> Vec<NewChunk> {
        self.chunk_batches.lock().iter().flatten().cloned().collect()
    }
}

#[async_trait]
impl BrandStore for RecordingStore {
    async fn insert_document(&self, document: &NewDocument) -> Result<Option<DocumentId>> {
        let mut documents = self.documents.lock();
        documents.push(document.clone());
        if self.drop_document_ids {
            return Ok(None);
        }
        Ok(Some(DocumentId::new(format!("doc-{}", documents.len()))))
    }

    async fn insert_chunks(&self, chunks: &[NewChunk]) -> Result<()> {
        self.chunk_batches.lock().push(chunks.to_vec());
        Ok(())
    }

    async fn similarity_search(&self, query: &SimilarityQuery) -> Result<Vec<BrandMatch>> {
        self.queries.lock().push(query.clone());
        Ok(self.canned_matches.clone())
    }
}

pub fn brand_match(content: &str, similarity: f64) -> BrandMatch {
    BrandMatch {
        id: None,
        document_id: Some(json!("doc-1")),
        chunk_index: Some(0),
        content: content.to_string(),
        metadata: Metadata::new(),
        similarity,
        extra: Metadata::new(),
    }
}

pub fn shared<T>(value: T) -> Arc<T> {
    Arc::new(value)
}
