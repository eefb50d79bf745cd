//! Persistence backends for brand documents and chunks.
//!
//! The engine depends only on [`BrandStore`]. Two implementations ship:
//! - [`PostgrestStore`]: Supabase / PostgREST tables plus a match RPC
//! - [`InMemoryStore`]: process-local, used by tests and local runs

pub mod memory;
pub mod postgrest;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{StoreBackend, StoreConfig};
use crate::documents::{BrandMatch, DocumentId, NewChunk, NewDocument, SimilarityQuery};
use crate::error::Result;

pub use memory::InMemoryStore;
pub use postgrest::PostgrestStore;

/// Row store with vector similarity search.
#[async_trait]
pub trait BrandStore: Send + Sync {
    /// Insert one document row.
    ///
    /// Returns the backend-assigned id, or `None` when the insert came back
    /// without a row.
    async fn insert_document(&self, document: &NewDocument) -> Result<Option<DocumentId>>;

    /// Insert all chunk rows of a document in one batch.
    async fn insert_chunks(&self, chunks: &[NewChunk]) -> Result<()>;

    /// Nearest-neighbour search over stored chunks of one tenant.
    ///
    /// Ranking and threshold filtering are the backend's job.
    async fn similarity_search(&self, query: &SimilarityQuery) -> Result<Vec<BrandMatch>>;
}

/// Open the store selected in settings.
pub fn open_store(config: &StoreConfig) -> Result<Arc<dyn BrandStore>> {
    match config.backend {
        StoreBackend::Postgrest => Ok(Arc::new(PostgrestStore::from_config(config)?)),
        StoreBackend::Memory => {
            tracing::warn!("[store] using in-memory store, data is lost on exit");
            Ok(Arc::new(InMemoryStore::new()))
        }
    }
}
