//! Text embedding backends.
//!
//! The engine only sees [`EmbeddingBackend`]; [`OpenAiEmbedder`] talks to any
//! OpenAI-compatible `/embeddings` endpoint.

pub mod openai;

use async_trait::async_trait;

use crate::error::Result;

pub use openai::OpenAiEmbedder;

/// Converts text into fixed-dimension vectors.
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    /// Embed a batch of strings in one call.
    ///
    /// The output has one vector per input, in input order. An empty batch
    /// returns an empty result without contacting the backend.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f64>>>;

    /// Model identifier sent to the backend.
    fn model_name(&self) -> &str;

    /// Expected vector dimensionality.
    fn dimensions(&self) -> usize;
}
