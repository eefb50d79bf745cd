//! OpenAI-compatible embeddings client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::EmbeddingBackend;
use crate::config::EmbeddingConfig;
use crate::error::{BackendKind, BrandMemoryError, Result};

/// Async embeddings client for `/embeddings` endpoints.
///
/// Credentials are optional at construction; a missing key only fails once a
/// non-empty batch is embedded.
pub struct OpenAiEmbedder {
    client: Client,
    api_key: Option<SecretString>,
    endpoint: String,
    model: String,
    dimensions: usize,
}

impl std::fmt::Debug for OpenAiEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiEmbedder")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("dimensions", &self.dimensions)
            .field("has_api_key", &self.api_key.is_some())
            .finish()
    }
}

fn embeddings_endpoint(base_url: &str) -> String {
    let normalized = base_url.trim_end_matches('/');
    if normalized.ends_with("/embeddings") {
        normalized.to_string()
    } else {
        format!("{normalized}/embeddings")
    }
}

impl OpenAiEmbedder {
    /// Build a client from embedding settings.
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                BrandMemoryError::Configuration(format!("failed to build embedding HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            api_key: config
                .api_key
                .as_ref()
                .filter(|k| !k.trim().is_empty())
                .map(|k| SecretString::new(k.trim().to_string())),
            endpoint: embeddings_endpoint(&config.base_url),
            model: config.model.clone(),
            dimensions: config.dimensions,
        })
    }

    /// Full URL requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f64>,
    index: usize,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Prefer the provider's `error.message`, fall back to the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

/// Restore input order from index-tagged entries.
fn into_ordered(mut data: Vec<EmbeddingData>, expected: usize) -> Result<Vec<Vec<f64>>> {
    data.sort_by_key(|entry| entry.index);

    let in_range = data.iter().enumerate().all(|(i, entry)| entry.index == i);
    if data.len() != expected || !in_range {
        return Err(BrandMemoryError::backend(
            BackendKind::Embedding,
            None,
            format!(
                "returned {} embeddings for {} inputs",
                data.len(),
                expected
            ),
        ));
    }

    Ok(data.into_iter().map(|entry| entry.embedding).collect())
}

/// Every vector must have the configured number of components.
fn check_dimensions(vectors: &[Vec<f64>], expected: usize) -> Result<()> {
    match vectors.iter().position(|v| v.len() != expected) {
        Some(i) => Err(BrandMemoryError::backend(
            BackendKind::Embedding,
            None,
            format!(
                "embedding {i} has {} dimensions, expected {expected}",
                vectors[i].len()
            ),
        )),
        None => Ok(()),
    }
}

#[async_trait]
impl EmbeddingBackend for OpenAiEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f64>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let api_key = self.api_key.as_ref().ok_or_else(|| {
            BrandMemoryError::Configuration(
                "embedding API key is not set (embedding.api_key or OPENAI_API_KEY)".to_string(),
            )
        })?;

        crate::debug_event!("embedding", "request", "{} inputs to {}", texts.len(), self.model);

        let request = EmbeddingRequest {
            model: &self.model,
            input: texts,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| BrandMemoryError::transport(BackendKind::Embedding, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            tracing::warn!("[embedding] request failed with {status}");
            return Err(BrandMemoryError::backend(
                BackendKind::Embedding,
                Some(status.as_u16()),
                error_message(&body),
            ));
        }

        let parsed: EmbeddingResponse = response.json().await.map_err(|e| {
            BrandMemoryError::backend(
                BackendKind::Embedding,
                Some(status.as_u16()),
                format!("failed to parse embedding response: {e}"),
            )
        })?;

        let vectors = into_ordered(parsed.data, texts.len())?;
        check_dimensions(&vectors, self.dimensions)?;
        Ok(vectors)
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
