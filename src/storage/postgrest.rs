//! Supabase / PostgREST persistence backend.
//!
//! Tables are written through `POST /rest/v1/{table}` and similarity search
//! goes through `POST /rest/v1/rpc/{function}`. The service key travels both
//! as the `apikey` header and as a bearer token.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;

use super::BrandStore;
use crate::config::StoreConfig;
use crate::documents::{BrandMatch, DocumentId, NewChunk, NewDocument, SimilarityQuery};
use crate::error::{BackendKind, BrandMemoryError, Result};

/// Persistence over a PostgREST endpoint.
pub struct PostgrestStore {
    client: Client,
    base_url: Option<String>,
    api_key: Option<SecretString>,
    documents_table: String,
    chunks_table: String,
    match_function: String,
}

impl std::fmt::Debug for PostgrestStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgrestStore")
            .field("base_url", &self.base_url)
            .field("documents_table", &self.documents_table)
            .field("chunks_table", &self.chunks_table)
            .field("match_function", &self.match_function)
            .field("has_api_key", &self.api_key.is_some())
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct InsertedRow {
    #[serde(default)]
    id: Option<DocumentId>,
}

impl InsertedRow {
    fn document_id(&self) -> Option<DocumentId> {
        self.id.clone().filter(|id| !id.as_str().is_empty())
    }
}

impl PostgrestStore {
    /// Build a store from settings. Missing URL or key fail on first use.
    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                BrandMemoryError::Configuration(format!("failed to build store HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            base_url: config
                .url
                .as_deref()
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .map(|u| u.trim_end_matches('/').to_string()),
            api_key: config
                .api_key
                .as_ref()
                .filter(|k| !k.trim().is_empty())
                .map(|k| SecretString::new(k.trim().to_string())),
            documents_table: config.documents_table.clone(),
            chunks_table: config.chunks_table.clone(),
            match_function: config.match_function.clone(),
        })
    }

    fn rest_url(&self, path: &str) -> Result<String> {
        let base = self.base_url.as_deref().ok_or_else(|| {
            BrandMemoryError::Configuration(
                "store URL is not set (store.url or SUPABASE_URL)".to_string(),
            )
        })?;
        Ok(format!("{base}/rest/v1/{path}"))
    }

    fn post(&self, path: &str) -> Result<RequestBuilder> {
        let url = self.rest_url(path)?;
        let key = self.api_key.as_ref().ok_or_else(|| {
            BrandMemoryError::Configuration(
                "store API key is not set (store.api_key or SUPABASE_SERVICE_ROLE_KEY)"
                    .to_string(),
            )
        })?;

        Ok(self
            .client
            .post(url)
            .header("apikey", key.expose_secret().as_str())
            .bearer_auth(key.expose_secret()))
    }

    async fn send(request: RequestBuilder) -> Result<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| BrandMemoryError::transport(BackendKind::Persistence, e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<body unavailable>".to_string());
        tracing::warn!("[store] request failed with {status}");
        Err(BrandMemoryError::backend(
            BackendKind::Persistence,
            Some(status.as_u16()),
            error_message(&body),
        ))
    }
}

#[derive(Debug, Deserialize)]
struct PostgrestError {
    message: String,
}

/// PostgREST errors carry a top-level `message`.
fn error_message(body: &str) -> String {
    serde_json::from_str::<PostgrestError>(body)
        .map(|e| e.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

fn decode_error(e: reqwest::Error) -> BrandMemoryError {
    BrandMemoryError::backend(
        BackendKind::Persistence,
        None,
        format!("failed to parse store response: {e}"),
    )
}

#[async_trait]
impl BrandStore for PostgrestStore {
    async fn insert_document(&self, document: &NewDocument) -> Result<Option<DocumentId>> {
        let request = self
            .post(&self.documents_table)?
            .header("Prefer", "return=representation")
            .json(document);

        let rows: Vec<InsertedRow> = Self::send(request)
            .await?
            .json()
            .await
            .map_err(decode_error)?;

        Ok(rows.first().and_then(InsertedRow::document_id))
    }

    async fn insert_chunks(&self, chunks: &[NewChunk]) -> Result<()> {
        if chunks.is_empty() {
            return Ok(());
        }

        let request = self
            .post(&self.chunks_table)?
            .header("Prefer", "return=minimal")
            .json(chunks);

        Self::send(request).await?;
        Ok(())
    }

    async fn similarity_search(&self, query: &SimilarityQuery) -> Result<Vec<BrandMatch>> {
        let body = json!({
            "p_client_id": query.client_id,
            "query_embedding": query.query_embedding,
            "match_count": query.match_count,
            "similarity_threshold": query.similarity_threshold,
        });

        let request = self
            .post(&format!("rpc/{}", self.match_function))?
            .json(&body);

        Self::send(request)
            .await?
            .json::<Vec<BrandMatch>>()
            .await
            .map_err(decode_error)
    }
}
