//! Request and response bodies of the HTTP surface, with validation.

use serde::{Deserialize, Serialize};

use crate::documents::BrandMatch;
use crate::engine::{IngestRequest, SearchOptions};
use crate::error::{BrandMemoryError, Result};

/// Shortest accepted tenant identifier, counted after trimming.
pub const MIN_CLIENT_ID_LEN: usize = 1;
/// Largest `match_count` a caller may request.
pub const MAX_MATCH_COUNT: u32 = 100;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub client_id: String,
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity_threshold: Option<f64>,
}

impl SearchRequest {
    /// Resolve the effective options, falling back to `defaults`.
    pub fn options(&self, defaults: SearchOptions) -> SearchOptions {
        SearchOptions {
            match_count: self.match_count.unwrap_or(defaults.match_count),
            similarity_threshold: self
                .similarity_threshold
                .unwrap_or(defaults.similarity_threshold),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub matches: Vec<BrandMatch>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub kind: String,
    pub message: String,
}

impl ErrorEnvelope {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                kind: kind.into(),
                message: message.into(),
            },
        }
    }
}

fn invalid(message: impl Into<String>) -> BrandMemoryError {
    BrandMemoryError::Validation(message.into())
}

fn validate_client_id(client_id: &str) -> Result<()> {
    if client_id.trim().chars().count() < MIN_CLIENT_ID_LEN {
        return Err(invalid(format!(
            "client_id must have at least {MIN_CLIENT_ID_LEN} non-blank character(s)"
        )));
    }
    Ok(())
}

fn validate_non_blank(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Checks applied to ingest bodies before they reach the engine.
pub fn validate_ingest(request: &IngestRequest) -> Result<()> {
    validate_client_id(&request.client_id)?;
    validate_non_blank("content", &request.content)?;
    if let Some(source_type) = &request.source_type {
        validate_non_blank("source_type", source_type)?;
    }
    Ok(())
}

/// Checks applied to search bodies before they reach the engine.
pub fn validate_search(request: &SearchRequest) -> Result<()> {
    validate_client_id(&request.client_id)?;
    validate_non_blank("query", &request.query)?;

    if let Some(count) = request.match_count.filter(|c| !(1..=MAX_MATCH_COUNT).contains(c)) {
        return Err(invalid(format!(
            "match_count must be between 1 and {MAX_MATCH_COUNT}, got {count}"
        )));
    }

    if let Some(threshold) = request
        .similarity_threshold
        .filter(|t| !(0.0..=1.0).contains(t))
    {
        return Err(invalid(format!(
            "similarity_threshold must be within [0, 1], got {threshold}"
        )));
    }

    Ok(())
}
