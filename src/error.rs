//! Error types shared by the chunking, embedding, storage and engine layers.

use std::fmt;

use thiserror::Error;

/// Which external collaborator produced a backend failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Remote text-embedding endpoint.
    Embedding,
    /// Row store holding documents and chunks.
    Persistence,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Embedding => f.write_str("embedding"),
            BackendKind::Persistence => f.write_str("persistence"),
        }
    }
}

/// Errors surfaced by brand memory operations.
#[derive(Error, Debug)]
pub enum BrandMemoryError {
    /// A credential or setting needed by the operation is missing.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An external backend returned a failure (or could not be reached).
    #[error("{backend} backend error{}: {message}", status_suffix(.status))]
    Backend {
        backend: BackendKind,
        status: Option<u16>,
        message: String,
    },

    /// A required write did not yield the expected row.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Caller-supplied input failed the request schema.
    #[error("Validation error: {0}")]
    Validation(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" ({code})"),
        None => String::new(),
    }
}

impl BrandMemoryError {
    /// Build a backend error from an HTTP status and body text.
    pub fn backend(backend: BackendKind, status: Option<u16>, message: impl Into<String>) -> Self {
        BrandMemoryError::Backend {
            backend,
            status,
            message: message.into(),
        }
    }

    /// Map a transport-level `reqwest` failure onto a backend error.
    pub fn transport(backend: BackendKind, err: reqwest::Error) -> Self {
        BrandMemoryError::Backend {
            backend,
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }

    /// Short machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            BrandMemoryError::Configuration(_) => "configuration_error",
            BrandMemoryError::Backend { .. } => "backend_error",
            BrandMemoryError::Persistence(_) => "persistence_error",
            BrandMemoryError::Validation(_) => "validation_error",
        }
    }
}

/// Result type for brand memory operations.
pub type Result<T> = std::result::Result<T, BrandMemoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_display_includes_status() {
        let err = BrandMemoryError::backend(BackendKind::Embedding, Some(429), "rate limited");
        assert_eq!(err.to_string(), "embedding backend error (429): rate limited");
        assert_eq!(err.kind(), "backend_error");
    }

    #[test]
    fn test_backend_error_display_without_status() {
        let err = BrandMemoryError::backend(BackendKind::Persistence, None, "connection refused");
        assert_eq!(
            err.to_string(),
            "persistence backend error: connection refused"
        );
    }
}
