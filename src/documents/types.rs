//! Core types for brand documents, chunks and search matches.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Free-form metadata attached to documents and chunks.
pub type Metadata = Map<String, Value>;

/// Source type used when the caller does not provide one.
pub const DEFAULT_SOURCE_TYPE: &str = "manual";

/// Identifier assigned to a document by the persistence layer.
///
/// Backends may use UUIDs or serial integers; both are kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl<'de> Deserialize<'de> for DocumentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Serial(i64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => Self(s),
            RawId::Serial(n) => Self(n.to_string()),
        })
    }
}

impl DocumentId {
    /// Wrap a backend-assigned identifier.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A document row as handed to the persistence layer.
///
/// `id` and `created_at` are left to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDocument {
    /// Owning tenant.
    pub client_id: String,
    pub title: Option<String>,
    pub source_type: String,
    pub source_ref: Option<String>,
    /// Raw text body, stored as given.
    pub content: String,
    pub metadata: Metadata,
    pub created_by: Option<String>,
}

/// A persisted brand document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub client_id: String,
    pub title: Option<String>,
    pub source_type: String,
    pub source_ref: Option<String>,
    pub content: String,
    #[serde(default)]
    pub metadata: Metadata,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A chunk row as handed to the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewChunk {
    /// Owning tenant, denormalized from the document for query scoping.
    pub client_id: String,
    pub document_id: DocumentId,
    /// Zero-based position of this chunk within its document.
    pub chunk_index: usize,
    pub content: String,
    pub metadata: Metadata,
    /// Embedding in the store's vector literal format.
    pub embedding: String,
}

/// A similarity search request as understood by the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityQuery {
    pub client_id: String,
    /// Query embedding in the store's vector literal format.
    pub query_embedding: String,
    pub match_count: u32,
    pub similarity_threshold: f64,
}

/// Missing and `null` both read as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A stored chunk returned by similarity search, with its score.
///
/// Rows are taken as the backend yields them: nullable columns read as
/// empty, ids keep their JSON form, and fields beyond the known ones are
/// kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandMatch {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub document_id: Option<Value>,
    #[serde(default)]
    pub chunk_index: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: Metadata,
    #[serde(default, deserialize_with = "null_as_default")]
    pub similarity: f64,
    #[serde(flatten)]
    pub extra: Metadata,
}

impl BrandMatch {
    /// Title recorded in the chunk metadata, if any.
    pub fn title(&self) -> Option<&str> {
        self.metadata.get("title").and_then(Value::as_str)
    }
}

/// Result of ingesting one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestOutcome {
    pub document_id: DocumentId,
    pub chunks_created: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_id_is_transparent() {
        let id = DocumentId::new("7f1c");
        assert_eq!(serde_json::to_value(&id).unwrap(), json!("7f1c"));
        assert_eq!(id.to_string(), "7f1c");

        let serial: DocumentId = serde_json::from_value(json!(17)).unwrap();
        assert_eq!(serial.as_str(), "17");
    }

    #[test]
    fn test_match_keeps_unknown_columns() {
        let row = json!({
            "id": 42,
            "document_id": "doc-1",
            "chunk_index": 3,
            "content": "Our tone is playful.",
            "metadata": {"title": "Voice guide", "length": 20},
            "similarity": 0.91,
            "source_type": "manual"
        });

        let m: BrandMatch = serde_json::from_value(row).unwrap();
        assert_eq!(m.document_id, Some(json!("doc-1")));
        assert_eq!(m.chunk_index, Some(3));
        assert_eq!(m.title(), Some("Voice guide"));
        assert_eq!(m.extra.get("source_type"), Some(&json!("manual")));
        assert!((m.similarity - 0.91).abs() < 1e-9);
    }

    #[test]
    fn test_match_accepts_null_columns() {
        let row = json!({
            "id": null,
            "document_id": 17,
            "chunk_index": null,
            "content": null,
            "metadata": null,
            "similarity": null
        });

        let m: BrandMatch = serde_json::from_value(row).unwrap();
        assert_eq!(m.id, None);
        assert_eq!(m.document_id, Some(json!(17)));
        assert_eq!(m.chunk_index, None);
        assert_eq!(m.content, "");
        assert!(m.metadata.is_empty());
        assert_eq!(m.similarity, 0.0);
        assert_eq!(m.title(), None);
    }
}
