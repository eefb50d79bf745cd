//! Agent-facing tools over the brand memory.
//!
//! An agent runtime lists [`BrandTool::all`], shows each tool's name and
//! description to the model, and routes calls through [`BrandTool::invoke`].

use serde::{Deserialize, Serialize};

use crate::documents::{BrandMatch, IngestOutcome};
use crate::engine::{BrandMemory, IngestRequest, SearchOptions};
use crate::error::{BrandMemoryError, Result};

/// Source type recorded for notes written by an agent.
pub const AGENT_SOURCE_TYPE: &str = "agent";

/// Tools exposed to agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrandTool {
    SearchBrandMemory,
    IngestBrandNote,
}

/// Arguments of a tool call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolInput {
    /// Tenant the call is scoped to
    pub client_id: String,
    /// Search query, or the note body for ingestion
    pub query: String,
    /// Note title (ingest only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Overrides the default match count (search only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_count: Option<u32>,
    /// Overrides the default threshold (search only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity_threshold: Option<f64>,
    /// Agent or user the note is attributed to (ingest only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

impl ToolInput {
    pub fn new(client_id: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            query: query.into(),
            ..Default::default()
        }
    }
}

/// Result of a tool call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ToolOutput {
    /// Matches plus the rendered grounding block.
    Context {
        text: String,
        matches: Vec<BrandMatch>,
    },
    /// Note stored.
    Ingested(IngestOutcome),
}

impl ToolOutput {
    /// Text handed back to the model.
    pub fn text(&self) -> String {
        match self {
            ToolOutput::Context { text, .. } => text.clone(),
            ToolOutput::Ingested(outcome) => format!(
                "Stored note {} ({} chunk(s))",
                outcome.document_id, outcome.chunks_created
            ),
        }
    }
}

impl BrandTool {
    /// Every tool, in the order they are advertised.
    pub fn all() -> &'static [BrandTool] {
        &[BrandTool::SearchBrandMemory, BrandTool::IngestBrandNote]
    }

    pub fn name(&self) -> &'static str {
        match self {
            BrandTool::SearchBrandMemory => "search_brand_memory",
            BrandTool::IngestBrandNote => "ingest_brand_note",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            BrandTool::SearchBrandMemory => {
                "Search the client's brand memory (voice guides, past campaigns, notes) \
                 using natural language. Returns the most relevant passages with similarity scores."
            }
            BrandTool::IngestBrandNote => {
                "Save a short note to the client's brand memory so later searches can find it. \
                 Use for durable facts: tone decisions, approved claims, audience insights."
            }
        }
    }

    /// Look a tool up by its advertised name.
    pub fn from_name(name: &str) -> Option<BrandTool> {
        Self::all().iter().copied().find(|tool| tool.name() == name)
    }

    /// Run the tool against `memory`.
    pub async fn invoke(&self, memory: &BrandMemory, input: &ToolInput) -> Result<ToolOutput> {
        if input.query.trim().is_empty() {
            return Err(BrandMemoryError::Validation(format!(
                "{} requires a non-empty query",
                self.name()
            )));
        }

        crate::debug_event!("tools", "invoke", "{} for client {}", self.name(), input.client_id);

        match self {
            BrandTool::SearchBrandMemory => {
                let defaults = memory.search_defaults();
                let options = SearchOptions {
                    match_count: input.match_count.unwrap_or(defaults.match_count),
                    similarity_threshold: input
                        .similarity_threshold
                        .unwrap_or(defaults.similarity_threshold),
                };
                let matches = memory.search(&input.client_id, &input.query, options).await?;
                Ok(ToolOutput::Context {
                    text: render_context(&input.query, &matches),
                    matches,
                })
            }
            BrandTool::IngestBrandNote => {
                let request = IngestRequest {
                    client_id: input.client_id.clone(),
                    title: input.title.clone(),
                    content: input.query.clone(),
                    source_type: Some(AGENT_SOURCE_TYPE.to_string()),
                    source_ref: None,
                    created_by: input.created_by.clone(),
                    metadata: Default::default(),
                };
                Ok(ToolOutput::Ingested(memory.ingest(request).await?))
            }
        }
    }
}

/// Numbered grounding block for prompt injection.
pub fn render_context(query: &str, matches: &[BrandMatch]) -> String {
    if matches.is_empty() {
        return format!("No brand memory found for: {query}");
    }

    let mut output = format!(
        "Brand memory ({} passage(s) for '{query}'):\n\n",
        matches.len()
    );
    for (i, m) in matches.iter().enumerate() {
        match m.title() {
            Some(title) => output.push_str(&format!(
                "[{}] {title} (similarity: {:.3})\n",
                i + 1,
                m.similarity
            )),
            None => output.push_str(&format!("[{}] (similarity: {:.3})\n", i + 1, m.similarity)),
        }
        output.push_str(m.content.trim());
        output.push_str("\n\n");
    }
    output.truncate(output.trim_end().len());
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::Metadata;
    use serde_json::json;

    fn brand_match(title: Option<&str>, content: &str, similarity: f64) -> BrandMatch {
        let mut metadata = Metadata::new();
        if let Some(title) = title {
            metadata.insert("title".to_string(), json!(title));
        }
        BrandMatch {
            id: None,
            document_id: None,
            chunk_index: Some(0),
            content: content.to_string(),
            metadata,
            similarity,
            extra: Default::default(),
        }
    }

    #[test]
    fn test_names_round_trip() {
        for tool in BrandTool::all() {
            assert_eq!(BrandTool::from_name(tool.name()), Some(*tool));
            assert!(!tool.description().is_empty());
        }
        assert_eq!(BrandTool::from_name("delete_everything"), None);
    }

    #[test]
    fn test_render_context_numbers_matches() {
        let matches = vec![
            brand_match(Some("Voice guide"), "Warm, direct, never snarky.\n", 0.91234),
            brand_match(None, "Avoid exclamation marks.", 0.8),
        ];

        let text = render_context("tone", &matches);
        assert_eq!(
            text,
            "Brand memory (2 passage(s) for 'tone'):\n\n\
             [1] Voice guide (similarity: 0.912)\n\
             Warm, direct, never snarky.\n\n\
             [2] (similarity: 0.800)\n\
             Avoid exclamation marks."
        );
    }

    #[test]
    fn test_render_context_empty() {
        assert_eq!(
            render_context("pricing", &[]),
            "No brand memory found for: pricing"
        );
    }

    #[test]
    fn test_tool_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(BrandTool::IngestBrandNote).unwrap(),
            json!("ingest_brand_note")
        );
    }
}
