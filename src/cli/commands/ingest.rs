//! Ingest command.

use std::path::Path;

use crate::config::Settings;
use crate::documents::Metadata;
use crate::engine::{BrandMemory, IngestRequest};

/// Flags of the ingest command.
#[derive(Debug, Default)]
pub struct IngestArgs {
    pub client_id: String,
    pub title: Option<String>,
    pub source_type: Option<String>,
    pub source_ref: Option<String>,
    pub created_by: Option<String>,
    pub metadata: Option<String>,
}

/// Parse `--metadata`; only JSON objects are accepted.
pub fn parse_metadata(raw: Option<&str>) -> Result<Metadata, String> {
    let Some(raw) = raw else {
        return Ok(Metadata::new());
    };
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(other) => Err(format!("--metadata must be a JSON object, got {other}")),
        Err(e) => Err(format!("--metadata is not valid JSON: {e}")),
    }
}

/// Run ingest command.
pub async fn run(settings: &Settings, args: IngestArgs, file: Option<&Path>) {
    let metadata = match parse_metadata(args.metadata.as_deref()) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let content = super::read_input_or_exit(file);
    let source_ref = args
        .source_ref
        .or_else(|| file.map(|p| p.display().to_string()));

    let memory = match BrandMemory::from_settings(settings) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let request = IngestRequest {
        client_id: args.client_id,
        title: args.title,
        content,
        source_type: args.source_type,
        source_ref,
        created_by: args.created_by,
        metadata,
    };

    match memory.ingest(request).await {
        Ok(outcome) => {
            println!(
                "Ingested document {} ({} chunk(s))",
                outcome.document_id, outcome.chunks_created
            );
        }
        Err(e) => {
            eprintln!("Ingest failed: {e}");
            std::process::exit(1);
        }
    }
}
