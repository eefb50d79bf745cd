mod common;

use std::sync::Arc;

use brand_memory::tools::AGENT_SOURCE_TYPE;
use brand_memory::{BrandMemory, BrandMemoryError, BrandTool, InMemoryStore, ToolInput, ToolOutput};
use common::{FailingEmbedder, HashEmbedder, RecordingStore, brand_match};

#[tokio::test]
async fn test_ingest_note_then_search_it() {
    let store = Arc::new(InMemoryStore::new());
    let memory = BrandMemory::new(Arc::new(HashEmbedder::new()), store.clone());

    let note = "Spring campaign: lead with sustainability, not discounts.";
    let mut input = ToolInput::new("acme", note);
    input.title = Some("Spring brief".to_string());
    input.created_by = Some("copy-agent".to_string());

    let output = BrandTool::IngestBrandNote
        .invoke(&memory, &input)
        .await
        .unwrap();
    let ToolOutput::Ingested(outcome) = &output else {
        panic!("expected ingest output, got {output:?}");
    };
    assert_eq!(outcome.chunks_created, 1);
    assert!(output.text().starts_with("Stored note "));

    let documents = store.documents();
    assert_eq!(documents[0].source_type, AGENT_SOURCE_TYPE);
    assert_eq!(documents[0].created_by.as_deref(), Some("copy-agent"));

    let output = BrandTool::SearchBrandMemory
        .invoke(&memory, &ToolInput::new("acme", note))
        .await
        .unwrap();
    match output {
        ToolOutput::Context { text, matches } => {
            assert_eq!(matches.len(), 1);
            assert!(text.contains("[1] Spring brief"));
            assert!(text.contains(note));
        }
        other => panic!("expected context output, got {other:?}"),
    }
}

#[tokio::test]
async fn test_search_overrides_reach_the_store() {
    let store = Arc::new(RecordingStore::with_matches(vec![brand_match("Be brief.", 0.9)]));
    let memory = BrandMemory::new(Arc::new(HashEmbedder::new()), store.clone());

    let mut input = ToolInput::new("acme", "length rules");
    input.match_count = Some(2);
    input.similarity_threshold = Some(0.4);

    let output = BrandTool::SearchBrandMemory
        .invoke(&memory, &input)
        .await
        .unwrap();
    assert!(output.text().contains("Be brief."));

    let queries = store.queries.lock();
    assert_eq!(queries[0].match_count, 2);
    assert!((queries[0].similarity_threshold - 0.4).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_errors_are_returned() {
    let memory = BrandMemory::new(Arc::new(FailingEmbedder), Arc::new(RecordingStore::new()));

    let err = BrandTool::SearchBrandMemory
        .invoke(&memory, &ToolInput::new("acme", "tone"))
        .await
        .unwrap_err();
    assert!(matches!(err, BrandMemoryError::Backend { .. }));

    let err = BrandTool::IngestBrandNote
        .invoke(&memory, &ToolInput::new("acme", "  "))
        .await
        .unwrap_err();
    assert!(matches!(err, BrandMemoryError::Validation(_)));
}
