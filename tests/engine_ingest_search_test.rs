mod common;

use std::sync::Arc;

use brand_memory::documents::{ChunkingConfig, Metadata};
use brand_memory::vector::decode_vector;
use brand_memory::{
    BrandMemory, BrandMemoryError, BrandStore, EmbeddingBackend, InMemoryStore, IngestRequest,
    SearchOptions,
};
use common::{FailingEmbedder, HashEmbedder, RecordingStore, brand_match, hash_vector};
use serde_json::json;

fn engine(embedder: Arc<dyn EmbeddingBackend>, store: Arc<dyn BrandStore>) -> BrandMemory {
    BrandMemory::new(embedder, store)
}

#[tokio::test]
async fn test_single_chunk_ingest_has_index_zero() {
    let store = Arc::new(RecordingStore::new());
    let memory = engine(Arc::new(HashEmbedder::new()), store.clone());

    let content = "Our voice is warm, direct and never snarky.";
    let outcome = memory
        .ingest(IngestRequest::new("acme", content).with_title("Voice guide"))
        .await
        .unwrap();

    assert_eq!(outcome.chunks_created, 1);
    assert_eq!(outcome.document_id.as_str(), "doc-1");

    let chunks = store.all_chunks();
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].chunk_index, 0);
    assert_eq!(chunks[0].content, content);
    assert_eq!(chunks[0].client_id, "acme");
    assert_eq!(chunks[0].document_id, outcome.document_id);
}

#[tokio::test]
async fn test_exactly_one_window_is_one_chunk() {
    let store = Arc::new(RecordingStore::new());
    let memory = engine(Arc::new(HashEmbedder::new()), store.clone());

    let outcome = memory
        .ingest(IngestRequest::new("acme", "b".repeat(1200)))
        .await
        .unwrap();

    assert_eq!(outcome.chunks_created, 1);
    assert_eq!(store.all_chunks()[0].chunk_index, 0);
}

#[tokio::test]
async fn test_empty_content_creates_document_without_chunks() {
    let store = Arc::new(RecordingStore::new());
    let embedder = Arc::new(HashEmbedder::new());
    let memory = engine(embedder.clone(), store.clone());

    let outcome = memory
        .ingest(IngestRequest::new("acme", "   \n  "))
        .await
        .unwrap();

    assert_eq!(outcome.chunks_created, 0);
    assert_eq!(store.documents.lock().len(), 1);
    assert!(store.chunk_batches.lock().is_empty());
    assert!(embedder.calls().is_empty());
}

#[tokio::test]
async fn test_failed_embedding_leaves_document_without_chunks() {
    let store = Arc::new(InMemoryStore::new());
    let memory = engine(Arc::new(FailingEmbedder), store.clone());

    let err = memory
        .ingest(IngestRequest::new("acme", "Always capitalise Crew."))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        BrandMemoryError::Backend {
            status: Some(503),
            ..
        }
    ));

    let documents = store.documents();
    assert_eq!(documents.len(), 1);
    assert!(store.chunks_for(&documents[0].id).is_empty());
    assert_eq!(store.chunk_count(), 0);
}

#[tokio::test]
async fn test_missing_document_id_is_persistence_error() {
    let store = Arc::new(RecordingStore {
        drop_document_ids: true,
        ..RecordingStore::default()
    });
    let embedder = Arc::new(HashEmbedder::new());
    let memory = engine(embedder.clone(), store.clone());

    let err = memory
        .ingest(IngestRequest::new("acme", "text"))
        .await
        .unwrap_err();

    assert!(matches!(err, BrandMemoryError::Persistence(_)));
    assert!(embedder.calls().is_empty());
    assert!(store.chunk_batches.lock().is_empty());
}

#[tokio::test]
async fn test_multi_chunk_ingest_embeds_once_and_encodes_vectors() {
    let store = Arc::new(RecordingStore::new());
    let embedder = Arc::new(HashEmbedder::new());
    let memory = engine(embedder.clone(), store.clone());

    let content: String = ('a'..='z').cycle().take(3500).collect();
    let outcome = memory
        .ingest(IngestRequest::new("acme", content.clone()))
        .await
        .unwrap();

    // 1200/200 windows start at 0, 1000, 2000, 3000
    assert_eq!(outcome.chunks_created, 4);

    let calls = embedder.calls();
    assert_eq!(calls.len(), 1, "all chunks go out in one batch");
    assert_eq!(calls[0].len(), 4);

    assert_eq!(store.chunk_batches.lock().len(), 1, "chunks persist in one batch");
    let chunks = store.all_chunks();
    for (i, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.chunk_index, i);
        assert_eq!(chunk.content, calls[0][i]);

        let decoded = decode_vector(&chunk.embedding).unwrap();
        let expected = hash_vector(&chunk.content);
        for (a, b) in decoded.iter().zip(&expected) {
            assert!((a - b).abs() < 1e-8);
        }
        assert!(chunk.embedding.starts_with('[') && !chunk.embedding.contains(' '));
    }
    assert_eq!(chunks[3].content.chars().count(), 500);
}

#[tokio::test]
async fn test_chunk_metadata_merges_title_and_length() {
    let store = Arc::new(RecordingStore::new());
    let memory = engine(Arc::new(HashEmbedder::new()), store.clone());

    let mut metadata = Metadata::new();
    metadata.insert("campaign".to_string(), json!("spring"));
    metadata.insert("length".to_string(), json!("document-level"));

    memory
        .ingest(
            IngestRequest::new("acme", "Short note.")
                .with_title("Notes")
                .with_metadata(metadata),
        )
        .await
        .unwrap();

    let chunk = &store.all_chunks()[0];
    assert_eq!(chunk.metadata.get("campaign"), Some(&json!("spring")));
    assert_eq!(chunk.metadata.get("title"), Some(&json!("Notes")));
    assert_eq!(chunk.metadata.get("length"), Some(&json!(11)));

    let document = &store.documents.lock()[0];
    assert_eq!(document.source_type, "manual");
    assert_eq!(
        document.metadata.get("length"),
        Some(&json!("document-level"))
    );
}

#[tokio::test]
async fn test_custom_chunking_is_used() {
    let store = Arc::new(RecordingStore::new());
    let memory = engine(Arc::new(HashEmbedder::new()), store.clone())
        .with_chunking(ChunkingConfig::new(10, 2));

    let outcome = memory
        .ingest(IngestRequest::new("acme", "abcdefghijklmnopqrst"))
        .await
        .unwrap();

    let contents: Vec<String> = store.all_chunks().into_iter().map(|c| c.content).collect();
    assert_eq!(contents, vec!["abcdefghij", "ijklmnopqr", "qrst"]);
    assert_eq!(outcome.chunks_created, 3);
}

#[tokio::test]
async fn test_overlap_not_below_size_refuses_ingest() {
    let store = Arc::new(RecordingStore::new());
    let embedder = Arc::new(HashEmbedder::new());
    let memory = engine(embedder.clone(), store.clone())
        .with_chunking(ChunkingConfig::new(100, 100));

    let err = memory
        .ingest(IngestRequest::new("acme", "a".repeat(5000)))
        .await
        .unwrap_err();

    assert!(matches!(err, BrandMemoryError::Configuration(_)));
    assert!(store.documents.lock().is_empty(), "nothing is written");
    assert!(store.chunk_batches.lock().is_empty());
    assert!(embedder.calls().is_empty());

    assert!(matches!(
        memory.preview_chunks("abc"),
        Err(BrandMemoryError::Configuration(_))
    ));
}

#[tokio::test]
async fn test_preview_matches_ingested_chunks() {
    let memory = engine(Arc::new(HashEmbedder::new()), Arc::new(RecordingStore::new()))
        .with_chunking(ChunkingConfig::new(10, 2));

    let preview = memory.preview_chunks("abcdefghijklmnopqrst").unwrap();
    let contents: Vec<&str> = preview.iter().map(|c| c.content.as_str()).collect();
    assert_eq!(contents, vec!["abcdefghij", "ijklmnopqr", "qrst"]);
}

#[tokio::test]
async fn test_search_passes_options_through_unmodified() {
    let store = Arc::new(RecordingStore::with_matches(vec![
        brand_match("first", 0.93),
        brand_match("second", 0.71),
    ]));
    let memory = engine(Arc::new(HashEmbedder::new()), store.clone());

    let options = SearchOptions {
        match_count: 3,
        similarity_threshold: 1.01,
    };
    let matches = memory.search("acme", "tone", options).await.unwrap();

    // Rows come back exactly as the backend returned them
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].content, "first");
    assert_eq!(matches[1].content, "second");

    let queries = store.queries.lock();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].client_id, "acme");
    assert_eq!(queries[0].match_count, 3);
    assert_eq!(queries[0].similarity_threshold, 1.01);

    let query_vector = decode_vector(&queries[0].query_embedding).unwrap();
    assert_eq!(query_vector.len(), 4);
}

#[tokio::test]
async fn test_search_defaults() {
    let store = Arc::new(RecordingStore::new());
    let memory = engine(Arc::new(HashEmbedder::new()), store.clone());

    let matches = memory.search_with_defaults("acme", "pricing").await.unwrap();
    assert!(matches.is_empty());

    let queries = store.queries.lock();
    assert_eq!(queries[0].match_count, 8);
    assert!((queries[0].similarity_threshold - 0.70).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_search_failure_propagates() {
    let memory = engine(Arc::new(FailingEmbedder), Arc::new(RecordingStore::new()));
    let err = memory
        .search("acme", "tone", SearchOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, BrandMemoryError::Backend { .. }));
}

#[tokio::test]
async fn test_roundtrip_with_in_memory_store() {
    let store = Arc::new(InMemoryStore::new());
    let memory = engine(Arc::new(HashEmbedder::new()), store.clone());

    let note = "Never call the product cheap; say accessible.";
    memory
        .ingest(IngestRequest::new("acme", note).with_title("Word list"))
        .await
        .unwrap();
    memory
        .ingest(IngestRequest::new("globex", note))
        .await
        .unwrap();

    // Identical text embeds identically, so similarity is 1.0
    let matches = memory
        .search("acme", note, SearchOptions::default())
        .await
        .unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].content, note);
    assert_eq!(matches[0].title(), Some("Word list"));
    assert!((matches[0].similarity - 1.0).abs() < 1e-6);

    let rejected = memory
        .search(
            "acme",
            note,
            SearchOptions {
                match_count: 8,
                similarity_threshold: 1.01,
            },
        )
        .await
        .unwrap();
    assert!(rejected.is_empty());
}
