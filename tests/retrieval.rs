// tests/retrieval.rs
//
// Read paths: thread listing order, ownership checks, and the not-found case.

use std::sync::Arc;

use serde_json::json;

use finchat_citations::{
    Citation, CitationDraft, CitationEngine, CitationError, CitationStore, MemoryCitationStore,
    SourceType,
};

fn draft(thread: &str, user: &str, position: usize) -> CitationDraft {
    CitationDraft {
        thread_id: thread.to_string(),
        user_id: user.to_string(),
        source_type: SourceType::Polygon,
        source_identifier: "AAPL".to_string(),
        data_point: json!({"ticker": "AAPL", "price": 150.0}),
        citation_text: "Source: Polygon AAPL (150)".to_string(),
        position_in_text: position,
    }
}

async fn seeded() -> (CitationEngine, Arc<MemoryCitationStore>, Citation, Citation) {
    let store = Arc::new(MemoryCitationStore::new());
    let engine = CitationEngine::new(store.clone());
    // Inserted out of text order on purpose.
    let later = store.create(draft("t1", "alice", 30)).await.unwrap();
    let earlier = store.create(draft("t1", "alice", 10)).await.unwrap();
    (engine, store, earlier, later)
}

#[tokio::test]
async fn thread_listing_is_ordered_by_text_position() {
    let (engine, _store, earlier, later) = seeded().await;

    let listed = engine.citations_for_thread("t1", "alice").await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, earlier.id);
    assert_eq!(listed[1].id, later.id);
}

#[tokio::test]
async fn listing_an_empty_thread_is_ok_and_empty() {
    let (engine, _store, _earlier, _later) = seeded().await;

    let listed = engine.citations_for_thread("t2", "alice").await.unwrap();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn detail_returns_the_full_record_for_the_owner() {
    let (engine, _store, earlier, _later) = seeded().await;

    let got = engine.citation_data(&earlier.id, "alice").await.unwrap();
    assert_eq!(got, earlier);
    assert_eq!(got.data_point["price"], json!(150.0));
}

#[tokio::test]
async fn detail_is_forbidden_for_other_users() {
    let (engine, _store, earlier, _later) = seeded().await;

    let err = engine
        .citation_data(&earlier.id, "mallory")
        .await
        .unwrap_err();
    assert!(matches!(err, CitationError::Forbidden), "got {err:?}");
}

#[tokio::test]
async fn detail_of_unknown_id_is_not_found() {
    let (engine, _store, _earlier, _later) = seeded().await;

    let err = engine
        .citation_data("no-such-id", "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, CitationError::NotFound), "got {err:?}");
}
