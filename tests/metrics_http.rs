// tests/metrics_http.rs
//
// The /metrics exposition must carry the citation series after a real
// extraction runs through the HTTP surface. The recorder install is
// process-global, so the whole flow lives in a single test.

use std::sync::Arc;

use http::{Request, StatusCode};
use serde_json::json;
use shuttle_axum::axum::{
    body::{self, Body},
    Router,
};
use tower::ServiceExt as _; // for `oneshot`

use finchat_citations::api::{self, AppState};
use finchat_citations::citations::{CitationEngine, MemoryCitationStore};
use finchat_citations::history::ExtractionHistory;
use finchat_citations::metrics::Metrics;

const BODY_LIMIT: usize = 2 * 1024 * 1024; // 2MB, safe for tests

/// Build the same Router the binary uses: API routes merged with /metrics.
fn test_app(metrics: &Metrics) -> Router {
    let store = Arc::new(MemoryCitationStore::new());
    let state = AppState {
        citations: Arc::new(CitationEngine::new(store)),
        runs: Arc::new(ExtractionHistory::with_capacity(16)),
    };
    api::create_router(state).merge(metrics.router())
}

#[tokio::test]
async fn metrics_exposition_tracks_extraction_series() {
    let metrics = Metrics::init(64);
    let app = test_app(&metrics);

    // One run with two numbers: 150.25 cites the quote, 987 matches nothing.
    let payload = json!({
        "threadId": "thread-metrics",
        "finalOutput": "AAPL closed at 150.25 after the 987 rumor faded",
        "toolResults": [
            { "tool": "polygon_quote", "result": { "ticker": "AAPL", "price": 150.25 } }
        ]
    });
    let req = Request::builder()
        .method("POST")
        .uri("/citations/extract")
        .header("content-type", "application/json")
        .header("x-user-id", "user-1")
        .body(Body::from(payload.to_string()))
        .expect("build POST /citations/extract");
    let resp = app.clone().oneshot(req).await.expect("oneshot extract");
    assert_eq!(resp.status(), StatusCode::OK);

    let req = Request::builder()
        .method("GET")
        .uri("/metrics")
        .body(Body::empty())
        .expect("build GET /metrics");
    let resp = app.oneshot(req).await.expect("oneshot /metrics");
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    let text = String::from_utf8(bytes).expect("utf8");

    // citations_store_errors_total only materializes once a write fails,
    // so it is not asserted here.
    for needle in [
        "citations_numbers_total",
        "citations_matched_total",
        "citations_skipped_total",
        "citations_extract_ms",
        "citations_last_extract_ts",
        "citations_store_capacity",
    ] {
        assert!(
            text.contains(needle),
            "metrics exposition missing '{needle}'\n{text}"
        );
    }

    assert!(
        text.contains("citations_numbers_total 2"),
        "two numbers were tokenized\n{text}"
    );
    assert!(
        text.contains("citations_matched_total 1"),
        "one number was cited\n{text}"
    );
    assert!(
        text.contains("citations_skipped_total 1"),
        "one number had no match\n{text}"
    );
    assert!(
        text.contains("citations_store_capacity 64"),
        "capacity gauge should mirror the init argument\n{text}"
    );
}
