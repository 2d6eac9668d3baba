//! Citation Service — Binary Entrypoint
//! Boots the Axum HTTP server, wiring routes, shared state, and middleware.
//!
//! See `README.md` for quickstart and endpoint reference.

use std::sync::Arc;

use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use finchat_citations::api::{self, AppState};
use finchat_citations::citations::{CitationEngine, MemoryCitationStore, DEFAULT_STORE_CAPACITY};
use finchat_citations::history::ExtractionHistory;
use finchat_citations::metrics::Metrics;

/// Enable compact tracing logs in development only.
/// Activation requires BOTH:
///   - dev environment (debug build OR SHUTTLE_ENV in {local, development, dev})
///   - CITATIONS_DEV_LOG=1
fn enable_dev_tracing() {
    let dev_flag = std::env::var("CITATIONS_DEV_LOG")
        .ok()
        .is_some_and(|v| v == "1");

    let is_dev_env = cfg!(debug_assertions)
        || matches!(
            std::env::var("SHUTTLE_ENV")
                .unwrap_or_default()
                .to_ascii_lowercase()
                .as_str(),
            "local" | "development" | "dev"
        );

    if !(dev_flag && is_dev_env) {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("finchat_citations=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

/// Store bound, overridable via CITATIONS_STORE_CAPACITY.
fn store_capacity() -> usize {
    std::env::var("CITATIONS_STORE_CAPACITY")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_STORE_CAPACITY)
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    // Initialize dev tracing early (no-op in production).
    enable_dev_tracing();

    let capacity = store_capacity();
    let metrics = Metrics::init(capacity);

    let store = Arc::new(MemoryCitationStore::with_capacity(capacity));
    let state = AppState {
        citations: Arc::new(CitationEngine::new(store)),
        runs: Arc::new(ExtractionHistory::with_capacity(200)),
    };

    let router = api::create_router(state).merge(metrics.router());

    Ok(router.into())
}
