// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod citations;
pub mod history;
pub mod metrics;

// ---- Re-exports for stable public API ----
pub use crate::citations::{
    citation_text, classify_source, extract_numbers, truncate_payload, value_matches, Citation,
    CitationDraft, CitationEngine, CitationError, CitationStore, MemoryCitationStore, NumberMatch,
    SourceType, ToolResult, DEFAULT_STORE_CAPACITY, MAX_DATA_POINT_BYTES, MAX_MATCH_DEPTH,
    VALUE_TOLERANCE,
};
pub use crate::history::ExtractionHistory;
