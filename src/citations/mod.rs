// src/citations/mod.rs
//! Citation engine: tokenizes numbers out of a generated answer, matches
//! them against the tool payloads that backed the answer, and persists one
//! provenance record per grounded number.
//!
//! The orchestration entry point is [`CitationEngine::extract_citations`].
//! It is total: a chat response is never failed over citation trouble, and
//! one bad number or store hiccup never takes down the rest of the batch.

pub mod matcher;
pub mod numbers;
pub mod source;
pub mod store;
pub mod truncate;
pub mod types;

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use metrics::{counter, gauge, histogram};
use sha2::{Digest, Sha256};

pub use matcher::{value_matches, MAX_MATCH_DEPTH, VALUE_TOLERANCE};
pub use numbers::extract_numbers;
pub use source::classify_source;
pub use store::{CitationStore, MemoryCitationStore, DEFAULT_STORE_CAPACITY};
pub use truncate::{truncate_payload, MAX_DATA_POINT_BYTES};
pub use types::{Citation, CitationDraft, CitationError, NumberMatch, SourceType, ToolResult};

/// Ties the per-number pipeline together over a pluggable store.
pub struct CitationEngine {
    store: Arc<dyn CitationStore>,
}

impl CitationEngine {
    pub fn new(store: Arc<dyn CitationStore>) -> Self {
        Self { store }
    }

    /// Extract and persist citations for one finished assistant turn.
    ///
    /// Returns the citations that were actually persisted, in text order.
    /// Never fails: a number that matches nothing is skipped, and a store
    /// error for one number is logged and counted while the remaining
    /// numbers still get their shot.
    pub async fn extract_citations(
        &self,
        thread_id: &str,
        user_id: &str,
        final_output: &str,
        tool_results: &[ToolResult],
    ) -> Vec<Citation> {
        // 1) Cheap outs before any tokenizing or store traffic.
        if tool_results.is_empty() {
            return Vec::new();
        }
        let numbers: Vec<NumberMatch> = numbers::extract_numbers(final_output).collect();
        if numbers.is_empty() {
            return Vec::new();
        }

        let started = Instant::now();
        counter!("citations_numbers_total").increment(numbers.len() as u64);

        // 2) Per-number pipeline with per-number fault isolation.
        let mut citations = Vec::new();
        for number in &numbers {
            match self
                .cite_number(thread_id, user_id, number, tool_results)
                .await
            {
                Ok(Some(citation)) => {
                    counter!("citations_matched_total").increment(1);
                    citations.push(citation);
                }
                Ok(None) => {
                    counter!("citations_skipped_total").increment(1);
                }
                Err(e) => {
                    counter!("citations_store_errors_total").increment(1);
                    tracing::warn!(
                        error = ?e,
                        number = %number.original,
                        position = number.position,
                        "failed to persist citation; skipping this number"
                    );
                }
            }
        }

        histogram!("citations_extract_ms").record(started.elapsed().as_secs_f64() * 1000.0);
        gauge!("citations_last_extract_ts").set(Utc::now().timestamp() as f64);

        if dev_logging_enabled() {
            tracing::debug!(
                thread = %anon_hash(thread_id),
                user = %anon_hash(user_id),
                numbers = numbers.len(),
                tools = tool_results.len(),
                cited = citations.len(),
                "citation extraction finished"
            );
        }

        citations
    }

    /// Match one tokenized number against the tool results, first match
    /// wins, and persist the resulting citation.
    async fn cite_number(
        &self,
        thread_id: &str,
        user_id: &str,
        number: &NumberMatch,
        tool_results: &[ToolResult],
    ) -> anyhow::Result<Option<Citation>> {
        for tool in tool_results {
            if !value_matches(number.value, &tool.result, 0) {
                continue;
            }
            let (source_type, source_identifier) = classify_source(tool);
            let draft = CitationDraft {
                thread_id: thread_id.to_string(),
                user_id: user_id.to_string(),
                source_type,
                citation_text: citation_text(source_type, &source_identifier, &number.original),
                source_identifier,
                data_point: truncate_payload(&tool.result),
                position_in_text: number.position,
            };
            let citation = self.store.create(draft).await?;
            return Ok(Some(citation));
        }
        Ok(None)
    }

    /// All citations recorded for a thread, sorted by where the cited
    /// number sits in the answer text.
    pub async fn citations_for_thread(
        &self,
        thread_id: &str,
        user_id: &str,
    ) -> Result<Vec<Citation>, CitationError> {
        let mut records = self.store.find_by_thread(thread_id).await?;
        records.sort_by_key(|c| c.position_in_text);

        if dev_logging_enabled() {
            tracing::debug!(
                thread = %anon_hash(thread_id),
                user = %anon_hash(user_id),
                count = records.len(),
                "citation list served"
            );
        }

        Ok(records)
    }

    /// One citation with its full (possibly truncated) payload. Only the
    /// owning user may read it.
    pub async fn citation_data(
        &self,
        id: &str,
        user_id: &str,
    ) -> Result<Citation, CitationError> {
        let record = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(CitationError::NotFound)?;
        if record.user_id != user_id {
            return Err(CitationError::Forbidden);
        }
        Ok(record)
    }
}

/// Render the attribution string stored on a citation, e.g.
/// `Source: FRED CPIAUCSL (3.2%)`.
pub fn citation_text(source_type: SourceType, identifier: &str, original: &str) -> String {
    format!("Source: {source_type} {identifier} ({original})")
}

/// Short stable hash for identifiers in debug logs. Raw thread and user ids
/// never reach the log stream.
pub(crate) fn anon_hash(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let digest = hasher.finalize();
    digest.iter().take(6).map(|b| format!("{b:02x}")).collect()
}

/// Hashed-identifier debug logging is opt-in and only honored in dev-style
/// environments, following the `SHUTTLE_ENV` convention.
fn dev_logging_enabled() -> bool {
    if std::env::var("CITATIONS_DEV_LOG").ok().as_deref() != Some("1") {
        return false;
    }
    if cfg!(debug_assertions) {
        return true;
    }
    matches!(
        std::env::var("SHUTTLE_ENV").ok().as_deref(),
        Some("local" | "development" | "dev")
    )
}
