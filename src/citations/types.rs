// src/citations/types.rs
//! Domain types for the citation engine: number matches found in generated
//! text, the closed set of data sources, the persisted `Citation` record,
//! and the typed errors retrieval is allowed to surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A single numeric literal found in generated text.
///
/// `position` is the zero-based byte offset of the first character of
/// `original` in the source text, so `position + original.len()` never
/// exceeds the text length. `original` is the exact substring as written
/// (keeps `%` and K/M/B suffixes, excludes a leading `$`).
#[derive(Debug, Clone, PartialEq)]
pub struct NumberMatch {
    pub value: f64,
    pub original: String,
    pub position: usize,
}

/// Categorical origin of cited data. Closed set: adding a source means
/// extending this enum and the classifier in `source.rs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceType {
    #[serde(rename = "FRED")]
    Fred,
    Polygon,
    #[serde(rename = "NewsAPI")]
    NewsApi,
    #[serde(rename = "FMP")]
    Fmp,
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SourceType::Fred => "FRED",
            SourceType::Polygon => "Polygon",
            SourceType::NewsApi => "NewsAPI",
            SourceType::Fmp => "FMP",
        };
        f.write_str(label)
    }
}

/// One tool invocation as reported by the conversation layer.
///
/// `result` is untrusted external input: arbitrarily shaped, arbitrarily
/// deep, arbitrarily large. Nothing here may assume otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub tool: String,
    #[serde(default)]
    pub result: Value,
}

/// The persisted provenance record linking one numeric claim in generated
/// text to the tool result that grounds it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Citation {
    /// Opaque identifier assigned by the store at creation.
    pub id: String,
    pub thread_id: String,
    pub user_id: String,
    pub source_type: SourceType,
    /// Ticker / series id / article id / title fragment; `"unknown"` when
    /// not derivable from the payload.
    pub source_identifier: String,
    /// The (possibly truncated) tool payload that produced the match.
    /// Copied at creation time and never mutated afterward.
    pub data_point: Value,
    /// Human-readable attribution, e.g. `Source: FRED CPIAUCSL (3.2%)`.
    pub citation_text: String,
    /// Byte offset of the cited number in the final output, used for UI
    /// ordering and click-to-citation mapping.
    pub position_in_text: usize,
    /// Set by the store at persistence time.
    pub created_at: DateTime<Utc>,
}

/// Everything the orchestrator knows about a citation before the store
/// assigns `id` and `created_at`.
#[derive(Debug, Clone)]
pub struct CitationDraft {
    pub thread_id: String,
    pub user_id: String,
    pub source_type: SourceType,
    pub source_identifier: String,
    pub data_point: Value,
    pub citation_text: String,
    pub position_in_text: usize,
}

impl CitationDraft {
    /// Finalize a draft with store-assigned identity. Called by store
    /// implementations, not by the orchestrator.
    pub fn into_citation(self, id: String, created_at: DateTime<Utc>) -> Citation {
        Citation {
            id,
            thread_id: self.thread_id,
            user_id: self.user_id,
            source_type: self.source_type,
            source_identifier: self.source_identifier,
            data_point: self.data_point,
            citation_text: self.citation_text,
            position_in_text: self.position_in_text,
            created_at,
        }
    }
}

/// The only errors this subsystem surfaces to an end user. Everything else
/// is isolated inside extraction and logged.
#[derive(Debug, thiserror::Error)]
pub enum CitationError {
    #[error("citation not found")]
    NotFound,
    #[error("citation does not belong to the requesting user")]
    Forbidden,
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}
