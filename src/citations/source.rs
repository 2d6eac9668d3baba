// src/citations/source.rs
//! Source classifier: maps a tool invocation to a [`SourceType`] and a
//! human-meaningful identifier (ticker, series id, article id).

use serde_json::Value;

use crate::citations::types::{SourceType, ToolResult};

/// Identifier used when nothing derivable is present on the payload.
pub const UNKNOWN_IDENTIFIER: &str = "unknown";

/// How much of a news title survives as an identifier.
const TITLE_IDENTIFIER_CHARS: usize = 50;

/// Classify a tool invocation by name, then pull the best identifier for
/// that source off the top level of its result payload.
///
/// Name matching is case-insensitive substring, in priority order; anything
/// unrecognized is FMP by policy (the market-data aggregator is the catch-all
/// for generic quote tools), not an error.
pub fn classify_source(tool: &ToolResult) -> (SourceType, String) {
    let name = tool.tool.to_ascii_lowercase();
    let source_type = if name.contains("fred") {
        SourceType::Fred
    } else if name.contains("polygon") {
        SourceType::Polygon
    } else if name.contains("news") {
        SourceType::NewsApi
    } else {
        // Explicit default: unmatched names (including "fmp" itself) are FMP.
        SourceType::Fmp
    };
    (source_type, identifier_for(source_type, &tool.result))
}

fn identifier_for(source_type: SourceType, result: &Value) -> String {
    match source_type {
        SourceType::Fred => first_string_field(result, &["series_id", "seriesId"])
            .unwrap_or(UNKNOWN_IDENTIFIER)
            .to_string(),
        SourceType::Polygon | SourceType::Fmp => {
            first_string_field(result, &["ticker", "symbol"])
                .unwrap_or(UNKNOWN_IDENTIFIER)
                .to_string()
        }
        SourceType::NewsApi => {
            if let Some(id) = first_string_field(result, &["article_id"]) {
                id.to_string()
            } else if let Some(title) = first_string_field(result, &["title"]) {
                title.chars().take(TITLE_IDENTIFIER_CHARS).collect()
            } else {
                UNKNOWN_IDENTIFIER.to_string()
            }
        }
    }
}

/// First of `keys` present on `result` with a string value. Non-string
/// values are treated as absent, never coerced.
fn first_string_field<'a>(result: &'a Value, keys: &[&str]) -> Option<&'a str> {
    let map = result.as_object()?;
    keys.iter().find_map(|k| map.get(*k).and_then(Value::as_str))
}
