// src/citations/truncate.rs
//! Payload truncator: bounds the serialized size of a tool payload that will
//! be persisted alongside a citation. Oversized payloads are replaced by a
//! marked summary that keeps enough top-level scalars to stay auditable.

use serde_json::{json, Map, Value};

/// Serialized-size ceiling for a persisted `data_point`, matching the
/// store column budget. 1 MiB.
pub const MAX_DATA_POINT_BYTES: usize = 1_048_576;

/// How many top-level scalar fields an oversized object keeps.
const SUMMARY_FIELD_LIMIT: usize = 10;

/// Character cap applied to each kept string so the summary itself stays
/// far below the budget.
const SUMMARY_STRING_CHARS: usize = 120;

/// Marker key present on every truncated summary.
pub const TRUNCATED_KEY: &str = "_truncated";

/// Deterministically bound `payload` for persistence.
///
/// At or under [`MAX_DATA_POINT_BYTES`] the payload passes through as a deep
/// copy (the stored record owns its data and is never mutated afterward).
/// Over it, the payload becomes a summary object: `_truncated: true`,
/// `_original_bytes`, and a bounded sample of the top level.
pub fn truncate_payload(payload: &Value) -> Value {
    let serialized_len = payload.to_string().len();
    if serialized_len <= MAX_DATA_POINT_BYTES {
        return payload.clone();
    }

    let mut summary = Map::new();
    summary.insert(TRUNCATED_KEY.to_string(), json!(true));
    summary.insert("_original_bytes".to_string(), json!(serialized_len));

    match payload {
        Value::Object(map) => {
            for (key, value) in scalar_fields(map).take(SUMMARY_FIELD_LIMIT) {
                summary.insert(key, value);
            }
        }
        Value::Array(items) => {
            summary.insert("_items".to_string(), json!(items.len()));
        }
        scalar => {
            summary.insert("_preview".to_string(), json!(preview(scalar)));
        }
    }

    Value::Object(summary)
}

/// Top-level scalar fields in map order, strings capped for safety.
fn scalar_fields(map: &Map<String, Value>) -> impl Iterator<Item = (String, Value)> + '_ {
    map.iter().filter_map(|(key, value)| match value {
        Value::String(s) => {
            let capped: String = s.chars().take(SUMMARY_STRING_CHARS).collect();
            Some((key.clone(), Value::String(capped)))
        }
        Value::Number(_) | Value::Bool(_) | Value::Null => Some((key.clone(), value.clone())),
        Value::Array(_) | Value::Object(_) => None,
    })
}

fn preview(scalar: &Value) -> String {
    let rendered = match scalar {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    rendered.chars().take(SUMMARY_STRING_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// An object payload just over the budget: one huge string plus a few
    /// scalars worth keeping.
    fn oversized_object() -> Value {
        json!({
            "ticker": "AAPL",
            "price": 150.25,
            "stale": false,
            "note": "x".repeat(MAX_DATA_POINT_BYTES + 64),
            "bars": [1, 2, 3],
        })
    }

    #[test]
    fn small_payload_passes_through_unchanged() {
        let payload = json!({"series_id": "CPIAUCSL", "value": 3.2, "tags": ["cpi"]});
        assert_eq!(truncate_payload(&payload), payload);
    }

    #[test]
    fn boundary_is_at_exactly_one_mebibyte() {
        // A bare string serializes with two quote bytes.
        let at_limit = Value::String("x".repeat(MAX_DATA_POINT_BYTES - 2));
        assert_eq!(truncate_payload(&at_limit), at_limit);

        let over_limit = Value::String("x".repeat(MAX_DATA_POINT_BYTES - 1));
        let out = truncate_payload(&over_limit);
        assert_eq!(out[TRUNCATED_KEY], json!(true));
        assert!(out["_preview"].as_str().unwrap().len() <= SUMMARY_STRING_CHARS);
    }

    #[test]
    fn oversized_object_keeps_bounded_scalars() {
        let out = truncate_payload(&oversized_object());
        assert_eq!(out[TRUNCATED_KEY], json!(true));
        assert_eq!(out["ticker"], json!("AAPL"));
        assert_eq!(out["price"], json!(150.25));
        assert_eq!(out["stale"], json!(false));
        // The huge string survives only capped; nested structures are gone.
        assert_eq!(out["note"].as_str().unwrap().len(), SUMMARY_STRING_CHARS);
        assert!(out.get("bars").is_none());
        assert!(out["_original_bytes"].as_u64().unwrap() > MAX_DATA_POINT_BYTES as u64);
        // The summary itself is nowhere near the budget.
        assert!(out.to_string().len() < 4_096);
    }

    #[test]
    fn oversized_array_summarizes_length() {
        let big = Value::Array(vec![json!(150.25); 400_000]);
        let out = truncate_payload(&big);
        assert_eq!(out[TRUNCATED_KEY], json!(true));
        assert_eq!(out["_items"], json!(400_000));
    }

    #[test]
    fn truncation_is_deterministic() {
        let payload = oversized_object();
        assert_eq!(truncate_payload(&payload), truncate_payload(&payload));
    }
}
