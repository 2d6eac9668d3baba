// src/citations/matcher.rs
//! Tolerant value matcher: decides whether an arbitrary tool payload
//! contains a number approximately equal to a target, walking the payload
//! tree with a hard depth ceiling so untrusted input always terminates.

use serde_json::Value;

/// Relative tolerance for non-zero targets. Tool results and LLM-rendered
/// text round independently (a series value of 100.00 may be written as
/// "about 103"), so equality must be approximate; 5% is the calibration
/// point the test suite pins down.
pub const VALUE_TOLERANCE: f64 = 0.05;

/// Maximum recursion depth into a payload. Calls past this depth match
/// nothing, which bounds the walk on cyclic or pathologically deep input.
/// A hard ceiling, not a tunable.
pub const MAX_MATCH_DEPTH: usize = 5;

/// True when `payload` contains a number within tolerance of `target`,
/// searching arrays and object values (never keys) up to
/// [`MAX_MATCH_DEPTH`]. Strings, booleans, and null never match; numeric
/// strings are deliberately not coerced.
pub fn value_matches(target: f64, payload: &Value, depth: usize) -> bool {
    if depth > MAX_MATCH_DEPTH {
        return false;
    }
    match payload {
        Value::Number(n) => n
            .as_f64()
            .is_some_and(|candidate| within_tolerance(target, candidate)),
        Value::Array(items) => items.iter().any(|v| value_matches(target, v, depth + 1)),
        Value::Object(map) => map.values().any(|v| value_matches(target, v, depth + 1)),
        _ => false,
    }
}

/// Relative comparison against `|target|`; absolute comparison when the
/// target is exactly zero (nothing to scale by).
fn within_tolerance(target: f64, candidate: f64) -> bool {
    if target == 0.0 {
        candidate.abs() <= VALUE_TOLERANCE
    } else {
        (target - candidate).abs() / target.abs() <= VALUE_TOLERANCE
    }
}
