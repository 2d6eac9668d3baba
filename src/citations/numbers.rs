// src/citations/numbers.rs
//! Number tokenizer: scans free text left-to-right and yields every numeric
//! literal as a [`NumberMatch`], understanding the compact notations LLM
//! answers actually use (`$45.67`, `23%`, `2.8M`, `1,234.56`, `-3.2`).

use once_cell::sync::Lazy;
use regex::Regex;

use crate::citations::types::NumberMatch;

/// One candidate blob per starting position, greedy so a longer notation is
/// never split into pieces (`2.8M` is one token, not `2.8` plus noise).
/// A leading `$` is consumed outside the capture so it never lands in
/// `original`. The digit class deliberately over-captures dots so that a
/// malformed token like `1.2.3` is consumed whole and can be rejected whole.
static NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$?(-?\d[\d,.]*(?:[KkMmBb]\b|%)?)").expect("number regex"));

/// Lazily yield every recognizable number in `text`, in order of appearance.
///
/// Pure function of `text`: calling it again restarts the scan. Malformed
/// numeric-looking blobs are skipped, not errored, and scanning resumes
/// after the blob so its tail digits are not re-extracted.
pub fn extract_numbers(text: &str) -> impl Iterator<Item = NumberMatch> + '_ {
    NUMBER_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).and_then(parse_candidate))
}

fn parse_candidate(m: regex::Match<'_>) -> Option<NumberMatch> {
    let raw = m.as_str();

    // 1) Split off a trailing notation suffix, if any.
    let (body, suffix, multiplier): (&str, &str, f64) =
        if let Some(stripped) = raw.strip_suffix('%') {
            // Percent keeps the literal quantity written: "23%" is 23.
            (stripped, "%", 1.0)
        } else if let Some(mult) = raw.chars().last().and_then(magnitude_of) {
            (&raw[..raw.len() - 1], &raw[raw.len() - 1..], mult)
        } else {
            (raw, "", 1.0)
        };

    // 2) Sentence punctuation glued to the number ("150." at end of a
    //    sentence) is not part of the literal.
    let core = body.trim_end_matches(['.', ',']);

    // 3) Reject malformed blobs outright: punctuation between digits and a
    //    suffix ("2.8.M"), or more than one decimal point ("1.2.3").
    if !suffix.is_empty() && core.len() != body.len() {
        return None;
    }
    if core.matches('.').count() > 1 {
        return None;
    }

    // 4) Thousands separators are stripped, not validated.
    let parsed: f64 = core.replace(',', "").parse().ok()?;

    let original_len = core.len() + suffix.len();
    Some(NumberMatch {
        value: parsed * multiplier,
        original: raw[..original_len].to_string(),
        position: m.start(),
    })
}

fn magnitude_of(c: char) -> Option<f64> {
    match c.to_ascii_uppercase() {
        'K' => Some(1_000.0),
        'M' => Some(1_000_000.0),
        'B' => Some(1_000_000_000.0),
        _ => None,
    }
}
