// src/history.rs
//! In-memory log of recent extraction runs, surfaced on the debug endpoint.
//! Identifiers are stored hashed; raw thread and user ids never land here.

use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::citations::anon_hash;

#[derive(Debug, Clone, Serialize)]
pub struct ExtractionEntry {
    pub ts_unix: u64,
    /// Hashed thread id.
    pub thread: String,
    /// Hashed user id.
    pub user: String,
    pub tool_results: usize,
    pub numbers_found: usize,
    pub cited: usize,
}

#[derive(Debug)]
pub struct ExtractionHistory {
    inner: Mutex<Vec<ExtractionEntry>>,
    cap: usize,
}

impl ExtractionHistory {
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            inner: Mutex::new(Vec::with_capacity(cap.min(10_000))),
            cap: cap.min(10_000),
        }
    }

    pub fn push(
        &self,
        thread_id: &str,
        user_id: &str,
        tool_results: usize,
        numbers_found: usize,
        cited: usize,
    ) {
        let entry = ExtractionEntry {
            ts_unix: now_unix(),
            thread: anon_hash(thread_id),
            user: anon_hash(user_id),
            tool_results,
            numbers_found,
            cited,
        };

        let mut v = self.inner.lock().expect("history mutex poisoned");
        v.push(entry);
        if v.len() > self.cap {
            let excess = v.len() - self.cap;
            v.drain(0..excess);
        }
    }

    pub fn snapshot_last_n(&self, n: usize) -> Vec<ExtractionEntry> {
        let v = self.inner.lock().expect("history mutex poisoned");
        let start = v.len().saturating_sub(n);
        v[start..].to_vec()
    }
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
