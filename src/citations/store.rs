// src/citations/store.rs
//! Citation persistence. The trait is the seam the orchestrator and the API
//! share; the in-memory implementation backs tests and single-instance
//! deployments.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::types::{Citation, CitationDraft};

/// Default bound on retained citations for the in-memory store.
pub const DEFAULT_STORE_CAPACITY: usize = 10_000;

/// Persistence seam for citation records.
///
/// `create` assigns identity: callers hand over a draft and get the
/// finalized record (id + created_at) back. All methods are fallible so
/// backends with real I/O can surface their errors; the orchestrator treats
/// a failure as skipping that one citation.
#[async_trait]
pub trait CitationStore: Send + Sync {
    async fn create(&self, draft: CitationDraft) -> anyhow::Result<Citation>;
    async fn find_by_thread(&self, thread_id: &str) -> anyhow::Result<Vec<Citation>>;
    async fn find_by_id(&self, id: &str) -> anyhow::Result<Option<Citation>>;
}

/// Capacity-bounded in-memory store. Once full, the oldest records are
/// dropped first, same policy as the extraction history buffer.
pub struct MemoryCitationStore {
    inner: Mutex<Vec<Citation>>,
    capacity: usize,
}

impl MemoryCitationStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_STORE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Vec::new()),
            capacity: capacity.max(1),
        }
    }

    fn lock(&self) -> anyhow::Result<MutexGuard<'_, Vec<Citation>>> {
        self.inner
            .lock()
            .map_err(|_| anyhow::anyhow!("citation store mutex poisoned"))
    }
}

impl Default for MemoryCitationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CitationStore for MemoryCitationStore {
    async fn create(&self, draft: CitationDraft) -> anyhow::Result<Citation> {
        let citation = draft.into_citation(Uuid::now_v7().to_string(), Utc::now());
        let mut records = self.lock()?;
        records.push(citation.clone());
        let overflow = records.len().saturating_sub(self.capacity);
        if overflow > 0 {
            records.drain(0..overflow);
        }
        Ok(citation)
    }

    async fn find_by_thread(&self, thread_id: &str) -> anyhow::Result<Vec<Citation>> {
        let records = self.lock()?;
        Ok(records
            .iter()
            .filter(|c| c.thread_id == thread_id)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: &str) -> anyhow::Result<Option<Citation>> {
        let records = self.lock()?;
        Ok(records.iter().find(|c| c.id == id).cloned())
    }
}
