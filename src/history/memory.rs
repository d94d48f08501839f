//! In-memory history store for tests and offline development.
//! Implements the same trait as the remote store, plus fault injection so
//! callers can exercise their no-state-change-on-error paths.

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{HistoryRecord, HistoryStore, StoreError};

#[derive(Default)]
struct Inner {
    records: Vec<HistoryRecord>,
    next_id: u64,
    fail_next: bool,
}

/// Trait-compatible fake keyed by sequential opaque ids.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next operation fail with a store rejection.
    pub fn fail_next(&self) {
        self.inner.lock().fail_next = true;
    }

    /// Records currently held, for assertions.
    pub fn records(&self) -> Vec<HistoryRecord> {
        self.inner.lock().records.clone()
    }

    fn injected_failure(inner: &mut Inner) -> Option<StoreError> {
        if inner.fail_next {
            inner.fail_next = false;
            return Some(StoreError::Api {
                status: 503,
                message: "injected failure".to_string(),
            });
        }
        None
    }
}

#[async_trait]
impl HistoryStore for MemoryStore {
    async fn append(&self, text: &str) -> Result<HistoryRecord, StoreError> {
        let mut inner = self.inner.lock();
        if let Some(err) = Self::injected_failure(&mut inner) {
            return Err(err);
        }
        inner.next_id += 1;
        let record = HistoryRecord {
            id: format!("mem-{}", inner.next_id),
            text: text.to_string(),
        };
        inner.records.push(record.clone());
        Ok(record)
    }

    async fn load_all(&self) -> Result<Vec<String>, StoreError> {
        let mut inner = self.inner.lock();
        if let Some(err) = Self::injected_failure(&mut inner) {
            return Err(err);
        }
        Ok(inner.records.iter().map(|r| r.text.clone()).collect())
    }

    async fn clear_all(&self) -> Result<usize, StoreError> {
        let mut inner = self.inner.lock();
        if let Some(err) = Self::injected_failure(&mut inner) {
            return Err(err);
        }
        let deleted = inner.records.len();
        inner.records.clear();
        Ok(deleted)
    }
}
