//! Translation history persistence in a remote document collection.
//! The store is an injected capability: the session mediator only sees the
//! [`HistoryStore`] trait, so tests substitute the in-memory fake.

pub mod firestore;
pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One persisted `"<original> -> <translated>"` entry tied to the opaque id
/// the store assigned to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: String,
    pub text: String,
}

#[derive(Debug)]
pub enum StoreError {
    /// Transport or connectivity failure.
    Network(String),
    /// Store response did not parse as the expected payload.
    Decode(String),
    /// Store rejected the operation.
    Api { status: u16, message: String },
    /// A clear removed some records but not all. The remote collection and
    /// any local view now disagree until the clear is retried.
    PartialClear { deleted: usize, failed: usize },
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Network(msg) => write!(f, "store network error: {msg}"),
            StoreError::Decode(msg) => write!(f, "store decode error: {msg}"),
            StoreError::Api { status, message } => {
                write!(f, "store error (status {status}): {message}")
            }
            StoreError::PartialClear { deleted, failed } => {
                write!(f, "partial clear: {deleted} deleted, {failed} failed")
            }
        }
    }
}

/// Remote document collection of translation records.
///
/// All operations are independent network round-trips; the caller owns any
/// in-memory projection and updates it only on the success path.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Create exactly one new record holding `text`.
    async fn append(&self, text: &str) -> Result<HistoryRecord, StoreError>;

    /// Fetch every record's text, in store-reported order.
    async fn load_all(&self) -> Result<Vec<String>, StoreError>;

    /// Delete every record. Returns the number deleted on full success;
    /// a partially failed clear reports [`StoreError::PartialClear`].
    async fn clear_all(&self) -> Result<usize, StoreError>;
}
