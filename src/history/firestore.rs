//! Firestore REST implementation of the history store.
//! One collection of documents with a single `translation` string field,
//! matching what the mobile app keeps in the cloud.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{HistoryRecord, HistoryStore, StoreError};

#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Override to point at an emulator or mock server.
    pub base_url: String,
    pub project_id: String,
    pub collection: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: "https://firestore.googleapis.com".to_string(),
            project_id: "translate-me".to_string(),
            collection: "translations".to_string(),
        }
    }
}

/// History store backed by a Firestore-style document collection.
pub struct FirestoreStore {
    http: reqwest::Client,
    config: StoreConfig,
}

impl FirestoreStore {
    pub fn new(config: StoreConfig) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| StoreError::Network(e.to_string()))?;

        Ok(Self { http, config })
    }

    fn collection_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/databases/(default)/documents/{}",
            self.config.base_url, self.config.project_id, self.config.collection
        )
    }

    fn document_url(&self, id: &str) -> String {
        format!("{}/{}", self.collection_url(), id)
    }

    /// Fetch the full collection listing.
    async fn list_documents(&self) -> Result<Vec<Document>, StoreError> {
        let response = self
            .http
            .get(self.collection_url())
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(StoreError::Api {
                status: status.as_u16(),
                message: truncate(&body),
            });
        }

        let listing: ListResponse =
            serde_json::from_str(&body).map_err(|e| StoreError::Decode(e.to_string()))?;
        Ok(listing.documents)
    }
}

#[async_trait]
impl HistoryStore for FirestoreStore {
    async fn append(&self, text: &str) -> Result<HistoryRecord, StoreError> {
        let body = DocumentBody {
            fields: Fields {
                translation: StringValue {
                    string_value: text.to_string(),
                },
            },
        };

        let response = self
            .http
            .post(self.collection_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        let status = response.status();
        let raw = response
            .text()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "history append rejected");
            return Err(StoreError::Api {
                status: status.as_u16(),
                message: truncate(&raw),
            });
        }

        let doc: Document =
            serde_json::from_str(&raw).map_err(|e| StoreError::Decode(e.to_string()))?;
        let id = doc.record_id().to_string();
        debug!(id = %id, "history record stored");

        Ok(HistoryRecord {
            id,
            text: text.to_string(),
        })
    }

    async fn load_all(&self) -> Result<Vec<String>, StoreError> {
        let documents = self.list_documents().await?;
        let mut texts = Vec::with_capacity(documents.len());
        for doc in &documents {
            match &doc.fields {
                Some(fields) => texts.push(fields.translation.string_value.clone()),
                None => {
                    warn!(id = %doc.record_id(), "document without translation field, skipping");
                }
            }
        }
        debug!(count = texts.len(), "history loaded");
        Ok(texts)
    }

    async fn clear_all(&self) -> Result<usize, StoreError> {
        let documents = self.list_documents().await?;
        let total = documents.len();
        let mut deleted = 0usize;

        for doc in &documents {
            let id = doc.record_id();
            let outcome = self.http.delete(self.document_url(id)).send().await;
            match outcome {
                Ok(resp) if resp.status().is_success() => deleted += 1,
                Ok(resp) => {
                    warn!(id = %id, status = resp.status().as_u16(), "history delete rejected");
                }
                Err(e) => {
                    warn!(id = %id, error = %e, "history delete failed");
                }
            }
        }

        let failed = total - deleted;
        if failed > 0 {
            return Err(StoreError::PartialClear { deleted, failed });
        }
        info!(deleted, "history cleared");
        Ok(deleted)
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(200).collect()
}

// --- Wire types ---

#[derive(Serialize)]
struct DocumentBody {
    fields: Fields,
}

#[derive(Serialize, Deserialize)]
struct Fields {
    translation: StringValue,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StringValue {
    string_value: String,
}

/// A stored document. `name` is the full resource path; the final segment is
/// the opaque record id.
#[derive(Deserialize)]
struct Document {
    name: String,
    fields: Option<Fields>,
}

impl Document {
    fn record_id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }
}

#[derive(Deserialize)]
struct ListResponse {
    #[serde(default)]
    documents: Vec<Document>,
}
