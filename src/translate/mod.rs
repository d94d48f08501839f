//! Translation pipeline: request/result types, backend trait, errors.
//! The production backend is the MyMemory client in [`mymemory`]; candidate
//! selection lives in [`ranking`].

pub mod mymemory;
pub mod ranking;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Translation request, created per user action and discarded afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct TranslateRequest {
    pub request_id: String,
    pub source_text: String,
    pub source_lang: String,
    pub target_lang: String,
}

/// Translation result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateResult {
    pub request_id: String,
    pub translated_text: String,
    /// Score of the alternative match that won, if one beat the primary text.
    pub match_score: Option<f32>,
    pub elapsed_ms: f64,
}

/// Translator trait (adapter for different backends).
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, request: TranslateRequest) -> Result<TranslateResult, TranslateError>;
}

#[derive(Debug)]
pub enum TranslateError {
    /// Transport or connectivity failure. Never retried.
    Network(String),
    /// Response body did not parse as the expected payload.
    Decode(String),
    /// Well-formed response reporting a non-success status.
    Api { status: i64, details: String },
    InvalidInput(String),
}

impl std::fmt::Display for TranslateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranslateError::Network(msg) => write!(f, "network error: {msg}"),
            TranslateError::Decode(msg) => write!(f, "decode error: {msg}"),
            TranslateError::Api { status, details } => {
                write!(f, "API error (status {status}): {details}")
            }
            TranslateError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
        }
    }
}

/// Offline translator for UI development and tests: echoes the source text
/// tagged with the target language.
pub struct StubTranslator;

#[async_trait]
impl Translator for StubTranslator {
    async fn translate(&self, req: TranslateRequest) -> Result<TranslateResult, TranslateError> {
        Ok(TranslateResult {
            request_id: req.request_id,
            translated_text: format!("[{}] {}", req.target_lang, req.source_text),
            match_score: None,
            elapsed_ms: 0.0,
        })
    }
}
