//! MyMemory translation API client.
//! Form-encoded POST to `/get`, single JSON response, no retry and no rate
//! limiting: every error is terminal for the current action.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use super::ranking::{best_translation, Match, MatchPolicy};
use super::{TranslateError, TranslateRequest, TranslateResult, Translator};

pub const DEFAULT_BASE_URL: &str = "https://api.mymemory.translated.net";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub policy: MatchPolicy,
    /// The upstream API configures no timeout; we do.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            policy: MatchPolicy::default(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// MyMemory `/get` client with connection pooling via reqwest.
pub struct MyMemoryClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl MyMemoryClient {
    pub fn new(config: ClientConfig) -> Result<Self, TranslateError> {
        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(config.timeout)
            .build()
            .map_err(|e| TranslateError::Network(e.to_string()))?;

        Ok(Self { http, config })
    }
}

#[async_trait]
impl Translator for MyMemoryClient {
    async fn translate(&self, request: TranslateRequest) -> Result<TranslateResult, TranslateError> {
        if request.source_text.trim().is_empty() {
            return Err(TranslateError::InvalidInput("source text is empty".into()));
        }

        let langpair = format!("{}|{}", request.source_lang, request.target_lang);
        let ts = now_unix().to_string();
        let params = [
            ("q", request.source_text.as_str()),
            ("langpair", langpair.as_str()),
            // Human translation-memory matches only, no machine translation.
            ("mt", "0"),
            ("tm", "1"),
            // Cache-bust.
            ("ts", ts.as_str()),
        ];

        debug!(
            request_id = %request.request_id,
            langpair = %langpair,
            "mymemory request"
        );

        let start = Instant::now();
        let response = self
            .http
            .post(format!("{}/get", self.config.base_url))
            .form(&params)
            .send()
            .await
            .map_err(|e| TranslateError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TranslateError::Network(e.to_string()))?;

        if !status.is_success() {
            warn!(request_id = %request.request_id, status = status.as_u16(), "mymemory non-2xx");
            return Err(TranslateError::Api {
                status: status.as_u16() as i64,
                details: truncate(&body),
            });
        }

        let wire: WireResponse = serde_json::from_str(&body).map_err(|e| {
            warn!(request_id = %request.request_id, error = %e, "mymemory payload decode failed");
            TranslateError::Decode(e.to_string())
        })?;

        if wire.response_status != 200 {
            return Err(TranslateError::Api {
                status: wire.response_status,
                details: wire.response_details,
            });
        }

        let matches: Vec<Match> = wire.matches.into_iter().map(Match::from).collect();
        let (translated_text, match_score) = best_translation(
            &wire.response_data.translated_text,
            &matches,
            &self.config.policy,
        );

        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        debug!(
            request_id = %request.request_id,
            elapsed_ms,
            from_match = match_score.is_some(),
            "mymemory translation selected"
        );

        Ok(TranslateResult {
            request_id: request.request_id,
            translated_text,
            match_score,
            elapsed_ms,
        })
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(200).collect()
}

/// Current time as Unix timestamp (seconds).
fn now_unix() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

// --- Wire types ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireResponse {
    response_data: WireData,
    #[serde(default)]
    response_details: String,
    response_status: i64,
    #[serde(default)]
    matches: Vec<WireMatch>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireData {
    translated_text: String,
}

#[derive(Deserialize)]
struct WireMatch {
    #[serde(default)]
    segment: String,
    translation: String,
    #[serde(rename = "match")]
    score: f32,
}

impl From<WireMatch> for Match {
    fn from(w: WireMatch) -> Self {
        Match {
            segment: w.segment,
            translation: w.translation,
            score: w.score,
        }
    }
}
