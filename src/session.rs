//! Session state: the mediator between UI actions and the translation +
//! history services. State changes flow through a pure reducer over an
//! explicit snapshot; every new snapshot is published on a watch channel
//! for UI subscribers.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::history::{HistoryStore, StoreError};
use crate::languages;
use crate::metrics::{metric_names, MetricsRegistry};
use crate::translate::{TranslateError, TranslateRequest, Translator};

/// UI-visible state. The history list is a cached projection of the remote
/// collection, never the source of truth.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub translated_text: String,
    pub history: Vec<String>,
    /// True while a translate action is outstanding. Gating re-entrant
    /// submissions on it is the UI layer's job.
    pub busy: bool,
}

/// State transitions, applied through [`apply`].
#[derive(Debug, Clone)]
pub enum SessionEvent {
    TranslateStarted,
    /// API call succeeded; the translation becomes visible immediately,
    /// before the history write completes.
    TranslateFinished { translated: String },
    /// The store confirmed the write; the record enters the local list and
    /// the action is complete.
    RecordStored { text: String },
    HistoryLoaded { entries: Vec<String> },
    HistoryCleared,
    /// Terminal failure of the current action: only the busy flag changes.
    ActionFailed,
}

/// Pure reducer: the only way snapshots change.
pub fn apply(snapshot: &SessionSnapshot, event: &SessionEvent) -> SessionSnapshot {
    let mut next = snapshot.clone();
    match event {
        SessionEvent::TranslateStarted => {
            next.busy = true;
        }
        SessionEvent::TranslateFinished { translated } => {
            next.translated_text = translated.clone();
        }
        SessionEvent::RecordStored { text } => {
            next.history.push(text.clone());
            next.busy = false;
        }
        SessionEvent::HistoryLoaded { entries } => {
            next.history = entries.clone();
        }
        SessionEvent::HistoryCleared => {
            next.history.clear();
        }
        SessionEvent::ActionFailed => {
            next.busy = false;
        }
    }
    next
}

#[derive(Debug)]
pub enum SessionError {
    Translate(TranslateError),
    Store(StoreError),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::Translate(e) => write!(f, "{e}"),
            SessionError::Store(e) => write!(f, "{e}"),
        }
    }
}

impl From<TranslateError> for SessionError {
    fn from(e: TranslateError) -> Self {
        SessionError::Translate(e)
    }
}

impl From<StoreError> for SessionError {
    fn from(e: StoreError) -> Self {
        SessionError::Store(e)
    }
}

/// Mediator owning the snapshot. One outstanding translate action at a time
/// from the UI's perspective; completions are last-writer-wins on the
/// visible fields.
pub struct Session {
    translator: Arc<dyn Translator>,
    store: Arc<dyn HistoryStore>,
    metrics: Arc<MetricsRegistry>,
    snapshot: RwLock<SessionSnapshot>,
    watch_tx: watch::Sender<SessionSnapshot>,
    watch_rx: watch::Receiver<SessionSnapshot>,
}

impl Session {
    pub fn new(
        translator: Arc<dyn Translator>,
        store: Arc<dyn HistoryStore>,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        let (watch_tx, watch_rx) = watch::channel(SessionSnapshot::default());
        Self {
            translator,
            store,
            metrics,
            snapshot: RwLock::new(SessionSnapshot::default()),
            watch_tx,
            watch_rx,
        }
    }

    /// Current snapshot (non-blocking read).
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot.read().clone()
    }

    /// Subscribe to snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.watch_rx.clone()
    }

    fn dispatch(&self, event: SessionEvent) {
        let mut snapshot = self.snapshot.write();
        *snapshot = apply(&snapshot, &event);
        let _ = self.watch_tx.send(snapshot.clone());
    }

    /// Run one translate action: resolve language codes, call the backend,
    /// publish the translation, then persist the history record. The local
    /// history gains the record only after the store confirms the write.
    pub async fn translate(
        &self,
        text: &str,
        source_name: &str,
        target_name: &str,
    ) -> Result<String, SessionError> {
        let request_id = Uuid::new_v4().to_string();
        let source_lang = languages::resolve(source_name);
        let target_lang = languages::resolve(target_name);

        info!(
            request_id = %request_id,
            source_lang,
            target_lang,
            "translate_action"
        );
        self.dispatch(SessionEvent::TranslateStarted);

        let span = self.metrics.span(metric_names::TRANSLATE_DONE);
        let result = self
            .translator
            .translate(TranslateRequest {
                request_id: request_id.clone(),
                source_text: text.to_string(),
                source_lang: source_lang.to_string(),
                target_lang: target_lang.to_string(),
            })
            .await;

        let result = match result {
            Ok(r) => {
                span.finish();
                r
            }
            Err(e) => {
                warn!(request_id = %request_id, error = %e, "translate failed");
                self.dispatch(SessionEvent::ActionFailed);
                return Err(e.into());
            }
        };

        self.dispatch(SessionEvent::TranslateFinished {
            translated: result.translated_text.clone(),
        });

        let record_text = format!("{} -> {}", text, result.translated_text);
        let span = self.metrics.span(metric_names::HISTORY_APPEND);
        match self.store.append(&record_text).await {
            Ok(record) => {
                span.finish();
                debug!(request_id = %request_id, id = %record.id, "history_record_stored");
                self.dispatch(SessionEvent::RecordStored { text: record.text });
                Ok(result.translated_text)
            }
            Err(e) => {
                warn!(request_id = %request_id, error = %e, "history append failed");
                self.dispatch(SessionEvent::ActionFailed);
                Err(e.into())
            }
        }
    }

    /// Replace the local history with the remote collection. Invoked once at
    /// app start; on failure existing state is untouched.
    pub async fn load_history(&self) -> Result<usize, SessionError> {
        let span = self.metrics.span(metric_names::HISTORY_LOAD);
        match self.store.load_all().await {
            Ok(entries) => {
                span.finish();
                let count = entries.len();
                info!(count, "history_loaded");
                self.dispatch(SessionEvent::HistoryLoaded { entries });
                Ok(count)
            }
            Err(e) => {
                warn!(error = %e, "history load failed");
                Err(e.into())
            }
        }
    }

    /// Clear the remote collection, then the local list. The local list is
    /// only emptied after the store confirms every delete; a partial clear
    /// surfaces as an error and leaves the local view intact.
    pub async fn clear_history(&self) -> Result<usize, SessionError> {
        let span = self.metrics.span(metric_names::HISTORY_CLEAR);
        match self.store.clear_all().await {
            Ok(deleted) => {
                span.finish();
                info!(deleted, "history_cleared");
                self.dispatch(SessionEvent::HistoryCleared);
                Ok(deleted)
            }
            Err(e) => {
                warn!(error = %e, "history clear failed");
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::memory::MemoryStore;
    use crate::translate::mymemory::{ClientConfig, MyMemoryClient};
    use crate::translate::ranking::MatchPolicy;
    use crate::translate::{StubTranslator, TranslateResult};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::time::Duration;

    /// Backend double that returns a fixed translation and remembers the
    /// last request it saw.
    struct FixedTranslator {
        reply: String,
        last: Mutex<Option<TranslateRequest>>,
    }

    impl FixedTranslator {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                last: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl Translator for FixedTranslator {
        async fn translate(
            &self,
            request: TranslateRequest,
        ) -> Result<TranslateResult, TranslateError> {
            let request_id = request.request_id.clone();
            *self.last.lock() = Some(request);
            Ok(TranslateResult {
                request_id,
                translated_text: self.reply.clone(),
                match_score: None,
                elapsed_ms: 0.0,
            })
        }
    }

    struct FailingTranslator;

    #[async_trait]
    impl Translator for FailingTranslator {
        async fn translate(
            &self,
            _request: TranslateRequest,
        ) -> Result<TranslateResult, TranslateError> {
            Err(TranslateError::Network("connection dropped".to_string()))
        }
    }

    fn session_with(translator: Arc<dyn Translator>, store: Arc<MemoryStore>) -> Session {
        Session::new(translator, store, Arc::new(MetricsRegistry::new()))
    }

    #[tokio::test]
    async fn translate_resolves_codes_and_appends_after_store_confirm() {
        let translator = Arc::new(FixedTranslator::new("Hola"));
        let store = Arc::new(MemoryStore::new());
        let session = session_with(translator.clone(), store.clone());

        let translated = session.translate("Hello", "English", "Spanish").await.unwrap();
        assert_eq!(translated, "Hola");

        let request = translator.last.lock().clone().unwrap();
        assert_eq!(request.source_lang, "en");
        assert_eq!(request.target_lang, "es");

        let snapshot = session.snapshot();
        assert_eq!(snapshot.translated_text, "Hola");
        assert_eq!(snapshot.history, vec!["Hello -> Hola"]);
        assert!(!snapshot.busy);

        let records = store.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text, "Hello -> Hola");
    }

    #[tokio::test]
    async fn unknown_language_names_default_to_english() {
        let translator = Arc::new(FixedTranslator::new("x"));
        let session = session_with(translator.clone(), Arc::new(MemoryStore::new()));

        session.translate("hi", "Klingon", "Elvish").await.unwrap();

        let request = translator.last.lock().clone().unwrap();
        assert_eq!(request.source_lang, "en");
        assert_eq!(request.target_lang, "en");
    }

    #[tokio::test]
    async fn translate_failure_leaves_state_unchanged_and_clears_busy() {
        let session = session_with(Arc::new(FailingTranslator), Arc::new(MemoryStore::new()));

        let err = session.translate("Hello", "English", "Spanish").await.unwrap_err();
        assert!(matches!(err, SessionError::Translate(TranslateError::Network(_))));

        let snapshot = session.snapshot();
        assert_eq!(snapshot.translated_text, "");
        assert!(snapshot.history.is_empty());
        assert!(!snapshot.busy);
    }

    #[tokio::test]
    async fn store_rejection_keeps_translation_visible_but_history_unchanged() {
        let store = Arc::new(MemoryStore::new());
        let session = session_with(Arc::new(FixedTranslator::new("Hola")), store.clone());
        store.fail_next();

        let err = session.translate("Hello", "English", "Spanish").await.unwrap_err();
        assert!(matches!(err, SessionError::Store(StoreError::Api { .. })));

        let snapshot = session.snapshot();
        assert_eq!(snapshot.translated_text, "Hola");
        assert!(snapshot.history.is_empty());
        assert!(!snapshot.busy);
        assert!(store.records().is_empty());
    }

    #[tokio::test]
    async fn load_history_replaces_the_local_list() {
        let store = Arc::new(MemoryStore::new());
        store.append("hi -> hola").await.unwrap();
        store.append("bye -> adios").await.unwrap();

        let session = session_with(Arc::new(StubTranslator), store);
        assert_eq!(session.load_history().await.unwrap(), 2);
        assert_eq!(session.snapshot().history, vec!["hi -> hola", "bye -> adios"]);
    }

    #[tokio::test]
    async fn failed_load_leaves_existing_history_untouched() {
        let store = Arc::new(MemoryStore::new());
        let session = session_with(Arc::new(FixedTranslator::new("Hola")), store.clone());
        session.translate("Hello", "English", "Spanish").await.unwrap();

        store.fail_next();
        assert!(session.load_history().await.is_err());
        assert_eq!(session.snapshot().history, vec!["Hello -> Hola"]);
    }

    #[tokio::test]
    async fn clear_history_empties_local_list_after_confirmed_success() {
        let store = Arc::new(MemoryStore::new());
        let session = session_with(Arc::new(FixedTranslator::new("Hola")), store.clone());
        session.translate("Hello", "English", "Spanish").await.unwrap();

        assert_eq!(session.clear_history().await.unwrap(), 1);
        assert!(session.snapshot().history.is_empty());
        assert!(store.records().is_empty());
    }

    #[tokio::test]
    async fn failed_clear_leaves_local_list_intact() {
        let store = Arc::new(MemoryStore::new());
        let session = session_with(Arc::new(FixedTranslator::new("Hola")), store.clone());
        session.translate("Hello", "English", "Spanish").await.unwrap();

        store.fail_next();
        assert!(session.clear_history().await.is_err());
        assert_eq!(session.snapshot().history, vec!["Hello -> Hola"]);
    }

    #[tokio::test]
    async fn subscribers_observe_the_final_snapshot() {
        let session = session_with(Arc::new(FixedTranslator::new("Hola")), Arc::new(MemoryStore::new()));
        let rx = session.subscribe();

        session.translate("Hello", "English", "Spanish").await.unwrap();

        let seen = rx.borrow().clone();
        assert_eq!(seen, session.snapshot());
        assert!(!seen.busy);
    }

    #[tokio::test]
    async fn end_to_end_against_mocked_api() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/get")
            .match_body(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("q".into(), "Hello".into()),
                mockito::Matcher::UrlEncoded("langpair".into(), "en|es".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"responseData":{"translatedText":"Hola"},"responseDetails":"","responseStatus":200}"#)
            .create_async()
            .await;

        let client = MyMemoryClient::new(ClientConfig {
            base_url: server.url(),
            policy: MatchPolicy::default(),
            timeout: Duration::from_secs(5),
        })
        .unwrap();

        let store = Arc::new(MemoryStore::new());
        let session = session_with(Arc::new(client), store.clone());

        let translated = session.translate("Hello", "English", "Spanish").await.unwrap();
        assert_eq!(translated, "Hola");
        assert_eq!(session.snapshot().translated_text, "Hola");
        assert_eq!(session.snapshot().history, vec!["Hello -> Hola"]);
        assert_eq!(store.records()[0].text, "Hello -> Hola");
    }

    #[test]
    fn reducer_transitions() {
        let initial = SessionSnapshot::default();

        let busy = apply(&initial, &SessionEvent::TranslateStarted);
        assert!(busy.busy);

        let translated = apply(
            &busy,
            &SessionEvent::TranslateFinished {
                translated: "Hola".to_string(),
            },
        );
        assert_eq!(translated.translated_text, "Hola");
        assert!(translated.busy);

        let stored = apply(
            &translated,
            &SessionEvent::RecordStored {
                text: "Hello -> Hola".to_string(),
            },
        );
        assert_eq!(stored.history, vec!["Hello -> Hola"]);
        assert!(!stored.busy);

        let failed = apply(&busy, &SessionEvent::ActionFailed);
        assert!(!failed.busy);
        assert_eq!(failed.translated_text, "");

        let cleared = apply(&stored, &SessionEvent::HistoryCleared);
        assert!(cleared.history.is_empty());
    }
}
