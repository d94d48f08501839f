//! Lingo: translation pipeline + cloud history core for a mobile
//! translation app. The UI layer embeds this crate, drives the [`Session`]
//! mediator, and renders the snapshots it publishes.

pub mod history;
pub mod languages;
pub mod metrics;
pub mod session;
pub mod translate;

pub use history::firestore::{FirestoreStore, StoreConfig};
pub use history::memory::MemoryStore;
pub use history::{HistoryRecord, HistoryStore, StoreError};
pub use metrics::MetricsRegistry;
pub use session::{Session, SessionError, SessionEvent, SessionSnapshot};
pub use translate::mymemory::{ClientConfig, MyMemoryClient};
pub use translate::ranking::MatchPolicy;
pub use translate::{TranslateError, TranslateRequest, TranslateResult, Translator};

/// Initialize tracing for the hosting app. Respects `RUST_LOG`.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lingo=debug".parse().unwrap()),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();
}
