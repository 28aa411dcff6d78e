// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod inflight;
pub mod ingest;
pub mod metrics;
pub mod orchestrator;
pub mod rewrite;

// ---- Re-exports for stable public API ----
pub use crate::api::create_router;
pub use crate::cache::{cache_key, ContentCache};
pub use crate::config::AppConfig;
pub use crate::ingest::types::{SourceItem, SourceKind, SourceProvider};
pub use crate::ingest::window::TimeWindow;
pub use crate::orchestrator::{AppState, Orchestrator, Perspective};
pub use crate::rewrite::{RewriteClient, RewriteResult};

use std::sync::Arc;
use tracing::info;

/// Build the orchestrator from config and perform the first fetch.
///
/// Never fails on upstream trouble: an unreachable feed just yields an empty list.
pub async fn bootstrap(cfg: &AppConfig) -> Arc<Orchestrator> {
    let orchestrator = Arc::new(Orchestrator::from_config(cfg));
    let _ = orchestrator.refresh().await;
    let s = orchestrator.snapshot();
    info!(items = s.items.len(), window = %s.window, "initial fetch finished");
    orchestrator
}
