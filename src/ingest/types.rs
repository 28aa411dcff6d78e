// src/ingest/types.rs
use serde::{Deserialize, Serialize};

use crate::error::SourceResult;
use crate::ingest::window::TimeWindow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    NewsFeed,
    Forum,
}

/// One post surfaced to the user. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceItem {
    /// Adapter-assigned, stable across repeated fetches of the same post.
    pub id: String,
    pub title: String,
    pub body: Option<String>,
    pub link: String,
    pub thumbnail_url: Option<String>,
    pub source_kind: SourceKind,
}

impl SourceItem {
    /// Text handed to the rewriter: the body when present, otherwise the title.
    pub fn rewrite_text(&self) -> &str {
        match self.body.as_deref() {
            Some(b) if !b.trim().is_empty() => b,
            _ => &self.title,
        }
    }
}

#[async_trait::async_trait]
pub trait SourceProvider: Send + Sync {
    /// Most-relevant-first, as returned by the provider. Empty is a valid result.
    async fn fetch_latest(&self, window: TimeWindow) -> SourceResult<Vec<SourceItem>>;
    fn name(&self) -> &'static str;
    fn kind(&self) -> SourceKind;
}
