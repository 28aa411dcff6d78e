//! # Orchestrator
//! Composition root for "select an item → see its rewrite".
//!
//! Owns the injected services and the application state. The presentation
//! layer reads snapshots (`snapshot()` / `subscribe()`) and never mutates
//! state directly.
//!
//! Rewrite flow for the selected item:
//! 1. fresh cache hit → display is `Ready` immediately;
//! 2. otherwise display goes `Loading` and a background task calls the
//!    rewriter through the in-flight registry;
//! 3. on completion the result is cached under the window active *at
//!    completion time* plus the item id, and shown only if that item is
//!    still the one selected.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::{cache_key, ContentCache};
use crate::config::AppConfig;
use crate::inflight::InflightRegistry;
use crate::ingest::providers::build_providers;
use crate::ingest::types::{SourceItem, SourceProvider};
use crate::ingest::window::TimeWindow;
use crate::ingest::fetch_all;
use crate::rewrite::{build_rewriter, DynRewriter, RewriteResult};

/// The three-way summary selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Perspective {
    Left,
    #[default]
    Neutral,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayStatus {
    #[default]
    Idle,
    Loading,
    Ready,
}

/// What is currently shown for the selected item.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DisplayState {
    pub key: Option<String>,
    pub item_id: Option<String>,
    pub status: DisplayStatus,
    pub result: Option<RewriteResult>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AppState {
    pub window: TimeWindow,
    pub items: Vec<SourceItem>,
    pub selected: Option<usize>,
    pub perspective: Perspective,
    pub display: DisplayState,
    pub last_refresh: Option<DateTime<Utc>>,
}

impl AppState {
    fn new(window: TimeWindow) -> Self {
        Self {
            window,
            items: Vec::new(),
            selected: None,
            perspective: Perspective::default(),
            display: DisplayState::default(),
            last_refresh: None,
        }
    }

    pub fn selected_item(&self) -> Option<&SourceItem> {
        self.selected.and_then(|i| self.items.get(i))
    }

    /// Headline for the selected card: the rewrite's, else the original title.
    pub fn headline(&self) -> Option<&str> {
        let item = self.selected_item()?;
        Some(match &self.display.result {
            Some(r) => r.display_headline(&item.title),
            None => &item.title,
        })
    }

    /// Body text for the active perspective, once a rewrite is shown.
    pub fn visible_text(&self) -> Option<&str> {
        let r = self.display.result.as_ref()?;
        match self.perspective {
            Perspective::Neutral => r.neutral_summary.as_deref(),
            Perspective::Left => r.left_leaning_view.as_deref(),
            Perspective::Right => r.right_leaning_view.as_deref(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("index {index} out of range ({len} items)")]
    OutOfRange { index: usize, len: usize },
}

pub struct Orchestrator {
    providers: Vec<Box<dyn SourceProvider>>,
    rewriter: DynRewriter,
    cache: Arc<ContentCache>,
    inflight: InflightRegistry<RewriteResult>,
    state: watch::Sender<AppState>,
}

impl Orchestrator {
    pub fn new(
        providers: Vec<Box<dyn SourceProvider>>,
        rewriter: DynRewriter,
        cache: Arc<ContentCache>,
        window: TimeWindow,
    ) -> Self {
        let (state, _rx) = watch::channel(AppState::new(window));
        Self {
            providers,
            rewriter,
            cache,
            inflight: InflightRegistry::new(),
            state,
        }
    }

    /// Wire the production services described by `cfg`.
    pub fn from_config(cfg: &AppConfig) -> Self {
        // Configs built in code skip `sanitize`; never let chrono's range check panic.
        let ttl = i64::try_from(cfg.cache.ttl_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or(chrono::TimeDelta::MAX);
        let rewriter = build_rewriter(cfg);
        info!(
            provider = rewriter.provider_name(),
            ttl_secs = cfg.cache.ttl_secs,
            window = %cfg.default_window,
            "orchestrator wired"
        );
        Self::new(
            build_providers(cfg),
            rewriter,
            Arc::new(ContentCache::new(ttl)),
            cfg.default_window,
        )
    }

    pub fn snapshot(&self) -> AppState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.state.subscribe()
    }

    pub fn cache(&self) -> &ContentCache {
        &self.cache
    }

    pub fn rewriter_name(&self) -> &'static str {
        self.rewriter.provider_name()
    }

    /// Re-fetch items for the current window and rewrite the first one.
    ///
    /// Returns the handle of the background rewrite, if one was started.
    pub async fn refresh(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        let window = self.state.borrow().window;
        let items = fetch_all(&self.providers, window).await;
        let swept = self.cache.sweep();

        let applied = self.state.send_if_modified(|s| {
            if s.window != window {
                // A window change raced this fetch; its own refresh wins.
                return false;
            }
            s.selected = if items.is_empty() { None } else { Some(0) };
            s.items = items;
            s.display = DisplayState::default();
            s.last_refresh = Some(Utc::now());
            true
        });

        let count = self.state.borrow().items.len();
        info!(window = %window, items = count, swept, applied, "refresh");
        if !applied {
            return None;
        }
        self.begin_rewrite()
    }

    /// Select the card at `index` and show its rewrite.
    pub fn select(self: &Arc<Self>, index: usize) -> Result<Option<JoinHandle<()>>, SelectionError> {
        let len = self.state.borrow().items.len();
        if index >= len {
            return Err(SelectionError::OutOfRange { index, len });
        }
        self.state.send_modify(|s| {
            s.selected = Some(index);
            s.display = DisplayState::default();
        });
        Ok(self.begin_rewrite())
    }

    /// Switch the time window. Same window is a no-op; otherwise items are re-fetched.
    pub async fn set_window(self: &Arc<Self>, window: TimeWindow) -> Option<JoinHandle<()>> {
        let changed = self.state.send_if_modified(|s| {
            if s.window == window {
                return false;
            }
            s.window = window;
            s.items.clear();
            s.selected = None;
            s.display = DisplayState::default();
            true
        });
        if !changed {
            debug!(window = %window, "window unchanged, keeping items");
            return None;
        }
        self.refresh().await
    }

    pub fn set_perspective(&self, perspective: Perspective) {
        self.state.send_if_modified(|s| {
            let changed = s.perspective != perspective;
            s.perspective = perspective;
            changed
        });
    }

    /// Headline for any card: cached or freshly rewritten, else the original title.
    ///
    /// Shares the in-flight registry with the main rewrite, so rendering a card
    /// while its item is being rewritten does not issue a second call.
    pub async fn card_headline(&self, index: usize) -> Result<String, SelectionError> {
        let (window, item) = {
            let s = self.state.borrow();
            let item = s.items.get(index).cloned().ok_or(SelectionError::OutOfRange {
                index,
                len: s.items.len(),
            })?;
            (s.window, item)
        };

        let key = cache_key(window, &item.id);
        let result = match self.cache.get(&key) {
            Some(hit) => hit,
            None => self.rewrite_shared(&key, &item).await,
        };
        Ok(result.display_headline(&item.title).to_string())
    }

    /// Periodically drop expired cache entries. Lookups stay correct without it.
    pub fn spawn_sweeper(self: &Arc<Self>, every: std::time::Duration) -> JoinHandle<()> {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let removed = this.cache.sweep();
                debug!(target: "cache", removed, "periodic sweep");
            }
        })
    }

    /// Start (or reuse) the rewrite for the selected item.
    fn begin_rewrite(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        let (window, item) = {
            let s = self.state.borrow();
            (s.window, s.selected_item().cloned()?)
        };
        let key = cache_key(window, &item.id);

        if let Some(hit) = self.cache.get(&key) {
            debug!(target: "cache", %key, "hit");
            self.state.send_modify(|s| {
                s.display = DisplayState {
                    key: Some(key),
                    item_id: Some(item.id.clone()),
                    status: DisplayStatus::Ready,
                    result: Some(hit),
                };
            });
            return None;
        }

        debug!(target: "cache", %key, "miss");
        self.state.send_modify(|s| {
            s.display = DisplayState {
                key: Some(key.clone()),
                item_id: Some(item.id.clone()),
                status: DisplayStatus::Loading,
                result: None,
            };
        });

        let this = Arc::clone(self);
        Some(tokio::spawn(async move {
            let result = this.rewrite_shared(&key, &item).await;
            this.complete(&item, result);
        }))
    }

    /// Rewrite through the registry and cache the outcome before the slot is released.
    async fn rewrite_shared(&self, key: &str, item: &SourceItem) -> RewriteResult {
        self.inflight
            .run(key, || async {
                let result = self.rewriter.rewrite(item.rewrite_text()).await;
                if result.is_unavailable() {
                    debug!(target: "cache", item = %item.id, "not caching unavailable rewrite");
                } else {
                    let window_now = self.state.borrow().window;
                    self.cache.put(&cache_key(window_now, &item.id), result.clone());
                }
                result
            })
            .await
    }

    /// Show a finished rewrite only if its item is still the selected one.
    fn complete(&self, item: &SourceItem, result: RewriteResult) {
        let shown = self.state.send_if_modified(|s| {
            let still_selected = s.selected_item().is_some_and(|i| i.id == item.id);
            if !still_selected || s.display.item_id.as_deref() != Some(item.id.as_str()) {
                return false;
            }
            s.display = DisplayState {
                key: Some(cache_key(s.window, &item.id)),
                item_id: Some(item.id.clone()),
                status: DisplayStatus::Ready,
                result: Some(result),
            };
            true
        });
        if !shown {
            debug!(item = %item.id, "rewrite finished for deselected item; cached only");
        }
    }
}
