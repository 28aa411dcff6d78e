// tests/common/mod.rs
//
// Shared helpers: in-process fake upstreams and stub services.

#![allow(dead_code)]

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use purple_digest::error::SourceResult;
use purple_digest::rewrite::{parse_reply, RewriteClient, RewriteResult};
use purple_digest::{SourceItem, SourceKind, SourceProvider, TimeWindow};

/// Serve `router` on an ephemeral localhost port and return its base URL.
pub async fn spawn_upstream(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("fake upstream");
    });
    format!("http://{addr}")
}

pub fn item(id: &str, title: &str, body: Option<&str>) -> SourceItem {
    SourceItem {
        id: id.to_string(),
        title: title.to_string(),
        body: body.map(str::to_string),
        link: format!("https://news.example/{id}"),
        thumbnail_url: None,
        source_kind: SourceKind::Forum,
    }
}

/// Provider returning a fixed list per window (ids are prefixed by the window code).
pub struct WindowedProvider {
    pub per_window: usize,
}

#[async_trait::async_trait]
impl SourceProvider for WindowedProvider {
    async fn fetch_latest(&self, window: TimeWindow) -> SourceResult<Vec<SourceItem>> {
        Ok((0..self.per_window)
            .map(|i| {
                let id = format!("{}-{i}", window.forum_param());
                item(&id, &format!("Original title {id}"), Some(&format!("Body of {id}")))
            })
            .collect())
    }
    fn name(&self) -> &'static str {
        "windowed"
    }
    fn kind(&self) -> SourceKind {
        SourceKind::Forum
    }
}

/// Provider with the same items for every window.
pub struct StaticProvider(pub Vec<SourceItem>);

#[async_trait::async_trait]
impl SourceProvider for StaticProvider {
    async fn fetch_latest(&self, _window: TimeWindow) -> SourceResult<Vec<SourceItem>> {
        Ok(self.0.clone())
    }
    fn name(&self) -> &'static str {
        "static"
    }
    fn kind(&self) -> SourceKind {
        SourceKind::NewsFeed
    }
}

/// Rewriter that counts calls and can be slowed down to widen race windows.
pub struct CountingRewriter {
    pub calls: Arc<AtomicUsize>,
    pub delay: Duration,
    pub fail: bool,
}

impl CountingRewriter {
    pub fn new(delay: Duration) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            delay,
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Duration::ZERO)
        }
    }

    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RewriteClient for CountingRewriter {
    fn rewrite<'a>(
        &'a self,
        item_text: &'a str,
    ) -> Pin<Box<dyn Future<Output = RewriteResult> + Send + 'a>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if self.fail {
                return RewriteResult::unavailable();
            }
            parse_reply(&format!(
                "**HEADLINE:** AI {item_text}\n**NEUTRAL SUMMARY:** Neutral {item_text}\n**DEMOCRATIC VIEW:** Left {item_text}\n**REPUBLICAN VIEW:** Right {item_text}"
            ))
        })
    }

    fn provider_name(&self) -> &'static str {
        "counting"
    }
}
