// src/ingest/providers/news_api.rs
use async_trait::async_trait;
use serde::Deserialize;

use crate::config::NewsConfig;
use crate::error::{SourceError, SourceResult};
use crate::ingest::types::{SourceItem, SourceKind, SourceProvider};
use crate::ingest::window::TimeWindow;
use crate::ingest::{normalize_opt, normalize_text};

const NAME: &str = "NewsFeed";

#[derive(Debug, Deserialize)]
struct NewsResponse {
    data: Vec<Story>,
    #[allow(dead_code)]
    #[serde(default)]
    warnings: Option<Vec<String>>,
    #[allow(dead_code)]
    #[serde(default)]
    meta: Option<Meta>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Meta {
    found: Option<u64>,
    returned: Option<u64>,
    limit: Option<u64>,
    page: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct Story {
    title: String,
    description: Option<String>,
    url: String,
    image_url: Option<String>,
}

/// Top political stories from the news feed. The time window does not apply.
pub struct NewsFeedProvider {
    cfg: NewsConfig,
    client: reqwest::Client,
}

impl NewsFeedProvider {
    pub fn new(cfg: NewsConfig) -> Self {
        Self {
            cfg,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_client(cfg: NewsConfig, client: reqwest::Client) -> Self {
        Self { cfg, client }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/news/top", self.cfg.base_url)
    }

    /// Decode a raw feed payload. Stories keep provider order; the URL is the id.
    pub fn parse_items_from_str(s: &str) -> SourceResult<Vec<SourceItem>> {
        let resp: NewsResponse =
            serde_json::from_str(s).map_err(|e| SourceError::decode(NAME, e))?;

        let out = resp
            .data
            .into_iter()
            .filter_map(|st| {
                let title = normalize_text(&st.title);
                if title.is_empty() || st.url.trim().is_empty() {
                    return None;
                }
                Some(SourceItem {
                    id: st.url.trim().to_string(),
                    title,
                    body: normalize_opt(st.description.as_deref()),
                    link: st.url.trim().to_string(),
                    thumbnail_url: st.image_url.filter(|u| !u.trim().is_empty()),
                    source_kind: SourceKind::NewsFeed,
                })
            })
            .collect();
        Ok(out)
    }
}

#[async_trait]
impl SourceProvider for NewsFeedProvider {
    async fn fetch_latest(&self, _window: TimeWindow) -> SourceResult<Vec<SourceItem>> {
        let limit = self.cfg.limit.to_string();
        let resp = self
            .client
            .get(self.endpoint())
            .query(&[
                ("api_token", self.cfg.api_key.as_str()),
                ("locale", self.cfg.locale.as_str()),
                ("limit", limit.as_str()),
                ("categories", self.cfg.categories.as_str()),
            ])
            .send()
            .await
            .map_err(|e| SourceError::fetch(NAME, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::fetch(NAME, format!("status {status}")));
        }
        let body = resp.text().await.map_err(|e| SourceError::fetch(NAME, e))?;
        Self::parse_items_from_str(&body)
    }

    fn name(&self) -> &'static str {
        NAME
    }

    fn kind(&self) -> SourceKind {
        SourceKind::NewsFeed
    }
}
