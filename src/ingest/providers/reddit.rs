// src/ingest/providers/reddit.rs
//! Forum adapter: installed-client OAuth exchange, then the subreddit top listing.
//!
//! Every fetch re-authenticates; tokens are not kept between calls.

use async_trait::async_trait;
use serde::Deserialize;
use uuid::Uuid;

use crate::config::ForumConfig;
use crate::error::{SourceError, SourceResult};
use crate::ingest::normalize_text;
use crate::ingest::types::{SourceItem, SourceKind, SourceProvider};
use crate::ingest::window::TimeWindow;

const NAME: &str = "Reddit";
const GRANT_TYPE: &str = "https://oauth.reddit.com/grants/installed_client";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: Post,
}

#[derive(Debug, Deserialize)]
struct Post {
    id: String,
    title: String,
    url: String,
    thumbnail: Option<String>,
}

pub struct RedditProvider {
    cfg: ForumConfig,
    client: reqwest::Client,
}

impl RedditProvider {
    pub fn new(cfg: ForumConfig) -> Self {
        Self {
            cfg,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_client(cfg: ForumConfig, client: reqwest::Client) -> Self {
        Self { cfg, client }
    }

    /// Client-credentials exchange with an empty secret and a fresh device id.
    pub async fn access_token(&self) -> SourceResult<String> {
        let device_id = Uuid::new_v4().to_string();
        let url = format!("{}/api/v1/access_token", self.cfg.auth_base_url);

        let resp = self
            .client
            .post(&url)
            .header(reqwest::header::USER_AGENT, &self.cfg.user_agent)
            .basic_auth(&self.cfg.client_id, Some(""))
            .form(&[("grant_type", GRANT_TYPE), ("device_id", device_id.as_str())])
            .send()
            .await
            .map_err(|e| SourceError::fetch(NAME, e))?;

        let status = resp.status();
        tracing::debug!(target: "ingest", provider = NAME, %status, "token exchange");
        if !status.is_success() {
            return Err(SourceError::fetch(NAME, format!("token status {status}")));
        }

        let body: TokenResponse = resp
            .json()
            .await
            .map_err(|e| SourceError::decode(NAME, e))?;
        if let Some(err) = body.error {
            return Err(SourceError::fetch(NAME, format!("token error: {err}")));
        }
        body.access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| SourceError::fetch(NAME, "token response without access_token"))
    }

    /// Decode a raw listing payload.
    pub fn parse_items_from_str(s: &str) -> SourceResult<Vec<SourceItem>> {
        let listing: Listing = serde_json::from_str(s).map_err(|e| SourceError::decode(NAME, e))?;

        let out = listing
            .data
            .children
            .into_iter()
            .filter_map(|c| {
                let p = c.data;
                let title = normalize_text(&p.title);
                if p.id.is_empty() || title.is_empty() {
                    return None;
                }
                Some(SourceItem {
                    id: p.id,
                    title,
                    body: None,
                    link: p.url,
                    thumbnail_url: p.thumbnail.filter(|t| is_http_url(t)),
                    source_kind: SourceKind::Forum,
                })
            })
            .collect();
        Ok(out)
    }
}

/// Listing thumbnails carry sentinels such as "self", "default" or "nsfw".
fn is_http_url(s: &str) -> bool {
    s.starts_with("https://") || s.starts_with("http://")
}

#[async_trait]
impl SourceProvider for RedditProvider {
    async fn fetch_latest(&self, window: TimeWindow) -> SourceResult<Vec<SourceItem>> {
        let token = self.access_token().await?;

        let url = format!(
            "{}/r/{}/top.json",
            self.cfg.api_base_url, self.cfg.subreddit
        );
        let limit = self.cfg.limit.to_string();
        let resp = self
            .client
            .get(&url)
            .header(reqwest::header::AUTHORIZATION, format!("bearer {token}"))
            .header(reqwest::header::USER_AGENT, &self.cfg.user_agent)
            .query(&[("limit", limit.as_str()), ("t", window.forum_param())])
            .send()
            .await
            .map_err(|e| SourceError::fetch(NAME, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::fetch(NAME, format!("listing status {status}")));
        }
        let body = resp.text().await.map_err(|e| SourceError::fetch(NAME, e))?;
        Self::parse_items_from_str(&body)
    }

    fn name(&self) -> &'static str {
        NAME
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Forum
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_listing_and_filters_thumbnail_sentinels() {
        let raw = r#"{"kind": "Listing", "data": {"children": [
            {"kind": "t3", "data": {"id": "1abc", "title": "Court rules on &amp; maps", "url": "https://news.example/x", "thumbnail": "https://b.thumbs.example/x.jpg"}},
            {"kind": "t3", "data": {"id": "2def", "title": "Discussion thread", "url": "https://www.reddit.com/r/politics/2def", "thumbnail": "self"}},
            {"kind": "t3", "data": {"id": "3ghi", "title": "No thumb", "url": "https://news.example/z"}}
        ]}}"#;

        let items = RedditProvider::parse_items_from_str(raw).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].id, "1abc");
        assert_eq!(items[0].title, "Court rules on & maps");
        assert_eq!(
            items[0].thumbnail_url.as_deref(),
            Some("https://b.thumbs.example/x.jpg")
        );
        assert_eq!(items[1].thumbnail_url, None);
        assert_eq!(items[2].thumbnail_url, None);
        assert!(items.iter().all(|i| i.source_kind == SourceKind::Forum));
        assert!(items.iter().all(|i| i.body.is_none()));
    }

    #[test]
    fn missing_nested_data_is_decode_failed() {
        let err = RedditProvider::parse_items_from_str(r#"{"data": {}}"#).unwrap_err();
        assert!(matches!(err, SourceError::DecodeFailed { .. }));
    }
}
