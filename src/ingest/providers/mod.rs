// src/ingest/providers/mod.rs
pub mod news_api;
pub mod reddit;

use crate::config::AppConfig;
use crate::ingest::types::SourceProvider;

pub use news_api::NewsFeedProvider;
pub use reddit::RedditProvider;

/// Build the enabled providers in display order: news feed first, then forum.
pub fn build_providers(cfg: &AppConfig) -> Vec<Box<dyn SourceProvider>> {
    let mut out: Vec<Box<dyn SourceProvider>> = Vec::new();
    if cfg.news.enabled {
        out.push(Box::new(NewsFeedProvider::new(cfg.news.clone())));
    }
    if cfg.forum.enabled {
        out.push(Box::new(RedditProvider::new(cfg.forum.clone())));
    }
    out
}
