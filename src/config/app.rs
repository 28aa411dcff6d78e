// src/config/app.rs
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::ingest::window::TimeWindow;

pub const ENV_CONFIG_PATH: &str = "PURPLE_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/purple.toml";

/// Longest cache TTL accepted: 30 days.
pub const MAX_TTL_SECS: u64 = 30 * 24 * 3600;
/// Longest base backoff accepted between rewrite retries.
pub const MAX_RETRY_BASE_MS: u64 = 60_000;

/// Which rewriter the service runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewriteMode {
    #[default]
    OpenAi,
    Mock,
    Disabled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Extra attempts on transport/5xx failures. 0 = exactly one call.
    pub max_retries: u8,
    /// Base backoff before the first retry; doubles per attempt, plus jitter.
    pub retry_base_ms: u64,
    /// Always taken from `OPENAI_API_KEY`, never from the file.
    #[serde(skip)]
    pub api_key: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            model: "gpt-4-turbo".to_string(),
            temperature: 0.5,
            max_tokens: 2500,
            max_retries: 0,
            retry_base_ms: 500,
            api_key: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    pub enabled: bool,
    pub base_url: String,
    pub locale: String,
    pub limit: u32,
    pub categories: String,
    /// Always taken from `NEWS_API_KEY`.
    #[serde(skip)]
    pub api_key: String,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://api.thenewsapi.com".to_string(),
            locale: "us".to_string(),
            limit: 3,
            categories: "politics".to_string(),
            api_key: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForumConfig {
    pub enabled: bool,
    pub auth_base_url: String,
    pub api_base_url: String,
    pub client_id: String,
    pub subreddit: String,
    pub limit: u32,
    pub user_agent: String,
}

impl Default for ForumConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            auth_base_url: "https://www.reddit.com".to_string(),
            api_base_url: "https://oauth.reddit.com".to_string(),
            client_id: "94Rg_NF8QjGKBERA6lLdhg".to_string(),
            subreddit: "politics".to_string(),
            limit: 5,
            user_agent: "server:purple-digest:v0.1.0".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 3600 }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub rewrite_mode: RewriteMode,
    pub default_window: TimeWindow,
    pub openai: OpenAiConfig,
    pub news: NewsConfig,
    pub forum: ForumConfig,
    pub cache: CacheConfig,
}

impl AppConfig {
    /// Load using env var + fallback:
    /// 1) $PURPLE_CONFIG_PATH (must exist)
    /// 2) config/purple.toml (optional)
    /// 3) built-in defaults
    ///
    /// Env overrides and secrets are applied last.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = if let Ok(p) = env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                anyhow::bail!("{ENV_CONFIG_PATH} points to non-existent path");
            }
            Self::from_file(&pb)?
        } else {
            let default = Path::new(DEFAULT_CONFIG_PATH);
            if default.exists() {
                Self::from_file(default)?
            } else {
                Self::default()
            }
        };
        cfg.apply_env();
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let mut cfg: AppConfig =
            toml::from_str(&data).with_context(|| format!("parsing {}", path.display()))?;
        cfg.sanitize();
        Ok(cfg)
    }

    /// Secrets and test/deploy overrides. Missing secrets become empty strings.
    pub fn apply_env(&mut self) {
        self.openai.api_key = env::var("OPENAI_API_KEY").unwrap_or_default();
        self.news.api_key = env::var("NEWS_API_KEY").unwrap_or_default();

        if let Ok(mode) = env::var("REWRITE_TEST_MODE") {
            match mode.trim().to_ascii_lowercase().as_str() {
                "mock" => self.rewrite_mode = RewriteMode::Mock,
                "disabled" | "off" => self.rewrite_mode = RewriteMode::Disabled,
                _ => {}
            }
        }
        if let Some(ttl) = env::var("CACHE_TTL_SECS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
        {
            self.cache.ttl_secs = ttl;
        }
        if let Ok(url) = env::var("OPENAI_BASE_URL") {
            if !url.trim().is_empty() {
                self.openai.base_url = url.trim().to_string();
            }
        }
        self.sanitize();
    }

    fn sanitize(&mut self) {
        if !(0.0..=2.0).contains(&self.openai.temperature) {
            self.openai.temperature = OpenAiConfig::default().temperature;
        }
        if self.openai.max_tokens == 0 {
            self.openai.max_tokens = OpenAiConfig::default().max_tokens;
        }
        if self.cache.ttl_secs == 0 {
            self.cache.ttl_secs = CacheConfig::default().ttl_secs;
        }
        self.cache.ttl_secs = self.cache.ttl_secs.min(MAX_TTL_SECS);
        self.openai.retry_base_ms = self.openai.retry_base_ms.min(MAX_RETRY_BASE_MS);
        for url in [
            &mut self.openai.base_url,
            &mut self.news.base_url,
            &mut self.forum.auth_base_url,
            &mut self.forum.api_base_url,
        ] {
            while url.ends_with('/') {
                url.pop();
            }
        }
    }
}
