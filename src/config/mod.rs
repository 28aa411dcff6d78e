// src/config/mod.rs
pub mod app;

pub use app::{
    AppConfig, CacheConfig, ForumConfig, NewsConfig, OpenAiConfig, RewriteMode,
    DEFAULT_CONFIG_PATH, ENV_CONFIG_PATH, MAX_RETRY_BASE_MS, MAX_TTL_SECS,
};
