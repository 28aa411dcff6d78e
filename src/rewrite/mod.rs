// src/rewrite/mod.rs
//! Rewrite pipeline: prompt construction, the generative-text call, and
//! section extraction. Every failure degrades to "Not Available." fields.

pub mod openai;
pub mod parser;
pub mod prompt;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::{AppConfig, RewriteMode};

pub use openai::OpenAiRewriter;
pub use parser::{extract_section, parse_reply, parse_reply_strict, Section};

/// Domain marker shown in place of content that could not be produced.
pub const UNAVAILABLE: &str = "Not Available.";

/// Four-part rewrite of one item. Each field fails independently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteResult {
    pub headline: Option<String>,
    pub neutral_summary: Option<String>,
    pub left_leaning_view: Option<String>,
    pub right_leaning_view: Option<String>,
}

impl RewriteResult {
    pub fn unavailable() -> Self {
        let na = || Some(UNAVAILABLE.to_string());
        Self {
            headline: na(),
            neutral_summary: na(),
            left_leaning_view: na(),
            right_leaning_view: na(),
        }
    }

    /// True when no field carries real content.
    pub fn is_unavailable(&self) -> bool {
        [
            &self.headline,
            &self.neutral_summary,
            &self.left_leaning_view,
            &self.right_leaning_view,
        ]
        .iter()
        .all(|f| !has_content(f))
    }

    /// AI headline, or `fallback` (the original title) when it is missing.
    pub fn display_headline<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self.headline.as_deref() {
            Some(h) if has_content(&self.headline) => h,
            _ => fallback,
        }
    }
}

fn has_content(f: &Option<String>) -> bool {
    matches!(f.as_deref(), Some(s) if s != UNAVAILABLE && !s.trim().is_empty())
}

/// Object-safe rewriter used by the orchestrator.
pub trait RewriteClient: Send + Sync {
    /// Never fails: transport or parse problems yield `RewriteResult::unavailable()`.
    fn rewrite<'a>(
        &'a self,
        item_text: &'a str,
    ) -> Pin<Box<dyn Future<Output = RewriteResult> + Send + 'a>>;
    fn provider_name(&self) -> &'static str;
}

pub type DynRewriter = Arc<dyn RewriteClient>;

/// Used when rewriting is switched off.
pub struct DisabledRewriter;

impl RewriteClient for DisabledRewriter {
    fn rewrite<'a>(
        &'a self,
        _item_text: &'a str,
    ) -> Pin<Box<dyn Future<Output = RewriteResult> + Send + 'a>> {
        Box::pin(async { RewriteResult::unavailable() })
    }
    fn provider_name(&self) -> &'static str {
        "disabled"
    }
}

/// Deterministic offline rewriter; its canned reply goes through the real parser.
#[derive(Clone, Default)]
pub struct MockRewriter;

impl MockRewriter {
    pub fn canned_reply(item_text: &str) -> String {
        let headline: Vec<&str> = item_text.split_whitespace().take(6).collect();
        let headline = if headline.is_empty() {
            "Untitled story".to_string()
        } else {
            headline.join(" ")
        };
        format!(
            "{} {headline}\n{} {item_text}\n{} Supporters welcome the move.\n{} Critics raise concerns.",
            Section::Headline.marker(),
            Section::NeutralSummary.marker(),
            Section::DemocraticView.marker(),
            Section::RepublicanView.marker(),
        )
    }
}

impl RewriteClient for MockRewriter {
    fn rewrite<'a>(
        &'a self,
        item_text: &'a str,
    ) -> Pin<Box<dyn Future<Output = RewriteResult> + Send + 'a>> {
        let reply = Self::canned_reply(item_text);
        Box::pin(async move { parse_reply(&reply) })
    }
    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Factory: build the rewriter selected by configuration.
pub fn build_rewriter(cfg: &AppConfig) -> DynRewriter {
    match cfg.rewrite_mode {
        RewriteMode::OpenAi => Arc::new(OpenAiRewriter::new(cfg.openai.clone())),
        RewriteMode::Mock => Arc::new(MockRewriter),
        RewriteMode::Disabled => Arc::new(DisabledRewriter),
    }
}
