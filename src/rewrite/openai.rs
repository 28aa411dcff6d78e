// src/rewrite/openai.rs
//! Chat Completions rewriter. Requires `OPENAI_API_KEY` (an empty key still
//! issues the call and degrades on the resulting auth error).

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use metrics::counter;
use rand::Rng;
use serde::Deserialize;

use super::parser::parse_reply;
use super::prompt::build_request;
use super::{RewriteClient, RewriteResult};
use crate::config::OpenAiConfig;

#[derive(Deserialize)]
struct Resp {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMsg,
}

#[derive(Deserialize)]
struct ChoiceMsg {
    content: Option<String>,
}

/// Outcome of a single HTTP attempt.
enum Attempt {
    Reply(String),
    /// Transport error, 429 or 5xx: eligible for another try.
    Retryable(String),
    Fatal(String),
}

pub struct OpenAiRewriter {
    http: reqwest::Client,
    cfg: OpenAiConfig,
}

impl OpenAiRewriter {
    pub fn new(cfg: OpenAiConfig) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(concat!("purple-digest/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { http, cfg }
    }

    pub fn with_client(cfg: OpenAiConfig, http: reqwest::Client) -> Self {
        Self { http, cfg }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.cfg.base_url)
    }

    async fn attempt(&self, item_text: &str) -> Attempt {
        let req = build_request(
            &self.cfg.model,
            self.cfg.temperature,
            self.cfg.max_tokens,
            item_text,
        );

        let resp = match self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.cfg.api_key)
            .json(&req)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => return Attempt::Retryable(format!("transport: {e}")),
        };

        let status = resp.status();
        if status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Attempt::Retryable(format!("status {status}"));
        }
        if !status.is_success() {
            return Attempt::Fatal(format!("status {status}"));
        }

        let body: Resp = match resp.json().await {
            Ok(b) => b,
            Err(e) => return Attempt::Fatal(format!("malformed envelope: {e}")),
        };
        match body.choices.into_iter().next().and_then(|c| c.message.content) {
            Some(content) => Attempt::Reply(content),
            None => Attempt::Fatal("no choices[0].message.content".to_string()),
        }
    }

    /// Exponential backoff with random jitter in `[0, base)`.
    fn backoff(&self, retry: u8) -> Duration {
        let base = self.cfg.retry_base_ms.max(1);
        let exp = base.saturating_mul(1u64 << retry.min(10));
        let jitter = rand::rng().random_range(0..base);
        Duration::from_millis(exp.saturating_add(jitter))
    }

    async fn rewrite_impl(&self, item_text: &str) -> RewriteResult {
        counter!("rewrite_calls_total").increment(1);

        let mut retry: u8 = 0;
        loop {
            match self.attempt(item_text).await {
                Attempt::Reply(raw) => {
                    let raw = raw.trim();
                    tracing::debug!(target: "rewrite", chars = raw.len(), "raw model reply");
                    return parse_reply(raw);
                }
                Attempt::Retryable(reason) if retry < self.cfg.max_retries => {
                    let wait = self.backoff(retry);
                    retry += 1;
                    tracing::warn!(
                        target: "rewrite",
                        %reason,
                        retry,
                        wait_ms = wait.as_millis() as u64,
                        "rewrite attempt failed, retrying"
                    );
                    tokio::time::sleep(wait).await;
                }
                Attempt::Retryable(reason) | Attempt::Fatal(reason) => {
                    tracing::warn!(target: "rewrite", %reason, "rewrite unavailable");
                    counter!("rewrite_failures_total").increment(1);
                    return RewriteResult::unavailable();
                }
            }
        }
    }
}

impl RewriteClient for OpenAiRewriter {
    fn rewrite<'a>(
        &'a self,
        item_text: &'a str,
    ) -> Pin<Box<dyn Future<Output = RewriteResult> + Send + 'a>> {
        Box::pin(self.rewrite_impl(item_text))
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_grows_and_stays_within_jitter() {
        let cfg = OpenAiConfig {
            retry_base_ms: 100,
            ..OpenAiConfig::default()
        };
        let r = OpenAiRewriter::new(cfg);
        for retry in 0..3u8 {
            let d = r.backoff(retry).as_millis() as u64;
            let floor = 100 * (1u64 << retry);
            assert!(d >= floor && d < floor + 100, "retry {retry}: {d}ms");
        }
    }

    #[test]
    fn backoff_saturates_on_huge_base() {
        let cfg = OpenAiConfig {
            retry_base_ms: u64::MAX / 2,
            ..OpenAiConfig::default()
        };
        let r = OpenAiRewriter::new(cfg);
        assert_eq!(r.backoff(3), Duration::from_millis(u64::MAX));
    }

    #[tokio::test]
    async fn unreachable_endpoint_degrades() {
        let cfg = OpenAiConfig {
            // Port 9 (discard) on localhost: connection refused.
            base_url: "http://127.0.0.1:9".to_string(),
            ..OpenAiConfig::default()
        };
        let r = OpenAiRewriter::new(cfg).rewrite("Senate text").await;
        assert_eq!(r, RewriteResult::unavailable());
    }
}
