// src/ingest/mod.rs
pub mod providers;
pub mod types;
pub mod window;

use crate::ingest::types::{SourceItem, SourceProvider};
use crate::ingest::window::TimeWindow;
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;

pub use types::SourceKind;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("source_items_total", "Items returned by source providers.");
        describe_counter!(
            "source_fetch_errors_total",
            "Provider fetch/decode failures (absorbed as empty results)."
        );
    });
}

/// Normalize feed text: decode entities, strip tags, collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    // Curly quotes to ASCII
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out.trim().to_string()
}

/// Normalize an optional field; empty after normalization becomes `None`.
pub fn normalize_opt(s: Option<&str>) -> Option<String> {
    s.map(normalize_text).filter(|t| !t.is_empty())
}

/// Query every provider in order and concatenate the results.
///
/// A failing provider contributes nothing; the failure is logged and counted.
pub async fn fetch_all(
    providers: &[Box<dyn SourceProvider>],
    window: TimeWindow,
) -> Vec<SourceItem> {
    ensure_metrics_described();

    let mut items = Vec::new();
    for p in providers {
        match p.fetch_latest(window).await {
            Ok(mut v) => {
                tracing::debug!(
                    target: "ingest",
                    provider = p.name(),
                    window = %window,
                    count = v.len(),
                    "provider fetched"
                );
                counter!("source_items_total").increment(v.len() as u64);
                items.append(&mut v);
            }
            Err(e) => {
                tracing::warn!(target: "ingest", error = %e, provider = p.name(), "provider error");
                counter!("source_fetch_errors_total").increment(1);
            }
        }
    }
    items
}
