// src/rewrite/parser.rs
//! Section extraction from a free-form model reply.
//!
//! A section's content runs from just after its marker to the nearest *other*
//! marker that follows, or to the end of the text. Pure and deterministic.

use super::{RewriteResult, UNAVAILABLE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Headline,
    NeutralSummary,
    DemocraticView,
    RepublicanView,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Headline,
        Section::NeutralSummary,
        Section::DemocraticView,
        Section::RepublicanView,
    ];

    /// Case-sensitive marker the model is instructed to emit.
    pub fn marker(self) -> &'static str {
        match self {
            Section::Headline => "**HEADLINE:**",
            Section::NeutralSummary => "**NEUTRAL SUMMARY:**",
            Section::DemocraticView => "**DEMOCRATIC VIEW:**",
            Section::RepublicanView => "**REPUBLICAN VIEW:**",
        }
    }
}

/// Extract one section. `None` when the marker is absent or the content is blank.
pub fn extract_section(text: &str, section: Section) -> Option<String> {
    let marker = section.marker();
    let start = text.find(marker)? + marker.len();
    let rest = &text[start..];

    let end = Section::ALL
        .iter()
        .filter(|s| **s != section)
        .filter_map(|s| rest.find(s.marker()))
        .min()
        .unwrap_or(rest.len());

    let content = rest[..end].trim();
    if content.is_empty() {
        tracing::debug!(target: "rewrite", marker, "section empty");
        None
    } else {
        Some(content.to_string())
    }
}

/// Strict parse: missing sections stay `None`.
pub fn parse_reply_strict(text: &str) -> RewriteResult {
    RewriteResult {
        headline: extract_section(text, Section::Headline),
        neutral_summary: extract_section(text, Section::NeutralSummary),
        left_leaning_view: extract_section(text, Section::DemocraticView),
        right_leaning_view: extract_section(text, Section::RepublicanView),
    }
}

/// Lenient parse: missing sections become the "Not Available." marker.
pub fn parse_reply(text: &str) -> RewriteResult {
    let strict = parse_reply_strict(text);
    let or_unavailable = |v: Option<String>| Some(v.unwrap_or_else(|| UNAVAILABLE.to_string()));
    RewriteResult {
        headline: or_unavailable(strict.headline),
        neutral_summary: or_unavailable(strict.neutral_summary),
        left_leaning_view: or_unavailable(strict.left_leaning_view),
        right_leaning_view: or_unavailable(strict.right_leaning_view),
    }
}
