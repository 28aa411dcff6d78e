// src/rewrite/prompt.rs
use serde::Serialize;

use super::parser::Section;

/// Fixed instruction describing the four-part output format.
pub fn system_instruction() -> String {
    format!(
        "You are a professional news summarizer. Given a news article, produce four sections:\n\
         1. {h} Short and engaging, max 6 words.\n\
         2. {n} 3-6 paragraphs, neutral tone.\n\
         3. {d} 2-4 paragraphs.\n\
         4. {r} 2-4 paragraphs.\n\
         \n\
         Respond only in this format, no extra text:\n\
         \n\
         {h} [Your short headline]\n\
         {n} [Your neutral summary]\n\
         {d} [Your democratic view]\n\
         {r} [Your republican view]",
        h = Section::Headline.marker(),
        n = Section::NeutralSummary.marker(),
        d = Section::DemocraticView.marker(),
        r = Section::RepublicanView.marker(),
    )
}

/// User message; the item text is embedded verbatim (empty is forwarded as-is).
pub fn user_message(item_text: &str) -> String {
    format!("Here is the news article: {item_text}")
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

pub fn build_request<'a>(
    model: &'a str,
    temperature: f32,
    max_tokens: u32,
    item_text: &str,
) -> ChatRequest<'a> {
    ChatRequest {
        model,
        messages: vec![
            ChatMessage {
                role: "system",
                content: system_instruction(),
            },
            ChatMessage {
                role: "user",
                content: user_message(item_text),
            },
        ],
        temperature,
        max_tokens,
    }
}
