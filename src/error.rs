// src/error.rs
//! Error taxonomy for the source adapters.
//!
//! Nothing here ever reaches the presentation layer: the orchestrator absorbs
//! every `SourceError` into "no items available now".

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    /// Network/transport failure or a non-2xx response.
    #[error("fetch failed ({provider}): {reason}")]
    FetchFailed {
        provider: &'static str,
        reason: String,
    },

    /// Payload did not match the expected shape.
    #[error("decode failed ({provider}): {reason}")]
    DecodeFailed {
        provider: &'static str,
        reason: String,
    },
}

impl SourceError {
    pub fn fetch(provider: &'static str, reason: impl ToString) -> Self {
        Self::FetchFailed {
            provider,
            reason: reason.to_string(),
        }
    }

    pub fn decode(provider: &'static str, reason: impl ToString) -> Self {
        Self::DecodeFailed {
            provider,
            reason: reason.to_string(),
        }
    }

    pub fn provider(&self) -> &'static str {
        match self {
            Self::FetchFailed { provider, .. } | Self::DecodeFailed { provider, .. } => provider,
        }
    }
}

pub type SourceResult<T> = std::result::Result<T, SourceError>;
