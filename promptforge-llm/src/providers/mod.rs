//! LLM provider implementations
//!
//! Concrete implementations of [`CompletionProvider`](crate::CompletionProvider).

pub mod openai;

pub use openai::{OpenAIClient, OpenAICompletionProvider};

use promptforge_core::{ForgeError, LlmError};

pub(crate) fn request_failed(provider: &str, status: i32, message: impl Into<String>) -> ForgeError {
    LlmError::RequestFailed {
        provider: provider.to_string(),
        status,
        message: message.into(),
    }
    .into()
}

pub(crate) fn rate_limited(provider: &str, retry_after_ms: i64) -> ForgeError {
    LlmError::RateLimited {
        provider: provider.to_string(),
        retry_after_ms,
    }
    .into()
}

pub(crate) fn invalid_response(provider: &str, reason: impl Into<String>) -> ForgeError {
    LlmError::InvalidResponse {
        provider: provider.to_string(),
        reason: reason.into(),
    }
    .into()
}
