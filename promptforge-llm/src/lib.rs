//! PromptForge LLM
//!
//! Provider-agnostic completion trait, the JSON instruction wrapper sent in
//! front of every user prompt, and the concrete OpenAI provider.

pub mod providers;

use async_trait::async_trait;
use promptforge_core::{ForgeResult, LlmError};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub use providers::{OpenAIClient, OpenAICompletionProvider};

/// Default public endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Model used when `OPENAI_MODEL` is unset.
pub const DEFAULT_MODEL: &str = "gpt-5.2";

// ============================================================================
// COMPLETION PROVIDER TRAIT
// ============================================================================

/// Trait for text completion providers.
/// Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Send `input` to the model and return its raw text output.
    ///
    /// # Returns
    /// * `Ok(String)` - The model output, possibly empty
    /// * `Err(ForgeError::Llm)` - If the call failed
    async fn complete(&self, input: &str) -> ForgeResult<String>;

    /// Get the model identifier for this provider.
    fn model_id(&self) -> &str;
}

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Model provider configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    /// Whole-request timeout; `None` keeps the transport default.
    pub timeout: Option<Duration>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }
}

impl LlmConfig {
    /// Load from environment variables.
    ///
    /// - `OPENAI_API_KEY`: API key (required by the OpenAI provider)
    /// - `OPENAI_MODEL`: model name (default: gpt-5.2)
    /// - `OPENAI_BASE_URL`: API base URL (default: https://api.openai.com/v1)
    /// - `PROMPTFORGE_LLM_TIMEOUT_SECS`: request timeout in seconds (default: none)
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()),
            model: std::env::var("OPENAI_MODEL")
                .ok()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            timeout: std::env::var("PROMPTFORGE_LLM_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
        }
    }
}

// ============================================================================
// PROMPT WRAPPING
// ============================================================================

/// Wrap a user prompt in the instructions that demand a `{cpp, uml}` JSON reply.
pub fn wrap_prompt_for_json(prompt: &str) -> String {
    [
        "You must respond with ONLY valid JSON.",
        r#"Schema: {"cpp": string, "uml": string}"#,
        "No markdown. No explanations. No extra keys.",
        "The value of cpp must be valid C++ source code as a string.",
        "The value of uml must be valid PlantUML as a string.",
        "",
        "User request:",
        prompt,
    ]
    .join("\n")
}

// ============================================================================
// MOCK PROVIDER (for testing)
// ============================================================================

/// Mock completion provider for testing.
/// Replies with a fixed text (or fails) and records every input it receives.
#[derive(Debug, Clone)]
pub struct MockCompletionProvider {
    model_id: String,
    reply: Result<String, LlmError>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockCompletionProvider {
    /// Provider that always answers with `reply`.
    pub fn with_reply(reply: impl Into<String>) -> Self {
        Self {
            model_id: "mock-model".to_string(),
            reply: Ok(reply.into()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Provider whose every call fails with `error`.
    pub fn failing(error: LlmError) -> Self {
        Self {
            model_id: "mock-model".to_string(),
            reply: Err(error),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    /// Inputs received so far, oldest first.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .clone()
    }
}

#[async_trait]
impl CompletionProvider for MockCompletionProvider {
    async fn complete(&self, input: &str) -> ForgeResult<String> {
        self.calls
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .push(input.to_string());
        self.reply.clone().map_err(Into::into)
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// ============================================================================
// UNIT TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use promptforge_core::ForgeError;

    #[test]
    fn test_wrap_prompt_layout() {
        let wrapped = wrap_prompt_for_json("Design a parking lot");
        let lines: Vec<&str> = wrapped.lines().collect();
        assert_eq!(lines[0], "You must respond with ONLY valid JSON.");
        assert_eq!(lines[1], r#"Schema: {"cpp": string, "uml": string}"#);
        assert_eq!(lines[5], "");
        assert_eq!(lines[6], "User request:");
        assert_eq!(lines[7], "Design a parking lot");
        assert!(wrapped.ends_with("\nDesign a parking lot"));
    }

    #[test]
    fn test_wrap_prompt_keeps_multiline_prompt_verbatim() {
        let prompt = "line one\n\nline three";
        assert!(wrap_prompt_for_json(prompt).ends_with("User request:\nline one\n\nline three"));
    }

    #[test]
    fn test_default_config() {
        let config = LlmConfig::default();
        assert_eq!(config.model, "gpt-5.2");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.api_key.is_none());
        assert!(config.timeout.is_none());
    }

    #[tokio::test]
    async fn test_mock_provider_records_calls() {
        let provider = MockCompletionProvider::with_reply("{}").with_model_id("m1");
        assert_eq!(provider.complete("a").await.unwrap(), "{}");
        assert_eq!(provider.complete("b").await.unwrap(), "{}");
        assert_eq!(provider.calls(), vec!["a", "b"]);
        assert_eq!(provider.model_id(), "m1");
    }

    #[tokio::test]
    async fn test_mock_provider_failure() {
        let provider = MockCompletionProvider::failing(LlmError::ProviderNotConfigured);
        let err = provider.complete("a").await.unwrap_err();
        assert!(matches!(err, ForgeError::Llm(LlmError::ProviderNotConfigured)));
        assert_eq!(provider.calls().len(), 1);
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// The user prompt always ends the wrapped input unchanged.
        #[test]
        fn prop_wrapped_prompt_ends_with_user_request(prompt in ".{0,200}") {
            let wrapped = wrap_prompt_for_json(&prompt);
            let expected_suffix = format!("User request:\n{}", prompt);
            prop_assert!(wrapped.ends_with(&expected_suffix));
        }
    }
}
