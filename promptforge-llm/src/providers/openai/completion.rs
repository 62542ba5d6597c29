//! OpenAI completion provider implementation

use super::client::{OpenAIClient, PROVIDER};
use super::types::{ResponsesRequest, ResponsesResponse};
use crate::{CompletionProvider, LlmConfig};
use async_trait::async_trait;
use promptforge_core::{ForgeResult, LlmError};

/// Completion provider backed by the OpenAI Responses API.
pub struct OpenAICompletionProvider {
    client: OpenAIClient,
    model: String,
}

impl OpenAICompletionProvider {
    /// Create a new provider.
    ///
    /// # Arguments
    /// * `api_key` - OpenAI API key
    /// * `model` - Model name (e.g., "gpt-5.2")
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: OpenAIClient::new(api_key),
            model: model.into(),
        }
    }

    /// Build a provider from configuration; the API key is mandatory.
    pub fn from_config(config: &LlmConfig) -> ForgeResult<Self> {
        if config.api_key.as_deref().map(str::is_empty).unwrap_or(true) {
            tracing::error!(provider = PROVIDER, "OPENAI_API_KEY is not set");
            return Err(LlmError::ProviderNotConfigured.into());
        }
        Ok(Self {
            client: OpenAIClient::from_config(config)?,
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl CompletionProvider for OpenAICompletionProvider {
    async fn complete(&self, input: &str) -> ForgeResult<String> {
        let request = ResponsesRequest {
            model: self.model.clone(),
            input: input.to_string(),
        };

        let response: ResponsesResponse = self.client.request("responses", request).await?;

        let text = response.output_text();
        tracing::debug!(
            model = %self.model,
            response_id = ?response.id,
            output_chars = text.len(),
            "OpenAI response received"
        );
        Ok(text)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

impl std::fmt::Debug for OpenAICompletionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAICompletionProvider")
            .field("model", &self.model)
            .finish()
    }
}
