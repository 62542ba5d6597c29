//! Generation orchestration
//!
//! store prompt -> call model once -> extract -> store reply -> respond.
//! Every step that succeeded stays persisted; nothing is rolled back.

use std::time::Instant;

use promptforge_core::{extract, has_content, ForgeResult, GenerationOutcome, NewPrompt, Store};
use promptforge_llm::{wrap_prompt_for_json, CompletionProvider};

use crate::error::{ApiError, ApiResult};
use crate::telemetry::metrics::with_metrics;
use crate::types::GenerateResponse;

/// Outcome label recorded for every generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStatus {
    Success,
    InvalidOutput,
    UpstreamError,
}

impl GenerationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationStatus::Success => "success",
            GenerationStatus::InvalidOutput => "invalid_output",
            GenerationStatus::UpstreamError => "upstream_error",
        }
    }
}

fn record_status(status: GenerationStatus) {
    with_metrics(|m| m.record_generation(status.as_str()));
}

/// Single-attempt model invocation.
///
/// Wraps `prompt` in the JSON instructions and performs exactly one
/// provider call. A retry policy belongs here and nowhere else.
pub async fn call_model(provider: &dyn CompletionProvider, prompt: &str) -> ForgeResult<String> {
    let input = wrap_prompt_for_json(prompt);
    let start = Instant::now();
    let result = provider.complete(&input).await;
    let elapsed = start.elapsed();

    with_metrics(|m| m.record_model_call(provider.model_id(), result.is_ok(), elapsed.as_secs_f64()));
    match &result {
        Ok(text) => tracing::debug!(
            model = provider.model_id(),
            output_chars = text.chars().count(),
            duration_ms = elapsed.as_millis() as u64,
            "Model call succeeded"
        ),
        Err(e) => tracing::warn!(
            model = provider.model_id(),
            error = %e,
            duration_ms = elapsed.as_millis() as u64,
            "Model call failed"
        ),
    }
    result
}

/// Run one generation for an already validated prompt.
pub async fn run_generation(
    store: &dyn Store,
    provider: &dyn CompletionProvider,
    request: NewPrompt,
) -> ApiResult<GenerateResponse> {
    let record = store.insert_prompt(&request).await?;
    let model = provider.model_id().to_string();
    tracing::info!(id = record.id, model = %model, "Prompt stored");

    let raw = match call_model(provider, &record.prompt).await {
        Ok(raw) => raw,
        Err(e) => {
            record_status(GenerationStatus::UpstreamError);
            return Err(ApiError::upstream_model_failed(record.id, &model, e.to_string()));
        }
    };

    let extraction = extract(&raw);
    let outcome = GenerationOutcome::from_extraction(raw.as_str(), &extraction);
    store.record_outcome(record.id, &outcome).await?;

    if !extraction.has_artifacts() {
        let cpp_found = has_content(extraction.cpp.as_str());
        let uml_found = has_content(extraction.uml.as_str());
        record_status(GenerationStatus::InvalidOutput);
        tracing::warn!(
            id = record.id,
            cpp_found,
            uml_found,
            "Model output did not contain both artifacts"
        );
        return Err(ApiError::invalid_llm_output(
            record.id, &model, &raw, cpp_found, uml_found,
        ));
    }

    record_status(GenerationStatus::Success);
    Ok(GenerateResponse {
        id: record.id,
        model,
        cpp: extraction.cpp.into_option().unwrap_or_default(),
        uml: extraction.uml.into_option().unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use promptforge_core::{LlmError, PromptStore};
    use promptforge_llm::MockCompletionProvider;
    use promptforge_test_utils::InMemoryStore;

    fn new_prompt(text: &str) -> NewPrompt {
        NewPrompt {
            prompt: text.to_string(),
            exp_name: None,
            architecture: None,
            description_type: None,
        }
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(GenerationStatus::Success.as_str(), "success");
        assert_eq!(GenerationStatus::InvalidOutput.as_str(), "invalid_output");
        assert_eq!(GenerationStatus::UpstreamError.as_str(), "upstream_error");
    }

    #[tokio::test]
    async fn test_call_model_wraps_prompt_once() {
        let provider = MockCompletionProvider::with_reply("{}");
        let reply = call_model(&provider, "Design a kiosk").await.unwrap();
        assert_eq!(reply, "{}");

        let calls = provider.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].starts_with("You must respond with ONLY valid JSON."));
        assert!(calls[0].ends_with("User request:\nDesign a kiosk"));
    }

    #[tokio::test]
    async fn test_run_generation_success_persists_artifacts() {
        let store = InMemoryStore::new();
        let provider =
            MockCompletionProvider::with_reply(r#"{"cpp":"int main(){}","uml":"@startuml\n@enduml"}"#);

        let response = run_generation(&store, &provider, new_prompt("foo")).await.unwrap();
        assert_eq!(response.cpp, "int main(){}");
        assert_eq!(response.uml, "@startuml\n@enduml");

        let stored = store.latest_prompt().await.unwrap().unwrap();
        assert_eq!(stored.id, response.id);
        assert_eq!(stored.cpp_code.as_deref(), Some("int main(){}"));
        assert_eq!(stored.uml_code.as_deref(), Some("@startuml\n@enduml"));
    }

    #[tokio::test]
    async fn test_run_generation_partial_output_stores_raw_only() {
        let store = InMemoryStore::new();
        let provider = MockCompletionProvider::with_reply(r#"{"cpp":"int x;"}"#);

        let err = run_generation(&store, &provider, new_prompt("foo")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidLlmOutput);
        let details = err.details.unwrap();
        assert_eq!(details["parsed"]["cpp_found"], true);
        assert_eq!(details["parsed"]["uml_found"], false);

        let stored = store.latest_prompt().await.unwrap().unwrap();
        assert_eq!(stored.response.as_deref(), Some(r#"{"cpp":"int x;"}"#));
        assert!(stored.cpp_code.is_none());
        assert!(stored.uml_code.is_none());
    }

    #[tokio::test]
    async fn test_run_generation_upstream_failure_keeps_prompt() {
        let store = InMemoryStore::new();
        let provider = MockCompletionProvider::failing(LlmError::RequestFailed {
            provider: "openai".to_string(),
            status: 500,
            message: "boom".to_string(),
        });

        let err = run_generation(&store, &provider, new_prompt("foo")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::UpstreamModelFailed);

        let stored = store.latest_prompt().await.unwrap().unwrap();
        assert_eq!(stored.prompt, "foo");
        assert!(stored.response.is_none());
        assert_eq!(err.details.unwrap()["id"], stored.id);
    }
}
