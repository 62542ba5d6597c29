//! Storage traits
//!
//! The HTTP layer talks to persistence only through these traits. The
//! PostgreSQL client in `promptforge-api` implements them for production;
//! `promptforge-test-utils` provides an in-memory implementation.

use async_trait::async_trait;

use crate::error::ForgeResult;
use crate::types::{
    ArtifactKind, GenerationOutcome, NewPrompt, PromptId, PromptRecord, PromptSummary,
    TemplateFragment,
};

/// Append-only log of prompts and their generation results.
#[async_trait]
pub trait PromptStore: Send + Sync {
    /// Insert a prompt with empty response and artifacts.
    async fn insert_prompt(&self, prompt: &NewPrompt) -> ForgeResult<PromptRecord>;

    /// Write the model reply and artifacts onto an existing prompt.
    async fn record_outcome(&self, id: PromptId, outcome: &GenerationOutcome) -> ForgeResult<()>;

    /// History rows, newest first.
    async fn list_prompts(&self) -> ForgeResult<Vec<PromptSummary>>;

    /// The most recently inserted prompt, if any.
    async fn latest_prompt(&self) -> ForgeResult<Option<PromptRecord>>;

    /// Stored text of one artifact, `None` if the prompt or artifact is missing.
    async fn get_artifact(&self, id: PromptId, kind: ArtifactKind) -> ForgeResult<Option<String>>;
}

/// Key/value table of editable prompt fragments.
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// All fragments ordered by name.
    async fn list_fragments(&self) -> ForgeResult<Vec<TemplateFragment>>;

    /// Fragments among `names` that exist; unknown names are skipped.
    async fn get_fragments(&self, names: &[&str]) -> ForgeResult<Vec<TemplateFragment>>;

    /// Insert or replace a fragment body.
    async fn upsert_fragment(&self, name: &str, prompt_part: &str)
        -> ForgeResult<TemplateFragment>;
}

/// Everything the API needs from a backing store.
#[async_trait]
pub trait Store: PromptStore + TemplateStore {
    /// Cheap connectivity probe used by readiness checks.
    async fn ping(&self) -> ForgeResult<()>;
}
