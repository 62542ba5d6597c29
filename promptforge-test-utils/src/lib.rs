//! PromptForge Test Utilities
//!
//! Shared test infrastructure for the workspace:
//! - In-memory implementation of the storage traits
//! - Proptest generators for model replies and template selections
//! - Fixtures for common scenarios
//! - Assertions for PromptForge error variants

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;

// Re-export the mock provider from its source crate
pub use promptforge_llm::MockCompletionProvider;

pub use promptforge_core::{
    ArtifactKind, ForgeError, ForgeResult, GenerationOutcome, LlmError, NewPrompt, PromptId,
    PromptRecord, PromptStore, PromptSummary, StorageError, Store, TemplateFragment,
    TemplateStore,
};

// ============================================================================
// IN-MEMORY STORE
// ============================================================================

#[derive(Debug, Default)]
struct Tables {
    /// Keyed by id; BTreeMap keeps insertion order for SERIAL ids.
    prompts: BTreeMap<PromptId, PromptRecord>,
    fragments: BTreeMap<String, String>,
    next_id: PromptId,
    /// When false every call fails with `ConnectionUnavailable`.
    unavailable: bool,
}

/// In-memory [`Store`] with the same ordering and id semantics as the
/// PostgreSQL tables. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with fragments.
    pub fn with_fragments<'a>(fragments: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let store = Self::new();
        {
            let mut tables = store.write();
            for (name, body) in fragments {
                tables.fragments.insert(name.to_string(), body.to_string());
            }
        }
        store
    }

    /// Make every subsequent call fail as if the database were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.write().unavailable = unavailable;
    }

    pub fn prompt_count(&self) -> usize {
        self.read().prompts.len()
    }

    /// Full record by id, bypassing the traits.
    pub fn get_prompt(&self, id: PromptId) -> Option<PromptRecord> {
        self.read().prompts.get(&id).cloned()
    }

    /// Overwrite a stored record, e.g. to plant an empty artifact.
    pub fn put_prompt(&self, record: PromptRecord) {
        let mut tables = self.write();
        tables.next_id = tables.next_id.max(record.id);
        tables.prompts.insert(record.id, record);
    }

    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(|err| err.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(|err| err.into_inner())
    }

    fn check_available(tables: &Tables) -> ForgeResult<()> {
        if tables.unavailable {
            return Err(StorageError::ConnectionUnavailable {
                reason: "in-memory store marked unavailable".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[async_trait]
impl PromptStore for InMemoryStore {
    async fn insert_prompt(&self, prompt: &NewPrompt) -> ForgeResult<PromptRecord> {
        let mut tables = self.write();
        Self::check_available(&tables)?;

        tables.next_id += 1;
        let record = PromptRecord {
            id: tables.next_id,
            prompt: prompt.prompt.clone(),
            exp_name: prompt.exp_name.clone(),
            architecture: prompt.architecture.clone(),
            description_type: prompt.description_type.clone(),
            response: None,
            cpp_code: None,
            uml_code: None,
            created_at: Utc::now(),
        };
        tables.prompts.insert(record.id, record.clone());
        Ok(record)
    }

    async fn record_outcome(&self, id: PromptId, outcome: &GenerationOutcome) -> ForgeResult<()> {
        let mut tables = self.write();
        Self::check_available(&tables)?;

        let record = tables
            .prompts
            .get_mut(&id)
            .ok_or(StorageError::PromptNotFound { id })?;
        record.response = Some(outcome.response().to_string());
        record.cpp_code = outcome.cpp_code().map(str::to_string);
        record.uml_code = outcome.uml_code().map(str::to_string);
        Ok(())
    }

    async fn list_prompts(&self) -> ForgeResult<Vec<PromptSummary>> {
        let tables = self.read();
        Self::check_available(&tables)?;
        Ok(tables
            .prompts
            .values()
            .rev()
            .map(PromptSummary::from_record)
            .collect())
    }

    async fn latest_prompt(&self) -> ForgeResult<Option<PromptRecord>> {
        let tables = self.read();
        Self::check_available(&tables)?;
        Ok(tables.prompts.values().next_back().cloned())
    }

    async fn get_artifact(&self, id: PromptId, kind: ArtifactKind) -> ForgeResult<Option<String>> {
        let tables = self.read();
        Self::check_available(&tables)?;
        Ok(tables
            .prompts
            .get(&id)
            .and_then(|record| kind.select(record))
            .map(str::to_string))
    }
}

#[async_trait]
impl TemplateStore for InMemoryStore {
    async fn list_fragments(&self) -> ForgeResult<Vec<TemplateFragment>> {
        let tables = self.read();
        Self::check_available(&tables)?;
        Ok(tables
            .fragments
            .iter()
            .map(|(name, body)| TemplateFragment {
                name: name.clone(),
                prompt_part: body.clone(),
            })
            .collect())
    }

    async fn get_fragments(&self, names: &[&str]) -> ForgeResult<Vec<TemplateFragment>> {
        let tables = self.read();
        Self::check_available(&tables)?;
        Ok(names
            .iter()
            .filter_map(|name| {
                tables.fragments.get(*name).map(|body| TemplateFragment {
                    name: name.to_string(),
                    prompt_part: body.clone(),
                })
            })
            .collect())
    }

    async fn upsert_fragment(
        &self,
        name: &str,
        prompt_part: &str,
    ) -> ForgeResult<TemplateFragment> {
        let mut tables = self.write();
        Self::check_available(&tables)?;
        tables
            .fragments
            .insert(name.to_string(), prompt_part.to_string());
        Ok(TemplateFragment {
            name: name.to_string(),
            prompt_part: prompt_part.to_string(),
        })
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn ping(&self) -> ForgeResult<()> {
        Self::check_available(&self.read())
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for PromptForge inputs.

    use promptforge_core::{Architecture, SpecKind};
    use proptest::prelude::*;

    pub fn arb_architecture() -> impl Strategy<Value = Architecture> {
        prop::sample::select(Architecture::ALL.to_vec())
    }

    pub fn arb_spec_kind() -> impl Strategy<Value = SpecKind> {
        prop::sample::select(SpecKind::ALL.to_vec())
    }

    /// Non-blank prompt text, already trimmed.
    pub fn arb_prompt() -> impl Strategy<Value = String> {
        "[A-Za-z0-9][A-Za-z0-9 ,.]{0,80}[A-Za-z0-9]"
    }

    /// Non-empty arbitrary text, including quotes, backslashes and newlines.
    pub fn arb_artifact_text() -> impl Strategy<Value = String> {
        "(?s).{1,120}"
    }

    /// A well-formed model reply carrying both artifacts.
    pub fn arb_valid_reply() -> impl Strategy<Value = (String, String, String)> {
        (arb_artifact_text(), arb_artifact_text()).prop_map(|(cpp, uml)| {
            let reply = serde_json::json!({ "cpp": cpp, "uml": uml }).to_string();
            (reply, cpp, uml)
        })
    }

    /// A valid reply, either bare or fenced, with the expected artifacts.
    pub fn arb_model_reply() -> impl Strategy<Value = (String, String, String)> {
        arb_valid_reply().prop_flat_map(|(reply, cpp, uml)| {
            prop_oneof![Just(reply.clone()), arb_fenced(reply)]
                .prop_map(move |raw| (raw, cpp.clone(), uml.clone()))
        })
    }

    /// Wrap a reply in a markdown fence with an optional language tag.
    pub fn arb_fenced(reply: String) -> impl Strategy<Value = String> {
        (
            prop::sample::select(vec!["", "json", "JSON", "Json"]),
            prop::sample::select(vec!["", "\n", " \n", "\n\n"]),
        )
            .prop_map(move |(tag, pad)| format!("```{}\n{}{}\n```", tag, reply, pad))
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Canned values for common scenarios.

    /// Reply used by the end-to-end scenario.
    pub const FOO_REPLY: &str = r#"{"cpp":"int main(){}","uml":"@startuml\n@enduml"}"#;
    pub const FOO_CPP: &str = "int main(){}";
    pub const FOO_UML: &str = "@startuml\n@enduml";

    /// Every fragment needed by every arch/spec pair.
    pub fn all_fragments() -> Vec<(&'static str, &'static str)> {
        vec![
            ("1_task_description", "You are designing a system."),
            ("2_srs", "Use the SRS below."),
            ("2_frnfr", "Use the FR/NFR list below."),
            ("3_3tier", "Target a three-tier architecture."),
            ("3_mvc", "Target an MVC architecture."),
            ("3_micro", "Target a microservices architecture."),
            ("4_finalInstructions", "Answer with code only."),
        ]
    }

    pub fn fenced(reply: &str) -> String {
        format!("```json\n{}\n```", reply)
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions for PromptForge error variants.

    use super::*;

    #[track_caller]
    pub fn assert_prompt_not_found<T: std::fmt::Debug>(result: &ForgeResult<T>, expected: PromptId) {
        match result {
            Err(ForgeError::Storage(StorageError::PromptNotFound { id })) => {
                assert_eq!(*id, expected, "Wrong id in PromptNotFound error");
            }
            other => panic!("Expected PromptNotFound({}), got: {:?}", expected, other),
        }
    }

    #[track_caller]
    pub fn assert_connection_unavailable<T: std::fmt::Debug>(result: &ForgeResult<T>) {
        match result {
            Err(ForgeError::Storage(StorageError::ConnectionUnavailable { .. })) => {}
            other => panic!("Expected ConnectionUnavailable, got: {:?}", other),
        }
    }

    /// Record artifacts are either both present or both absent.
    #[track_caller]
    pub fn assert_artifacts_paired(record: &PromptRecord) {
        assert_eq!(
            record.cpp_code.is_some(),
            record.uml_code.is_some(),
            "Artifacts of prompt {} are not paired: {:?}",
            record.id,
            record
        );
    }
}

#[cfg(test)]
mod tests {
    use super::assertions::*;
    use super::*;
    use promptforge_core::extract;

    fn new_prompt(text: &str) -> NewPrompt {
        NewPrompt {
            prompt: text.to_string(),
            exp_name: None,
            architecture: None,
            description_type: None,
        }
    }

    #[tokio::test]
    async fn test_ids_increase_and_list_is_newest_first() {
        let store = InMemoryStore::new();
        let a = store.insert_prompt(&new_prompt("a")).await.unwrap();
        let b = store.insert_prompt(&new_prompt("b")).await.unwrap();
        assert!(b.id > a.id);

        let list = store.list_prompts().await.unwrap();
        assert_eq!(list.iter().map(|p| p.id).collect::<Vec<_>>(), vec![b.id, a.id]);
        assert_eq!(store.latest_prompt().await.unwrap().unwrap().id, b.id);
    }

    #[tokio::test]
    async fn test_record_outcome_unknown_id() {
        let store = InMemoryStore::new();
        let result = store
            .record_outcome(99, &GenerationOutcome::raw_only("x"))
            .await;
        assert_prompt_not_found(&result, 99);
    }

    #[tokio::test]
    async fn test_record_outcome_keeps_artifacts_paired() {
        let store = InMemoryStore::new();
        let record = store.insert_prompt(&new_prompt("a")).await.unwrap();
        let reply = r#"{"cpp":"x"}"#;
        let outcome = GenerationOutcome::from_extraction(reply, &extract(reply));
        store.record_outcome(record.id, &outcome).await.unwrap();

        let stored = store.get_prompt(record.id).unwrap();
        assert_artifacts_paired(&stored);
        assert_eq!(stored.response.as_deref(), Some(reply));
    }

    #[tokio::test]
    async fn test_fragments_upsert_and_order() {
        let store = InMemoryStore::new();
        store.upsert_fragment("b", "1").await.unwrap();
        store.upsert_fragment("a", "2").await.unwrap();
        store.upsert_fragment("b", "3").await.unwrap();

        let names: Vec<_> = store
            .list_fragments()
            .await
            .unwrap()
            .into_iter()
            .map(|f| (f.name, f.prompt_part))
            .collect();
        assert_eq!(
            names,
            vec![("a".to_string(), "2".to_string()), ("b".to_string(), "3".to_string())]
        );

        let found = store.get_fragments(&["b", "zzz"]).await.unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn test_unavailable_store_fails() {
        let store = InMemoryStore::new();
        store.set_unavailable(true);
        assert_connection_unavailable(&store.ping().await);
        assert_connection_unavailable(&store.list_prompts().await);
        store.set_unavailable(false);
        assert!(store.ping().await.is_ok());
    }
}
