//! Entity types for prompts and template fragments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::extract::Extraction;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Database identifier of a prompt row (SERIAL).
pub type PromptId = i32;

// ============================================================================
// PROMPT RECORDS
// ============================================================================

/// A submitted prompt together with the model reply and derived artifacts.
///
/// `cpp_code` and `uml_code` are either both set or both empty; the raw
/// `response` may be present on its own when extraction failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PromptRecord {
    pub id: PromptId,
    pub prompt: String,
    pub exp_name: Option<String>,
    pub architecture: Option<String>,
    pub description_type: Option<String>,
    pub response: Option<String>,
    pub cpp_code: Option<String>,
    pub uml_code: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
}

/// History row: everything but the payloads, plus presence flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PromptSummary {
    pub id: PromptId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    pub exp_name: Option<String>,
    pub architecture: Option<String>,
    pub description_type: Option<String>,
    pub prompt: String,
    pub has_cpp: bool,
    pub has_uml: bool,
}

impl PromptSummary {
    /// Project a full record into a history row.
    pub fn from_record(record: &PromptRecord) -> Self {
        Self {
            id: record.id,
            created_at: record.created_at,
            exp_name: record.exp_name.clone(),
            architecture: record.architecture.clone(),
            description_type: record.description_type.clone(),
            prompt: record.prompt.clone(),
            has_cpp: has_content(record.cpp_code.as_deref()),
            has_uml: has_content(record.uml_code.as_deref()),
        }
    }
}

/// An artifact counts as present only when it is non-null and non-empty.
pub fn has_content(value: Option<&str>) -> bool {
    value.map(|v| !v.is_empty()).unwrap_or(false)
}

/// Insert payload for a new prompt row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPrompt {
    pub prompt: String,
    pub exp_name: Option<String>,
    pub architecture: Option<String>,
    pub description_type: Option<String>,
}

/// Values written back to a prompt row once the model call returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOutcome {
    response: String,
    artifacts: Option<(String, String)>,
}

impl GenerationOutcome {
    /// Build the outcome for a raw reply and its extraction result.
    ///
    /// Artifacts are kept only when both came back with text; a
    /// half-recovered or empty reply stores the raw text alone.
    pub fn from_extraction(response: impl Into<String>, extraction: &Extraction) -> Self {
        let artifacts = match (extraction.cpp.as_str(), extraction.uml.as_str()) {
            (Some(cpp), Some(uml)) if extraction.has_artifacts() => {
                Some((cpp.to_string(), uml.to_string()))
            }
            _ => None,
        };
        Self {
            response: response.into(),
            artifacts,
        }
    }

    /// Outcome for a reply that yielded no artifacts.
    pub fn raw_only(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            artifacts: None,
        }
    }

    pub fn response(&self) -> &str {
        &self.response
    }

    pub fn cpp_code(&self) -> Option<&str> {
        self.artifacts.as_ref().map(|(cpp, _)| cpp.as_str())
    }

    pub fn uml_code(&self) -> Option<&str> {
        self.artifacts.as_ref().map(|(_, uml)| uml.as_str())
    }
}

// ============================================================================
// ARTIFACTS
// ============================================================================

/// The two payloads a generation produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// C++ source code
    Cpp,
    /// PlantUML diagram
    Uml,
}

impl ArtifactKind {
    /// Key of this artifact in the model's JSON reply.
    pub fn field_name(&self) -> &'static str {
        match self {
            ArtifactKind::Cpp => "cpp",
            ArtifactKind::Uml => "uml",
        }
    }

    /// Database column holding this artifact.
    pub fn column(&self) -> &'static str {
        match self {
            ArtifactKind::Cpp => "cpp_code",
            ArtifactKind::Uml => "uml_code",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ArtifactKind::Cpp => "text/x-c++src; charset=utf-8",
            ArtifactKind::Uml => "text/plain; charset=utf-8",
        }
    }

    /// Suggested download file name.
    pub fn file_name(&self, id: PromptId) -> String {
        match self {
            ArtifactKind::Cpp => format!("generated_{}.cpp", id),
            ArtifactKind::Uml => format!("diagram_{}.puml", id),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ArtifactKind::Cpp => "CPP",
            ArtifactKind::Uml => "UML",
        }
    }

    /// Pick this artifact out of a record.
    pub fn select<'a>(&self, record: &'a PromptRecord) -> Option<&'a str> {
        match self {
            ArtifactKind::Cpp => record.cpp_code.as_deref(),
            ArtifactKind::Uml => record.uml_code.as_deref(),
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.field_name())
    }
}

// ============================================================================
// TEMPLATE FRAGMENTS
// ============================================================================

/// Named block of prompt text, editable on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TemplateFragment {
    pub name: String,
    pub prompt_part: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract;
    use chrono::Utc;

    fn record(cpp: Option<&str>, uml: Option<&str>) -> PromptRecord {
        PromptRecord {
            id: 7,
            prompt: "foo".to_string(),
            exp_name: Some("exp-1".to_string()),
            architecture: None,
            description_type: None,
            response: None,
            cpp_code: cpp.map(str::to_string),
            uml_code: uml.map(str::to_string),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_summary_flags_treat_empty_as_absent() {
        let summary = PromptSummary::from_record(&record(Some(""), Some("@startuml")));
        assert!(!summary.has_cpp);
        assert!(summary.has_uml);
        assert_eq!(summary.exp_name.as_deref(), Some("exp-1"));
    }

    #[test]
    fn test_outcome_keeps_both_artifacts_on_success() {
        let raw = r#"{"cpp":"int main(){}","uml":"@startuml\n@enduml"}"#;
        let outcome = GenerationOutcome::from_extraction(raw, &extract(raw));
        assert_eq!(outcome.cpp_code(), Some("int main(){}"));
        assert_eq!(outcome.uml_code(), Some("@startuml\n@enduml"));
        assert_eq!(outcome.response(), raw);
    }

    #[test]
    fn test_outcome_drops_partial_artifacts() {
        let raw = r#"{"cpp":"int main(){}","uml":42}"#;
        let outcome = GenerationOutcome::from_extraction(raw, &extract(raw));
        assert_eq!(outcome.cpp_code(), None);
        assert_eq!(outcome.uml_code(), None);
        assert_eq!(outcome.response(), raw);
    }

    #[test]
    fn test_outcome_drops_empty_artifacts() {
        let raw = r#"{"cpp":"","uml":"@startuml\n@enduml"}"#;
        let outcome = GenerationOutcome::from_extraction(raw, &extract(raw));
        assert_eq!(outcome.cpp_code(), None);
        assert_eq!(outcome.uml_code(), None);
        assert_eq!(outcome.response(), raw);
    }

    #[test]
    fn test_artifact_kind_download_metadata() {
        assert_eq!(ArtifactKind::Cpp.file_name(3), "generated_3.cpp");
        assert_eq!(ArtifactKind::Uml.file_name(3), "diagram_3.puml");
        assert!(ArtifactKind::Cpp.content_type().starts_with("text/x-c++src"));
        assert_eq!(ArtifactKind::Uml.column(), "uml_code");
        assert_eq!(
            ArtifactKind::Uml.select(&record(None, Some("x"))),
            Some("x")
        );
    }
}
