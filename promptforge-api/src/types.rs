//! Request and response bodies for the REST API.

use promptforge_core::{Architecture, PromptId, PromptRecord, SpecKind, Timestamp};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

// ============================================================================
// GENERATION
// ============================================================================

/// Body of `POST /api/generate`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct GenerateRequest {
    /// Free-text request for the model; trimmed, 1..=18000 characters
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub exp_name: Option<String>,
    #[serde(default)]
    pub architecture: Option<String>,
    #[serde(default)]
    pub description_type: Option<String>,
}

/// Successful generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GenerateResponse {
    pub id: PromptId,
    pub model: String,
    pub cpp: String,
    pub uml: String,
}

/// Projection returned by `GET /api/latest`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LatestPromptResponse {
    pub id: PromptId,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: Timestamp,
    pub prompt: String,
    pub cpp_code: Option<String>,
    pub uml_code: Option<String>,
}

impl From<PromptRecord> for LatestPromptResponse {
    fn from(record: PromptRecord) -> Self {
        Self {
            id: record.id,
            created_at: record.created_at,
            prompt: record.prompt,
            cpp_code: record.cpp_code,
            uml_code: record.uml_code,
        }
    }
}

// ============================================================================
// TEMPLATES
// ============================================================================

/// Query string of `GET /api/template`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TemplateQuery {
    /// 3tier | mvc | microservices
    pub arch: Option<String>,
    /// srs | frnfr
    pub spec: Option<String>,
}

/// Assembled prompt template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TemplateResponse {
    pub arch: Architecture,
    pub spec: SpecKind,
    pub prompt: String,
}

/// Body of `PUT /api/templates/{name}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpsertFragmentRequest {
    /// Missing body text is stored as an empty fragment.
    #[serde(default)]
    pub prompt_part: String,
}
