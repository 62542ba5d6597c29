//! Path extractor for prompt ids.
//!
//! `Path<i32>` rejects malformed ids with axum's plain-text rejection; this
//! extractor answers with the API's JSON error body instead.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
    response::{IntoResponse, Response},
};
use promptforge_core::PromptId;

use crate::error::ApiError;

/// Positive integer prompt id from the `:id` path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptIdPath(pub PromptId);

/// Error returned when the id segment is not a positive integer.
#[derive(Debug)]
pub struct PathIdError {
    pub path_param: String,
}

impl std::fmt::Display for PathIdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid id '{}'", self.path_param)
    }
}

impl std::error::Error for PathIdError {}

impl IntoResponse for PathIdError {
    fn into_response(self) -> Response {
        ApiError::invalid_input("Invalid id")
            .with_details(serde_json::json!({ "path_param": self.path_param }))
            .into_response()
    }
}

/// Parse a raw path segment as a prompt id.
pub fn parse_prompt_id(raw: &str) -> Option<PromptId> {
    raw.parse::<PromptId>().ok().filter(|id| *id > 0)
}

#[async_trait]
impl<S> FromRequestParts<S> for PromptIdPath
where
    S: Send + Sync,
{
    type Rejection = PathIdError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| PathIdError {
                path_param: parts.uri.path().to_string(),
            })?;

        parse_prompt_id(&raw)
            .map(PromptIdPath)
            .ok_or(PathIdError { path_param: raw })
    }
}
