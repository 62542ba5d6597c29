//! Error Types for the PromptForge API
//!
//! This module defines error handling for the HTTP layer:
//! - ApiError struct for structured error responses
//! - ErrorCode enum for categorizing errors
//! - IntoResponse implementation for Axum HTTP responses
//!
//! All errors are serialized as JSON with appropriate HTTP status codes.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use promptforge_core::{
    ArtifactKind, ForgeError, LlmError, MissingFragments, PromptId, StorageError,
    ValidationError,
};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for API responses.
///
/// Each error code maps to a specific HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================================================
    // Validation Errors (400)
    // ========================================================================
    /// Request validation failed
    ValidationFailed,

    /// Request contains invalid input data
    InvalidInput,

    /// Required field is missing from request
    MissingField,

    /// Request body exceeds the configured limit (413)
    PayloadTooLarge,

    // ========================================================================
    // Not Found Errors (404)
    // ========================================================================
    /// Requested entity does not exist
    EntityNotFound,

    /// Prompt exists but the requested artifact was never produced
    ArtifactNotFound,

    // ========================================================================
    // Unprocessable (422)
    // ========================================================================
    /// Model replied but the reply is not the expected `{cpp, uml}` object
    InvalidLlmOutput,

    /// The model call itself failed
    UpstreamModelFailed,

    /// Template fragments needed for assembly are not stored
    MissingFragments,

    // ========================================================================
    // Server Errors (500, 503)
    // ========================================================================
    /// Internal server error
    InternalError,

    /// Database operation failed
    DatabaseError,

    /// Service is temporarily unavailable
    ServiceUnavailable,

    /// Database connection pool exhausted
    ConnectionPoolExhausted,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::ValidationFailed
            | ErrorCode::InvalidInput
            | ErrorCode::MissingField => StatusCode::BAD_REQUEST,

            ErrorCode::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,

            ErrorCode::EntityNotFound | ErrorCode::ArtifactNotFound => StatusCode::NOT_FOUND,

            ErrorCode::InvalidLlmOutput
            | ErrorCode::UpstreamModelFailed
            | ErrorCode::MissingFragments => StatusCode::UNPROCESSABLE_ENTITY,

            ErrorCode::ServiceUnavailable | ErrorCode::ConnectionPoolExhausted => {
                StatusCode::SERVICE_UNAVAILABLE
            }

            ErrorCode::InternalError | ErrorCode::DatabaseError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get a default message for this error code.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::ValidationFailed => "Request validation failed",
            ErrorCode::InvalidInput => "Invalid input data",
            ErrorCode::MissingField => "Required field is missing",
            ErrorCode::PayloadTooLarge => "Request body too large",

            ErrorCode::EntityNotFound => "Entity not found",
            ErrorCode::ArtifactNotFound => "Artifact not found",

            ErrorCode::InvalidLlmOutput => "LLM output was not valid JSON with cpp and uml",
            ErrorCode::UpstreamModelFailed => "Model call failed",
            ErrorCode::MissingFragments => "Missing prompt fragments",

            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database operation failed",
            ErrorCode::ServiceUnavailable => "Service temporarily unavailable",
            ErrorCode::ConnectionPoolExhausted => "Connection pool exhausted",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// Structured error response returned by every endpoint on failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ApiError {
    /// Error code categorizing the error
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Optional structured context (record id, raw model output, missing names)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Create a new API error with the given code, using the default message.
    pub fn from_code(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.default_message().to_string(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    // ========================================================================
    // Convenience constructors for common errors
    // ========================================================================

    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingField,
            format!("Required field '{}' is missing", field),
        )
    }

    pub fn entity_not_found(entity_type: &str, id: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::EntityNotFound,
            format!("{} with id {} not found", entity_type, id),
        )
    }

    /// Create an ArtifactNotFound error ("CPP not found", "UML not found").
    pub fn artifact_not_found(kind: ArtifactKind, id: PromptId) -> Self {
        Self::new(ErrorCode::ArtifactNotFound, format!("{} not found", kind.label()))
            .with_details(serde_json::json!({ "id": id, "artifact": kind }))
    }

    /// Model reply could not be turned into both artifacts.
    ///
    /// `details` carries the stored record id, the model, the raw output and
    /// which fields were recovered.
    pub fn invalid_llm_output(
        id: PromptId,
        model: &str,
        output: &str,
        cpp_found: bool,
        uml_found: bool,
    ) -> Self {
        Self::from_code(ErrorCode::InvalidLlmOutput).with_details(serde_json::json!({
            "id": id,
            "model": model,
            "output": output,
            "parsed": {
                "cpp_found": cpp_found,
                "uml_found": uml_found,
            },
        }))
    }

    /// The single model call failed; the prompt row `id` stays stored.
    pub fn upstream_model_failed(id: PromptId, model: &str, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self::new(
            ErrorCode::UpstreamModelFailed,
            format!("Model call failed: {}", reason),
        )
        .with_details(serde_json::json!({
            "id": id,
            "model": model,
            "reason": reason,
        }))
    }

    pub fn missing_fragments(missing: &MissingFragments) -> Self {
        Self::new(ErrorCode::MissingFragments, missing.to_string())
            .with_details(serde_json::json!({ "missing": missing.missing }))
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    pub fn database_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    pub fn connection_pool_exhausted() -> Self {
        Self::from_code(ErrorCode::ConnectionPoolExhausted)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// AXUM INTEGRATION
// ============================================================================

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(self)).into_response()
    }
}

// ============================================================================
// CONVERSIONS
// ============================================================================

/// Convert from tokio_postgres::Error to ApiError.
impl From<tokio_postgres::Error> for ApiError {
    fn from(err: tokio_postgres::Error) -> Self {
        // Log the full error, return a generic one
        tracing::error!("Database error: {:?}", err);
        ApiError::database_error("Database operation failed")
    }
}

/// Convert from deadpool_postgres::PoolError to ApiError.
impl From<deadpool_postgres::PoolError> for ApiError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        tracing::error!("Connection pool error: {:?}", err);

        match err {
            deadpool_postgres::PoolError::Timeout(_) => ApiError::connection_pool_exhausted(),
            deadpool_postgres::PoolError::Closed => {
                ApiError::service_unavailable("Database connection pool is closed")
            }
            _ => ApiError::database_error("Failed to acquire database connection"),
        }
    }
}

/// Convert from serde_json::Error to ApiError.
impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON serialization error: {:?}", err);
        ApiError::invalid_input(format!("Invalid JSON: {}", err))
    }
}

/// Malformed or oversized JSON bodies answer with the API error shape
/// instead of axum's plain-text rejection.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return ApiError::from_code(ErrorCode::PayloadTooLarge);
        }
        ApiError::invalid_input(rejection.body_text())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        match &err {
            ValidationError::RequiredFieldMissing { field } => ApiError::missing_field(field),
            ValidationError::TooLong { .. } => {
                ApiError::validation_failed(err.to_string())
            }
            ValidationError::InvalidValue { .. } => ApiError::invalid_input(err.to_string()),
        }
    }
}

impl From<ForgeError> for ApiError {
    fn from(err: ForgeError) -> Self {
        match err {
            ForgeError::Validation(e) => e.into(),
            ForgeError::Storage(StorageError::PromptNotFound { id }) => {
                ApiError::entity_not_found("Prompt", id)
            }
            ForgeError::Storage(StorageError::ConnectionUnavailable { reason }) => {
                tracing::error!(%reason, "Store unavailable");
                ApiError::service_unavailable("Database unavailable")
            }
            ForgeError::Storage(e) => {
                tracing::error!(error = %e, "Storage error");
                ApiError::database_error("Database operation failed")
            }
            ForgeError::Llm(LlmError::ProviderNotConfigured) => {
                ApiError::service_unavailable("No LLM provider configured")
            }
            ForgeError::Llm(e) => {
                // Without a record id this is only reachable outside generation.
                tracing::error!(error = %e, "LLM error");
                ApiError::internal_error(e.to_string())
            }
        }
    }
}

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_status_mapping() {
        assert_eq!(ErrorCode::ValidationFailed.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::InvalidInput.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::MissingField.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorCode::PayloadTooLarge.status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(ErrorCode::EntityNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::ArtifactNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorCode::InvalidLlmOutput.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ErrorCode::UpstreamModelFailed.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ErrorCode::MissingFragments.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(ErrorCode::DatabaseError.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            ErrorCode::ConnectionPoolExhausted.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_artifact_not_found_message() {
        let err = ApiError::artifact_not_found(ArtifactKind::Cpp, 3);
        assert_eq!(err.message, "CPP not found");
        let err = ApiError::artifact_not_found(ArtifactKind::Uml, 3);
        assert_eq!(err.message, "UML not found");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_invalid_llm_output_details() {
        let err = ApiError::invalid_llm_output(12, "gpt-5.2", "not json", false, true);
        let details = err.details.unwrap();
        assert_eq!(details["id"], 12);
        assert_eq!(details["model"], "gpt-5.2");
        assert_eq!(details["output"], "not json");
        assert_eq!(details["parsed"]["cpp_found"], false);
        assert_eq!(details["parsed"]["uml_found"], true);
    }

    #[test]
    fn test_upstream_model_failed_details() {
        let err = ApiError::upstream_model_failed(4, "gpt-5.2", "timeout");
        assert_eq!(err.code, ErrorCode::UpstreamModelFailed);
        let details = err.details.unwrap();
        assert_eq!(details["id"], 4);
        assert_eq!(details["reason"], "timeout");
    }

    #[test]
    fn test_missing_fragments_details() {
        let missing = MissingFragments {
            missing: vec!["2_srs".to_string(), "3_mvc".to_string()],
        };
        let err = ApiError::missing_fragments(&missing);
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.details.unwrap()["missing"][1], "3_mvc");
    }

    #[test]
    fn test_from_validation_error() {
        let err: ApiError = ValidationError::RequiredFieldMissing {
            field: "prompt".to_string(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::MissingField);

        let err: ApiError = ValidationError::TooLong {
            field: "prompt".to_string(),
            max: 18000,
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_from_forge_error_hides_storage_details() {
        let err: ApiError = ForgeError::from(StorageError::QueryFailed {
            reason: "syntax error at or near".to_string(),
        })
        .into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("syntax"));
    }

    #[test]
    fn test_error_serialization() -> Result<(), serde_json::Error> {
        let err = ApiError::invalid_input("Prompt is required");
        let json = serde_json::to_string(&err)?;
        assert!(json.contains("INVALID_INPUT"));
        assert!(!json.contains("details"));

        let deserialized: ApiError = serde_json::from_str(&json)?;
        assert_eq!(deserialized, err);
        Ok(())
    }
}
