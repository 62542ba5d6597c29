//! Error types for PromptForge operations

use thiserror::Error;

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Prompt {id} not found")]
    PromptNotFound { id: i32 },

    #[error("Insert failed for {table}: {reason}")]
    InsertFailed { table: String, reason: String },

    #[error("Update failed for {table} row {id}: {reason}")]
    UpdateFailed {
        table: String,
        id: i32,
        reason: String,
    },

    #[error("Query failed: {reason}")]
    QueryFailed { reason: String },

    #[error("Connection unavailable: {reason}")]
    ConnectionUnavailable { reason: String },
}

/// LLM provider errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LlmError {
    #[error("No LLM provider configured")]
    ProviderNotConfigured,

    #[error("Request to {provider} failed with status {status}: {message}")]
    RequestFailed {
        provider: String,
        status: i32,
        message: String,
    },

    #[error("Rate limited by {provider}, retry after {retry_after_ms}ms")]
    RateLimited {
        provider: String,
        retry_after_ms: i64,
    },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },
}

/// Validation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Field {field} exceeds {max} characters")]
    TooLong { field: String, max: usize },
}

/// Master error type for all PromptForge errors.
#[derive(Debug, Clone, Error)]
pub enum ForgeError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Result type alias for PromptForge operations.
pub type ForgeResult<T> = Result<T, ForgeError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display_not_found() {
        let err = StorageError::PromptNotFound { id: 42 };
        assert_eq!(err.to_string(), "Prompt 42 not found");
    }

    #[test]
    fn test_llm_error_display_rate_limited() {
        let err = LlmError::RateLimited {
            provider: "openai".to_string(),
            retry_after_ms: 1500,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Rate limited"));
        assert!(msg.contains("openai"));
        assert!(msg.contains("1500"));
    }

    #[test]
    fn test_validation_error_too_long() {
        let err = ValidationError::TooLong {
            field: "prompt".to_string(),
            max: 18000,
        };
        assert!(err.to_string().contains("18000"));
    }

    #[test]
    fn test_forge_error_from_variants() {
        let err: ForgeError = StorageError::PromptNotFound { id: 3 }.into();
        assert!(matches!(
            err,
            ForgeError::Storage(StorageError::PromptNotFound { id: 3 })
        ));

        let err: ForgeError = LlmError::ProviderNotConfigured.into();
        assert!(err.to_string().starts_with("LLM error"));
    }
}
