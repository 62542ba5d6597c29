//! Request validation helpers
//!
//! Shared checks for handler inputs. Failures map to 400 responses.

use crate::error::{ApiError, ApiResult};

/// Trait for validating non-empty strings.
///
/// # Example
/// ```ignore
/// use promptforge_api::validation::ValidateNonEmpty;
///
/// name.validate_non_empty("name")?;
/// ```
pub trait ValidateNonEmpty {
    /// Returns `ApiError::missing_field` if the value is empty or whitespace-only.
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()>;
}

impl ValidateNonEmpty for str {
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()> {
        if self.trim().is_empty() {
            return Err(ApiError::missing_field(field_name));
        }
        Ok(())
    }
}

impl ValidateNonEmpty for String {
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()> {
        self.as_str().validate_non_empty(field_name)
    }
}

impl<T: ValidateNonEmpty> ValidateNonEmpty for Option<T> {
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()> {
        match self {
            Some(value) => value.validate_non_empty(field_name),
            None => Err(ApiError::missing_field(field_name)),
        }
    }
}

/// Trim a submitted prompt and enforce the length limit.
///
/// Length is counted in characters, not bytes.
pub fn validate_prompt(raw: Option<&str>, max_chars: usize) -> ApiResult<String> {
    let prompt = raw.unwrap_or_default().trim();
    if prompt.is_empty() {
        return Err(ApiError::validation_failed("Empty prompt"));
    }

    let chars = prompt.chars().count();
    if chars > max_chars {
        return Err(ApiError::validation_failed("Prompt too long")
            .with_details(serde_json::json!({ "max_chars": max_chars, "chars": chars })));
    }

    Ok(prompt.to_string())
}

/// Blank tags are stored as NULL.
pub fn normalize_tag(tag: Option<String>) -> Option<String> {
    tag.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_validate_non_empty() {
        assert!("name".validate_non_empty("name").is_ok());
        let err = "  ".validate_non_empty("name").unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingField);
        assert!(None::<String>.validate_non_empty("name").is_err());
    }

    #[test]
    fn test_validate_prompt_trims() {
        assert_eq!(validate_prompt(Some("  foo \n"), 10).unwrap(), "foo");
    }

    #[test]
    fn test_validate_prompt_empty() {
        for raw in [None, Some(""), Some("   \t")] {
            let err = validate_prompt(raw, 10).unwrap_err();
            assert_eq!(err.message, "Empty prompt");
            assert_eq!(err.code, ErrorCode::ValidationFailed);
        }
    }

    #[test]
    fn test_validate_prompt_limit_counts_chars() {
        // 5 characters, 10 bytes
        let prompt = "ééééé";
        assert!(validate_prompt(Some(prompt), 5).is_ok());
        let err = validate_prompt(Some(prompt), 4).unwrap_err();
        assert_eq!(err.message, "Prompt too long");
    }

    #[test]
    fn test_normalize_tag() {
        assert_eq!(normalize_tag(Some(" exp-1 ".to_string())), Some("exp-1".to_string()));
        assert_eq!(normalize_tag(Some("  ".to_string())), None);
        assert_eq!(normalize_tag(None), None);
    }
}
