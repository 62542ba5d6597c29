//! Response extraction
//!
//! Models are asked to answer with a bare JSON object `{"cpp": ..., "uml": ...}`
//! but frequently wrap it in a markdown code fence. Extraction undoes that one
//! wrapping, parses the payload and picks out the two string fields. Nothing
//! else is repaired.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::{has_content, ArtifactKind};

const FENCE: &str = "```";
const JSON_TAG: &str = "json";

/// One field of the model reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "lowercase")]
pub enum Field {
    /// The key held a JSON string.
    Present(String),
    /// Missing key, or any non-string value.
    Absent,
}

impl Field {
    fn from_object(object: &Map<String, Value>, key: &str) -> Self {
        match object.get(key) {
            Some(Value::String(text)) => Field::Present(text.clone()),
            _ => Field::Absent,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Field::Present(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Field::Present(text) => Some(text),
            Field::Absent => None,
        }
    }

    pub fn into_option(self) -> Option<String> {
        match self {
            Field::Present(text) => Some(text),
            Field::Absent => None,
        }
    }
}

/// Result of running [`extract`] over a raw reply.
///
/// Recovered fields are reported even when the overall extraction failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    pub cpp: Field,
    pub uml: Field,
}

impl Extraction {
    fn absent() -> Self {
        Self {
            cpp: Field::Absent,
            uml: Field::Absent,
        }
    }

    /// Both fields were recovered as strings.
    pub fn is_success(&self) -> bool {
        self.cpp.is_present() && self.uml.is_present()
    }

    /// Both fields recovered with non-empty text. Only then are the
    /// artifacts worth storing and serving.
    pub fn has_artifacts(&self) -> bool {
        has_content(self.cpp.as_str()) && has_content(self.uml.as_str())
    }

    pub fn field(&self, kind: ArtifactKind) -> &Field {
        match kind {
            ArtifactKind::Cpp => &self.cpp,
            ArtifactKind::Uml => &self.uml,
        }
    }
}

/// Remove a code fence spanning the whole (already trimmed) text.
///
/// Accepts an optional, case-insensitive `json` tag after the opening fence.
/// Text that is not fully enclosed is returned unchanged.
pub fn strip_fence(text: &str) -> &str {
    let inner = match text
        .strip_prefix(FENCE)
        .and_then(|rest| rest.strip_suffix(FENCE))
    {
        Some(inner) => inner,
        None => return text,
    };

    let inner = match inner.get(..JSON_TAG.len()) {
        Some(tag) if tag.eq_ignore_ascii_case(JSON_TAG) => &inner[JSON_TAG.len()..],
        _ => inner,
    };

    inner.trim()
}

/// Interpret raw model output as the two-field payload.
pub fn extract(raw: &str) -> Extraction {
    let payload = strip_fence(raw.trim());

    let object = match serde_json::from_str::<Value>(payload) {
        Ok(Value::Object(object)) => object,
        _ => return Extraction::absent(),
    };

    Extraction {
        cpp: Field::from_object(&object, ArtifactKind::Cpp.field_name()),
        uml: Field::from_object(&object, ArtifactKind::Uml.field_name()),
    }
}
