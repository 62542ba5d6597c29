//! PromptForge Core
//!
//! Domain types shared by every crate in the workspace: prompt and template
//! records, the error taxonomy, extraction of the model's structured reply,
//! template assembly and the storage traits.

pub mod error;
pub mod extract;
pub mod store;
pub mod template;
pub mod types;

pub use error::{ForgeError, ForgeResult, LlmError, StorageError, ValidationError};
pub use extract::{extract, strip_fence, Extraction, Field};
pub use store::{PromptStore, Store, TemplateStore};
pub use template::{
    assemble, fragment_names, Architecture, MissingFragments, SpecKind,
    FINAL_INSTRUCTIONS_FRAGMENT, FRAGMENT_SEPARATOR, TASK_DESCRIPTION_FRAGMENT,
};
pub use types::{
    has_content, ArtifactKind, GenerationOutcome, NewPrompt, PromptId, PromptRecord,
    PromptSummary, TemplateFragment, Timestamp,
};
