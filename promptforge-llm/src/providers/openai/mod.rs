//! OpenAI provider implementation
//!
//! Text generation through the Responses API.

pub mod client;
pub mod completion;
pub mod types;

pub use client::OpenAIClient;
pub use completion::OpenAICompletionProvider;
