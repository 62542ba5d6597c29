//! Business logic behind the route handlers.

pub mod generation;

pub use generation::{call_model, run_generation, GenerationStatus};
