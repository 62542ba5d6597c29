//! PromptForge API - REST layer
//!
//! Axum server exposing prompt generation, prompt history with artifact
//! downloads, and editable template fragments. Persistence goes through the
//! [`promptforge_core::Store`] traits; [`DbClient`] is the PostgreSQL
//! implementation.

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod macros;
pub mod openapi;
pub mod routes;
pub mod services;
pub mod state;
pub mod telemetry;
pub mod types;
pub mod validation;

pub use config::{resolve_bind_addr, ApiConfig};
pub use db::{DbClient, DbConfig};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use openapi::ApiDoc;
pub use routes::create_api_router;
pub use state::{AppState, SharedProvider, SharedStore};
pub use types::*;
