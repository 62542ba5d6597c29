//! PromptForge API Server Entry Point
//!
//! Loads `.env`, initializes logging, prepares the database schema and
//! starts the Axum HTTP server.

use std::sync::Arc;

use axum::Router;
use promptforge_api::{
    create_api_router, resolve_bind_addr, ApiConfig, ApiError, ApiResult, AppState, DbClient,
    DbConfig,
};
use promptforge_api::telemetry::{init_tracer, TelemetryConfig};
use promptforge_llm::{LlmConfig, OpenAICompletionProvider};

#[tokio::main]
async fn main() -> ApiResult<()> {
    // A missing .env file is fine; real deployments use the environment.
    let dotenv = dotenvy::dotenv();

    let telemetry_config = TelemetryConfig::default();
    init_tracer(&telemetry_config)?;
    if let Ok(path) = dotenv {
        tracing::info!(path = %path.display(), "Loaded .env");
    }

    let db_config = DbConfig::from_env();
    let db = DbClient::from_config(&db_config)?;
    db.init_schema().await?;

    let llm_config = LlmConfig::from_env();
    let provider = OpenAICompletionProvider::from_config(&llm_config).map_err(|e| {
        ApiError::internal_error(format!("Failed to initialize model provider: {}", e))
    })?;
    tracing::info!(model = %llm_config.model, base_url = %llm_config.base_url, "Model provider ready");

    let api_config = ApiConfig::from_env();
    let state = AppState::new(Arc::new(db), Arc::new(provider), api_config);
    let app: Router = create_api_router(state);

    let addr = resolve_bind_addr()?;
    tracing::info!(%addr, "Starting PromptForge API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
