//! Prompt history REST routes
//!
//! Read-only projections over the prompt log and artifact downloads.

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    Json,
};
use promptforge_core::{ArtifactKind, PromptSummary};

use crate::{
    error::{ApiError, ApiResult},
    extractors::PromptIdPath,
    state::{AppState, SharedStore},
    types::LatestPromptResponse,
};

/// GET /api/prompts - History, newest first
#[utoipa::path(
    get,
    path = "/api/prompts",
    tag = "Prompts",
    responses(
        (status = 200, description = "Prompt history", body = Vec<PromptSummary>),
        (status = 500, description = "Database error", body = ApiError),
    ),
)]
pub async fn list_prompts(State(store): State<SharedStore>) -> ApiResult<impl IntoResponse> {
    let prompts = store.list_prompts().await?;
    Ok(Json(prompts))
}

/// GET /api/latest - Most recent prompt, or `null` when none exist
#[utoipa::path(
    get,
    path = "/api/latest",
    tag = "Prompts",
    responses(
        (status = 200, description = "Latest prompt or null", body = Option<LatestPromptResponse>),
        (status = 500, description = "Database error", body = ApiError),
    ),
)]
pub async fn latest_prompt(State(store): State<SharedStore>) -> ApiResult<impl IntoResponse> {
    let latest = store.latest_prompt().await?.map(LatestPromptResponse::from);
    Ok(Json(latest))
}

async fn download(store: &SharedStore, id: i32, kind: ArtifactKind) -> ApiResult<impl IntoResponse> {
    let body = store
        .get_artifact(id, kind)
        .await?
        .filter(|text| !text.is_empty())
        .ok_or_else(|| ApiError::artifact_not_found(kind, id))?;

    tracing::debug!(id, artifact = %kind, bytes = body.len(), "Artifact download");

    let disposition = format!("attachment; filename=\"{}\"", kind.file_name(id));
    Ok((
        [
            (header::CONTENT_TYPE, kind.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

/// GET /api/prompts/{id}/cpp - Download the generated C++ source
#[utoipa::path(
    get,
    path = "/api/prompts/{id}/cpp",
    tag = "Prompts",
    params(("id" = i32, Path, description = "Prompt id")),
    responses(
        (status = 200, description = "C++ source", content_type = "text/x-c++src", body = String),
        (status = 400, description = "Invalid id", body = ApiError),
        (status = 404, description = "No C++ stored for this prompt", body = ApiError),
    ),
)]
pub async fn download_cpp(
    State(store): State<SharedStore>,
    PromptIdPath(id): PromptIdPath,
) -> ApiResult<impl IntoResponse> {
    download(&store, id, ArtifactKind::Cpp).await
}

/// GET /api/prompts/{id}/uml - Download the generated PlantUML diagram
#[utoipa::path(
    get,
    path = "/api/prompts/{id}/uml",
    tag = "Prompts",
    params(("id" = i32, Path, description = "Prompt id")),
    responses(
        (status = 200, description = "PlantUML source", content_type = "text/plain", body = String),
        (status = 400, description = "Invalid id", body = ApiError),
        (status = 404, description = "No diagram stored for this prompt", body = ApiError),
    ),
)]
pub async fn download_uml(
    State(store): State<SharedStore>,
    PromptIdPath(id): PromptIdPath,
) -> ApiResult<impl IntoResponse> {
    download(&store, id, ArtifactKind::Uml).await
}

pub fn create_router(state: AppState) -> axum::Router {
    axum::Router::new()
        .route("/latest", axum::routing::get(latest_prompt))
        .route("/prompts", axum::routing::get(list_prompts))
        .route("/prompts/:id/cpp", axum::routing::get(download_cpp))
        .route("/prompts/:id/uml", axum::routing::get(download_uml))
        .with_state(state)
}
