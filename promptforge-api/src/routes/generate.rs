//! Generation REST route

use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};
use promptforge_core::NewPrompt;

use crate::{
    error::{ApiError, ApiResult},
    services::run_generation,
    state::AppState,
    types::{GenerateRequest, GenerateResponse},
    validation::{normalize_tag, validate_prompt},
};

/// POST /api/generate - Store a prompt, ask the model for C++ and PlantUML
#[utoipa::path(
    post,
    path = "/api/generate",
    tag = "Generation",
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "Both artifacts generated and stored", body = GenerateResponse),
        (status = 400, description = "Empty or oversized prompt", body = ApiError),
        (status = 422, description = "Model output invalid, or the model call failed", body = ApiError),
        (status = 500, description = "Database error", body = ApiError),
    ),
)]
pub async fn generate(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(req) = payload?;

    let prompt = validate_prompt(req.prompt.as_deref(), state.config.max_prompt_chars)?;
    let new_prompt = NewPrompt {
        prompt,
        exp_name: normalize_tag(req.exp_name),
        architecture: normalize_tag(req.architecture),
        description_type: normalize_tag(req.description_type),
    };

    let response = run_generation(state.store.as_ref(), state.llm.as_ref(), new_prompt).await?;
    Ok(Json(response))
}

pub fn create_router(state: AppState) -> axum::Router {
    axum::Router::new()
        .route("/generate", axum::routing::post(generate))
        .with_state(state)
}
