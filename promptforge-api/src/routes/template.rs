//! Template REST routes
//!
//! Assembles prompt templates from stored fragments and lets the fragments
//! be edited in place.

use std::collections::HashMap;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    response::IntoResponse,
    Json,
};
use promptforge_core::{assemble, fragment_names, Architecture, SpecKind, TemplateFragment};

use crate::{
    error::{ApiError, ApiResult},
    state::{AppState, SharedStore},
    types::{TemplateQuery, TemplateResponse, UpsertFragmentRequest},
    validation::ValidateNonEmpty,
};

const INVALID_SELECTION: &str =
    "Invalid arch/spec. Use arch=3tier|mvc|microservices and spec=srs|frnfr.";

fn parse_selection(query: &TemplateQuery) -> ApiResult<(Architecture, SpecKind)> {
    let arch = query.arch.as_deref().unwrap_or_default().parse::<Architecture>();
    let spec = query.spec.as_deref().unwrap_or_default().parse::<SpecKind>();
    match (arch, spec) {
        (Ok(arch), Ok(spec)) => Ok((arch, spec)),
        _ => Err(ApiError::invalid_input(INVALID_SELECTION)),
    }
}

/// GET /api/template - Assemble the prompt template for an architecture and spec kind
#[utoipa::path(
    get,
    path = "/api/template",
    tag = "Templates",
    params(TemplateQuery),
    responses(
        (status = 200, description = "Assembled template", body = TemplateResponse),
        (status = 400, description = "Unknown arch or spec", body = ApiError),
        (status = 422, description = "Required fragments are missing", body = ApiError),
    ),
)]
pub async fn get_template(
    State(store): State<SharedStore>,
    Query(query): Query<TemplateQuery>,
) -> ApiResult<impl IntoResponse> {
    let (arch, spec) = parse_selection(&query)?;

    let names = fragment_names(arch, spec);
    let fragments: HashMap<String, String> = store
        .get_fragments(&names)
        .await?
        .into_iter()
        .map(|f| (f.name, f.prompt_part))
        .collect();

    let prompt = assemble(arch, spec, &fragments).map_err(|missing| {
        tracing::warn!(%arch, %spec, missing = ?missing.missing, "Template incomplete");
        ApiError::missing_fragments(&missing)
    })?;

    Ok(Json(TemplateResponse { arch, spec, prompt }))
}

/// GET /api/templates - All fragments, ordered by name
#[utoipa::path(
    get,
    path = "/api/templates",
    tag = "Templates",
    responses(
        (status = 200, description = "Stored fragments", body = Vec<TemplateFragment>),
        (status = 500, description = "Database error", body = ApiError),
    ),
)]
pub async fn list_fragments(State(store): State<SharedStore>) -> ApiResult<impl IntoResponse> {
    let fragments = store.list_fragments().await?;
    Ok(Json(fragments))
}

/// PUT /api/templates/{name} - Create or replace a fragment
#[utoipa::path(
    put,
    path = "/api/templates/{name}",
    tag = "Templates",
    params(("name" = String, Path, description = "Fragment name, e.g. 2_srs")),
    request_body = UpsertFragmentRequest,
    responses(
        (status = 200, description = "Stored fragment", body = TemplateFragment),
        (status = 400, description = "Blank name or malformed body", body = ApiError),
    ),
)]
pub async fn upsert_fragment(
    State(store): State<SharedStore>,
    Path(name): Path<String>,
    payload: Result<Json<UpsertFragmentRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let name = name.trim();
    name.validate_non_empty("name")?;
    let Json(req) = payload?;

    let fragment = store.upsert_fragment(name, &req.prompt_part).await?;
    tracing::info!(name = %fragment.name, chars = fragment.prompt_part.chars().count(), "Fragment saved");
    Ok(Json(fragment))
}

pub fn create_router(state: AppState) -> axum::Router {
    axum::Router::new()
        .route("/template", axum::routing::get(get_template))
        .route("/templates", axum::routing::get(list_fragments))
        .route("/templates/:name", axum::routing::put(upsert_fragment))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(arch: Option<&str>, spec: Option<&str>) -> TemplateQuery {
        TemplateQuery {
            arch: arch.map(str::to_string),
            spec: spec.map(str::to_string),
        }
    }

    #[test]
    fn test_parse_selection_case_insensitive() {
        let (arch, spec) = parse_selection(&query(Some("MVC"), Some("Srs"))).unwrap();
        assert_eq!(arch, Architecture::Mvc);
        assert_eq!(spec, SpecKind::Srs);
    }

    #[test]
    fn test_parse_selection_rejects_unknown_or_missing() {
        for q in [
            query(None, Some("srs")),
            query(Some("3tier"), None),
            query(Some("monolith"), Some("srs")),
            query(Some("3tier"), Some("prd")),
        ] {
            let err = parse_selection(&q).unwrap_err();
            assert_eq!(err.message, INVALID_SELECTION);
        }
    }
}
