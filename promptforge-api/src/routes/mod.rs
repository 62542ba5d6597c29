//! REST API Routes Module
//!
//! Route handlers grouped by resource:
//! - generation under /api/generate
//! - prompt history and downloads under /api/prompts and /api/latest
//! - template fragments under /api/template(s)
//! - health probes, Prometheus metrics and the OpenAPI document

pub mod generate;
pub mod health;
pub mod prompt;
pub mod template;

use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, request, HeaderValue, Method},
    middleware::from_fn,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;

use crate::config::ApiConfig;
use crate::openapi::ApiDoc;
use crate::state::AppState;
use crate::telemetry::{metrics_handler, observability_middleware};

pub use generate::create_router as generate_router;
pub use health::create_router as health_router;
pub use prompt::create_router as prompt_router;
pub use template::create_router as template_router;

// ============================================================================
// OPENAPI ENDPOINT
// ============================================================================

async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

// ============================================================================
// CORS LAYER
// ============================================================================

/// Build the CORS layer from ApiConfig.
///
/// Without an allowlist every origin is accepted; otherwise origins are
/// matched through [`ApiConfig::is_origin_allowed`].
fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_DISPOSITION])
        .max_age(Duration::from_secs(config.cors_max_age_secs));

    if !config.has_cors_allowlist() {
        tracing::info!("CORS: allowing all origins");
        return cors.allow_origin(Any);
    }

    tracing::info!("CORS: allowing origins {:?}", config.cors_origins);
    let allowlist = config.clone();
    cors.allow_origin(AllowOrigin::predicate(
        move |origin: &HeaderValue, _request: &request::Parts| {
            origin
                .to_str()
                .map(|o| allowlist.is_origin_allowed(o))
                .unwrap_or(false)
        },
    ))
}

// ============================================================================
// ROUTER
// ============================================================================

/// Create the complete API router.
///
/// Execution order: CORS -> tower-http trace -> observability -> body limit -> handler
pub fn create_api_router(state: AppState) -> Router {
    let config = state.config.clone();

    let api_routes = Router::new()
        .merge(generate::create_router(state.clone()))
        .merge(prompt::create_router(state.clone()))
        .merge(template::create_router(state.clone()));

    Router::new()
        .nest("/api", api_routes)
        .nest("/health", health::create_router(state))
        .route("/metrics", get(metrics_handler))
        .route("/openapi.json", get(openapi_json))
        .layer(DefaultBodyLimit::max(config.body_limit_bytes))
        .layer(from_fn(observability_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(&config))
}
