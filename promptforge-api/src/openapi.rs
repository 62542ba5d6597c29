//! OpenAPI document for the PromptForge API, generated with utoipa from the
//! route annotations and schema derives.

use utoipa::OpenApi;

use crate::error::{ApiError, ErrorCode};
use crate::routes::{generate, health, prompt, template};
use crate::telemetry::metrics;
use crate::types::{
    GenerateRequest, GenerateResponse, LatestPromptResponse, TemplateResponse,
    UpsertFragmentRequest,
};

use promptforge_core::{Architecture, ArtifactKind, PromptSummary, SpecKind, TemplateFragment};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "PromptForge API",
        version = "0.1.0",
        description = "Prompt to C++ and PlantUML generation with history and editable template fragments",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3001", description = "Local Development")
    ),
    tags(
        (name = "Generation", description = "Model-backed generation of C++ and PlantUML"),
        (name = "Prompts", description = "Prompt history and artifact downloads"),
        (name = "Templates", description = "Template fragments and assembled prompt templates"),
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Observability", description = "Prometheus metrics")
    ),
    paths(
        generate::generate,
        prompt::list_prompts,
        prompt::latest_prompt,
        prompt::download_cpp,
        prompt::download_uml,
        template::get_template,
        template::list_fragments,
        template::upsert_fragment,
        health::ping,
        health::liveness,
        health::readiness,
        metrics::metrics_handler,
    ),
    components(schemas(
        ApiError,
        ErrorCode,
        GenerateRequest,
        GenerateResponse,
        LatestPromptResponse,
        PromptSummary,
        ArtifactKind,
        TemplateFragment,
        TemplateResponse,
        UpsertFragmentRequest,
        Architecture,
        SpecKind,
        health::HealthResponse,
        health::HealthStatus,
        health::HealthDetails,
        health::ComponentHealth,
    ))
)]
pub struct ApiDoc;
