//! Prometheus Metrics Definitions
//!
//! Exposes a /metrics endpoint for Prometheus scraping.

use axum::{http::StatusCode, response::IntoResponse};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder,
};

use crate::error::{ApiError, ApiResult};

/// HTTP request latency buckets (seconds)
const HTTP_LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5, 5.0, 10.0,
];

/// Database operation latency buckets (seconds)
const DB_LATENCY_BUCKETS: &[f64] =
    &[0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5, 5.0];

/// Model round trips take seconds to minutes.
const MODEL_LATENCY_BUCKETS: &[f64] = &[0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 30.0, 60.0, 120.0, 300.0];

/// Global metrics instance - initialized on first use
pub static METRICS: Lazy<ApiResult<ForgeMetrics>> = Lazy::new(ForgeMetrics::new);

#[derive(Clone)]
pub struct ForgeMetrics {
    /// HTTP request counter - labels: method, path, status
    pub http_requests_total: CounterVec,

    /// HTTP request duration histogram - labels: method, path
    pub http_request_duration_seconds: HistogramVec,

    /// Database operation counter - labels: operation, table, status
    pub db_operations_total: CounterVec,

    /// Database operation duration histogram - labels: operation, table
    pub db_operation_duration_seconds: HistogramVec,

    /// Generation outcomes - labels: outcome (success, invalid_output, upstream_error)
    pub generations_total: CounterVec,

    /// Model call duration - labels: model, status
    pub model_call_duration_seconds: HistogramVec,
}

fn registration_error(name: &str, err: prometheus::Error) -> ApiError {
    ApiError::internal_error(format!("Failed to register {}: {}", name, err))
}

impl ForgeMetrics {
    /// Create and register all metrics with the default Prometheus registry.
    pub fn new() -> ApiResult<Self> {
        Ok(Self {
            http_requests_total: register_counter_vec!(
                "promptforge_http_requests_total",
                "Total number of HTTP requests",
                &["method", "path", "status"]
            )
            .map_err(|e| registration_error("http_requests_total", e))?,

            http_request_duration_seconds: register_histogram_vec!(
                "promptforge_http_request_duration_seconds",
                "HTTP request duration in seconds",
                &["method", "path"],
                HTTP_LATENCY_BUCKETS.to_vec()
            )
            .map_err(|e| registration_error("http_request_duration_seconds", e))?,

            db_operations_total: register_counter_vec!(
                "promptforge_db_operations_total",
                "Total number of database operations",
                &["operation", "table", "status"]
            )
            .map_err(|e| registration_error("db_operations_total", e))?,

            db_operation_duration_seconds: register_histogram_vec!(
                "promptforge_db_operation_duration_seconds",
                "Database operation duration in seconds",
                &["operation", "table"],
                DB_LATENCY_BUCKETS.to_vec()
            )
            .map_err(|e| registration_error("db_operation_duration_seconds", e))?,

            generations_total: register_counter_vec!(
                "promptforge_generations_total",
                "Generation requests by outcome",
                &["outcome"]
            )
            .map_err(|e| registration_error("generations_total", e))?,

            model_call_duration_seconds: register_histogram_vec!(
                "promptforge_model_call_duration_seconds",
                "Model call duration in seconds",
                &["model", "status"],
                MODEL_LATENCY_BUCKETS.to_vec()
            )
            .map_err(|e| registration_error("model_call_duration_seconds", e))?,
        })
    }

    pub fn record_http_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let status = status.to_string();
        self.http_requests_total
            .with_label_values(&[method, path, status.as_str()])
            .inc();
        self.http_request_duration_seconds
            .with_label_values(&[method, path])
            .observe(duration_secs);
    }

    pub fn record_db_operation(&self, operation: &str, table: &str, success: bool, duration_secs: f64) {
        let status = if success { "success" } else { "error" };
        self.db_operations_total
            .with_label_values(&[operation, table, status])
            .inc();
        self.db_operation_duration_seconds
            .with_label_values(&[operation, table])
            .observe(duration_secs);
    }

    pub fn record_generation(&self, outcome: &str) {
        self.generations_total.with_label_values(&[outcome]).inc();
    }

    pub fn record_model_call(&self, model: &str, success: bool, duration_secs: f64) {
        let status = if success { "success" } else { "error" };
        self.model_call_duration_seconds
            .with_label_values(&[model, status])
            .observe(duration_secs);
    }
}

/// Run `f` against the global metrics if they registered.
pub fn with_metrics(f: impl FnOnce(&ForgeMetrics)) {
    match METRICS.as_ref() {
        Ok(metrics) => f(metrics),
        Err(e) => tracing::warn!(error = %e, "Metrics unavailable"),
    }
}

/// Handler for GET /metrics endpoint.
///
/// Returns Prometheus text format metrics.
#[utoipa::path(
    get,
    path = "/metrics",
    tag = "Observability",
    responses(
        (status = 200, description = "Prometheus metrics in text format", content_type = "text/plain"),
        (status = 500, description = "Failed to encode metrics"),
    ),
)]
pub async fn metrics_handler() -> impl IntoResponse {
    // Register the families so an idle process still exposes them.
    let _ = &*METRICS;

    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "text/plain")],
                format!("Failed to encode metrics: {}", e).into_bytes(),
            )
        }
    }
}
