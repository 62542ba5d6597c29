//! Axum middleware for request spans and metrics.

use axum::{extract::Request, middleware::Next, response::Response};
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Instant;
use tracing::{info_span, Instrument};

use super::metrics::with_metrics;

static NUMERIC_SEGMENT: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"/\d+(/|$)").ok());

/// Normalize path for metrics/spans (replace numeric ids with a placeholder).
///
/// Keeps Prometheus label cardinality bounded.
fn normalize_path(path: &str) -> String {
    match NUMERIC_SEGMENT.as_ref() {
        Some(pattern) => pattern.replace_all(path, "/{id}$1").into_owned(),
        None => path.to_string(),
    }
}

/// Wraps every request with a tracing span, a completion log line and
/// Prometheus request metrics.
pub async fn observability_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let normalized_path = normalize_path(&path);

    let span = info_span!(
        "http_request",
        http.method = %method,
        http.target = %path,
        http.route = %normalized_path,
    );

    let response = next.run(request).instrument(span).await;

    let duration = start.elapsed();
    let status = response.status();

    with_metrics(|m| {
        m.record_http_request(
            method.as_str(),
            &normalized_path,
            status.as_u16(),
            duration.as_secs_f64(),
        )
    });

    if status.is_server_error() {
        tracing::warn!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            duration_ms = duration.as_millis() as u64,
            "Request failed"
        );
    } else {
        tracing::info!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            duration_ms = duration.as_millis() as u64,
            "Request completed"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_download_path() {
        assert_eq!(normalize_path("/api/prompts/12345/cpp"), "/api/prompts/{id}/cpp");
    }

    #[test]
    fn test_normalize_trailing_id() {
        assert_eq!(normalize_path("/api/items/7"), "/api/items/{id}");
    }

    #[test]
    fn test_normalize_leaves_named_segments() {
        assert_eq!(normalize_path("/api/templates/3_mvc"), "/api/templates/3_mvc");
        assert_eq!(normalize_path("/health/ready"), "/health/ready");
    }
}
