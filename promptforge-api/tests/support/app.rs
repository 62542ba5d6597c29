#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use promptforge_api::{create_api_router, ApiConfig, AppState};
use promptforge_test_utils::{InMemoryStore, MockCompletionProvider};
use tower::ServiceExt;

/// Full router over an in-memory store and a canned model reply.
pub fn test_app(store: &InMemoryStore, provider: &MockCompletionProvider) -> Router {
    test_app_with_config(store, provider, ApiConfig::default())
}

pub fn test_app_with_config(
    store: &InMemoryStore,
    provider: &MockCompletionProvider,
    config: ApiConfig,
) -> Router {
    let state = AppState::new(Arc::new(store.clone()), Arc::new(provider.clone()), config);
    create_api_router(state)
}

pub async fn send(app: Router, method: Method, uri: &str, body: Option<String>) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
    }
    let request = builder
        .body(body.map(Body::from).unwrap_or_else(Body::empty))
        .expect("request");

    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");

    TestResponse {
        status,
        headers,
        body: String::from_utf8(bytes.to_vec()).expect("utf-8 body"),
    }
}

pub async fn get(app: Router, uri: &str) -> TestResponse {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> TestResponse {
    send(app, Method::POST, uri, Some(body.to_string())).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> TestResponse {
    send(app, Method::PUT, uri, Some(body.to_string())).await
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body)
            .unwrap_or_else(|e| panic!("not JSON ({}): {}", e, self.body))
    }

    pub fn header(&self, name: header::HeaderName) -> &str {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }
}
