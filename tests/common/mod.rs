use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use health_log::config::Config;
use health_log::store::MemoryLogStore;
use health_log::{router, AppState};

/// Router over a fresh in-memory store.
pub fn create_test_app() -> (Router, Arc<MemoryLogStore>) {
    let store = Arc::new(MemoryLogStore::new());
    let state = AppState::new(store.clone(), Config::test_default());
    (router(state), store)
}

pub async fn send(app: &Router, request: Request<Body>) -> (u16, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status().as_u16();
    (status, json_body(response).await)
}

#[allow(dead_code)]
pub async fn get(app: &Router, uri: &str) -> (u16, Value) {
    send(
        app,
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

#[allow(dead_code)]
pub async fn post_json(app: &Router, uri: &str, body: Value) -> (u16, Value) {
    send(
        app,
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

async fn json_body(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    }
}
