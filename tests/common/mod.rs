#![allow(dead_code)]

use argon2::Params;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use threaded_posts::auth::AuthService;
use threaded_posts::db::DatabaseClient;
use threaded_posts::routes::create_routes;
use threaded_posts::{AppConfig, AppState};
use tower::ServiceExt;

/// In-memory state with a cheap password hash cost.
pub fn test_state() -> AppState {
    let auth = AuthService::with_params(Params::new(8, 1, 1, None).unwrap());
    AppState::from_parts(AppConfig::default(), DatabaseClient::in_memory(), Arc::new(auth))
}

pub async fn get_json(state: &AppState, uri: &str) -> (StatusCode, Value) {
    let app = create_routes().with_state(state.clone());
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}
