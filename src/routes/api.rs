use axum::{extract::State, routing::get, Router, Json};
use serde_json::{json, Value};
use crate::AppState;
use crate::routes::posts;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(api_health))
        .route("/posts", get(posts::get_posts))
        .route("/posts/:post_id", get(posts::get_post))
}

async fn api_health(State(app_state): State<AppState>) -> Json<Value> {
    let database = match app_state.db.health_check().await {
        Ok(()) => "ok".to_string(),
        Err(e) => {
            tracing::warn!("⚠️ Health check: {}", e);
            "unavailable".to_string()
        }
    };

    Json(json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "database": {
            "backend": app_state.db.backend_name(),
            "status": database
        }
    }))
}
