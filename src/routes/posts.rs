use axum::{
    extract::{Path, State},
    response::Json as ResponseJson,
};
use serde_json::{json, Value};
use uuid::Uuid;
use crate::{AppState, AppError, Result};

/// GET /posts
///
/// Every post with its owner.
pub async fn get_posts(
    State(app_state): State<AppState>,
) -> Result<ResponseJson<Value>> {
    let posts = app_state.post_service.get_posts_with_users().await?;

    tracing::debug!("✅ Listed {} posts", posts.len());
    Ok(ResponseJson(json!({
        "total": posts.len(),
        "posts": posts
    })))
}

/// GET /posts/{post_id}
///
/// The post with its draft and published comments, threaded.
pub async fn get_post(
    State(app_state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> Result<ResponseJson<Value>> {
    let post = app_state.post_service.get_post(post_id).await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    let comments = app_state.comment_service.get_visible_comments(post_id).await?;

    tracing::debug!("✅ Loaded post {} with {} top-level comments", post_id, comments.len());
    Ok(ResponseJson(json!({
        "post": post,
        "comments": comments
    })))
}
