use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::{User, UserResponse};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
}

/// A post with its owner loaded in the same query.
#[derive(Debug, Clone)]
pub struct PostWithUser {
    pub post: Post,
    pub user: User,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub user: UserResponse,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PostWithUser> for PostResponse {
    fn from(PostWithUser { post, user }: PostWithUser) -> Self {
        Self {
            id: post.id,
            title: post.title,
            content: post.content,
            user: UserResponse::from(user),
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}
