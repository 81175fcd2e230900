use crate::db::repository::{PostRepository, UserRepository};
use crate::models::Post;
use crate::models::post::{CreatePostRequest, PostResponse};
use crate::{AppError, Result};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

pub struct PostService {
    post_repo: Arc<dyn PostRepository>,
    user_repo: Arc<dyn UserRepository>,
}

impl PostService {
    pub fn new(post_repo: Arc<dyn PostRepository>, user_repo: Arc<dyn UserRepository>) -> Self {
        Self { post_repo, user_repo }
    }

    pub async fn create_post(&self, request: CreatePostRequest, user_id: Uuid) -> Result<Post> {
        if request.title.trim().is_empty() {
            return Err(AppError::ValidationError("Title can't be blank".to_string()));
        }
        if request.content.trim().is_empty() {
            return Err(AppError::ValidationError("Content can't be blank".to_string()));
        }
        if self.user_repo.get_user_by_id(user_id).await?.is_none() {
            return Err(AppError::ValidationError("User must exist".to_string()));
        }

        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4(),
            user_id,
            title: request.title,
            content: request.content,
            created_at: now,
            updated_at: now,
        };

        self.post_repo.create_post(&post).await
    }

    /// All posts with their owners, loaded in one pass.
    pub async fn get_posts_with_users(&self) -> Result<Vec<PostResponse>> {
        let posts = self.post_repo.list_posts_with_users().await?;
        Ok(posts.into_iter().map(PostResponse::from).collect())
    }

    pub async fn get_post(&self, post_id: Uuid) -> Result<Option<PostResponse>> {
        Ok(self.post_repo.get_post_with_user(post_id).await?.map(PostResponse::from))
    }

    pub async fn count_posts(&self) -> Result<u64> {
        self.post_repo.count_posts().await
    }
}
