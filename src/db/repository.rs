// Repository trait abstractions for database operations
use crate::models::{Comment, CommentState, NewComment, Post, PostWithUser, User};
use crate::{AppError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, user: &User) -> Result<User>;
    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn list_users(&self) -> Result<Vec<User>>;
    async fn count_users(&self) -> Result<u64>;
}

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create_post(&self, post: &Post) -> Result<Post>;
    async fn get_post_by_id(&self, id: Uuid) -> Result<Option<Post>>;
    async fn get_post_with_user(&self, id: Uuid) -> Result<Option<PostWithUser>>;
    /// Every post joined with its owner, oldest first.
    async fn list_posts_with_users(&self) -> Result<Vec<PostWithUser>>;
    async fn count_posts(&self) -> Result<u64>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Inserts the comment into its post's nested set, as the last root or
    /// as the last child of `parent_id`.
    async fn create_comment(&self, comment: &NewComment) -> Result<Comment>;
    /// Comments of a post in the given states, ordered by `lft`.
    async fn get_comments_by_post_id(&self, post_id: Uuid, states: &[CommentState]) -> Result<Vec<Comment>>;
    async fn update_comment_state(&self, id: Uuid, state: CommentState) -> Result<Comment>;
}

// In-memory storage used when no database is configured and in tests
#[derive(Default)]
struct MemoryTables {
    users: Vec<User>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<MemoryTables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_repo(&self) -> InMemoryUserRepository {
        InMemoryUserRepository { tables: self.tables.clone() }
    }

    pub fn post_repo(&self) -> InMemoryPostRepository {
        InMemoryPostRepository { tables: self.tables.clone() }
    }

    pub fn comment_repo(&self) -> InMemoryCommentRepository {
        InMemoryCommentRepository { tables: self.tables.clone() }
    }
}

pub struct InMemoryUserRepository {
    tables: Arc<RwLock<MemoryTables>>,
}

pub struct InMemoryPostRepository {
    tables: Arc<RwLock<MemoryTables>>,
}

pub struct InMemoryCommentRepository {
    tables: Arc<RwLock<MemoryTables>>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create_user(&self, user: &User) -> Result<User> {
        let mut tables = self.tables.write().await;

        let email = user.email.to_lowercase();
        if tables.users.iter().any(|u| u.email.to_lowercase() == email) {
            return Err(AppError::Conflict("Email has already been taken".to_string()));
        }

        tables.users.push(user.clone());
        Ok(user.clone())
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        let email = email.to_lowercase();
        Ok(tables.users.iter().find(|u| u.email.to_lowercase() == email).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let tables = self.tables.read().await;
        let mut users = tables.users.clone();
        users.sort_by_key(|u| (u.created_at, u.id));
        Ok(users)
    }

    async fn count_users(&self) -> Result<u64> {
        Ok(self.tables.read().await.users.len() as u64)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn create_post(&self, post: &Post) -> Result<Post> {
        let mut tables = self.tables.write().await;

        if !tables.users.iter().any(|u| u.id == post.user_id) {
            return Err(AppError::ValidationError("User must exist".to_string()));
        }

        tables.posts.push(post.clone());
        Ok(post.clone())
    }

    async fn get_post_by_id(&self, id: Uuid) -> Result<Option<Post>> {
        let tables = self.tables.read().await;
        Ok(tables.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn get_post_with_user(&self, id: Uuid) -> Result<Option<PostWithUser>> {
        let tables = self.tables.read().await;
        let Some(post) = tables.posts.iter().find(|p| p.id == id) else {
            return Ok(None);
        };
        Ok(tables.join_user(post))
    }

    async fn list_posts_with_users(&self) -> Result<Vec<PostWithUser>> {
        let tables = self.tables.read().await;
        let mut posts: Vec<PostWithUser> = tables.posts.iter()
            .filter_map(|post| tables.join_user(post))
            .collect();
        posts.sort_by_key(|p| (p.post.created_at, p.post.id));
        Ok(posts)
    }

    async fn count_posts(&self) -> Result<u64> {
        Ok(self.tables.read().await.posts.len() as u64)
    }
}

impl MemoryTables {
    fn join_user(&self, post: &Post) -> Option<PostWithUser> {
        self.users.iter()
            .find(|u| u.id == post.user_id)
            .map(|user| PostWithUser { post: post.clone(), user: user.clone() })
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn create_comment(&self, new_comment: &NewComment) -> Result<Comment> {
        let mut tables = self.tables.write().await;

        if !tables.posts.iter().any(|p| p.id == new_comment.post_id) {
            return Err(AppError::NotFound("Post not found".to_string()));
        }
        if !tables.users.iter().any(|u| u.id == new_comment.user_id) {
            return Err(AppError::ValidationError("User must exist".to_string()));
        }

        let (lft, depth) = match new_comment.parent_id {
            None => {
                let max_rgt = tables.comments.iter()
                    .filter(|c| c.post_id == new_comment.post_id)
                    .map(|c| c.rgt)
                    .max()
                    .unwrap_or(0);
                (max_rgt + 1, 0)
            }
            Some(parent_id) => {
                let (boundary, parent_depth) = tables.comments.iter()
                    .find(|c| c.id == parent_id && c.post_id == new_comment.post_id)
                    .map(|parent| (parent.rgt, parent.depth))
                    .ok_or_else(|| AppError::ValidationError(
                        "Parent comment must belong to the same post".to_string()
                    ))?;

                // Open a two-slot gap at the parent's right edge
                for comment in tables.comments.iter_mut().filter(|c| c.post_id == new_comment.post_id) {
                    if comment.rgt >= boundary {
                        comment.rgt += 2;
                    }
                    if comment.lft > boundary {
                        comment.lft += 2;
                    }
                }
                (boundary, parent_depth + 1)
            }
        };

        let comment = Comment {
            id: new_comment.id,
            post_id: new_comment.post_id,
            user_id: new_comment.user_id,
            parent_id: new_comment.parent_id,
            content: new_comment.content.clone(),
            state: new_comment.state,
            lft,
            rgt: lft + 1,
            depth,
            created_at: new_comment.created_at,
            updated_at: new_comment.created_at,
        };
        tables.comments.push(comment.clone());
        Ok(comment)
    }

    async fn get_comments_by_post_id(&self, post_id: Uuid, states: &[CommentState]) -> Result<Vec<Comment>> {
        let tables = self.tables.read().await;
        let mut comments: Vec<Comment> = tables.comments.iter()
            .filter(|c| c.post_id == post_id && states.contains(&c.state))
            .cloned()
            .collect();
        comments.sort_by_key(|c| c.lft);
        Ok(comments)
    }

    async fn update_comment_state(&self, id: Uuid, state: CommentState) -> Result<Comment> {
        let mut tables = self.tables.write().await;
        let comment = tables.comments.iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

        comment.state = state;
        comment.updated_at = chrono::Utc::now();
        Ok(comment.clone())
    }
}
