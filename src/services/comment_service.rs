use crate::db::repository::{CommentRepository, PostRepository};
use crate::models::{Comment, CommentState, NewComment};
use crate::models::comment::{CommentResponse, CreateCommentRequest};
use crate::{AppError, Result};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

pub struct CommentService {
    comment_repo: Arc<dyn CommentRepository>,
    post_repo: Arc<dyn PostRepository>,
}

impl CommentService {
    pub fn new(comment_repo: Arc<dyn CommentRepository>, post_repo: Arc<dyn PostRepository>) -> Self {
        Self { comment_repo, post_repo }
    }

    pub async fn add_comment(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        request: CreateCommentRequest,
    ) -> Result<Comment> {
        if request.content.trim().is_empty() {
            return Err(AppError::ValidationError("Content can't be blank".to_string()));
        }
        if self.post_repo.get_post_by_id(post_id).await?.is_none() {
            return Err(AppError::NotFound("Post not found".to_string()));
        }

        let comment = NewComment {
            id: Uuid::new_v4(),
            post_id,
            user_id,
            parent_id: request.parent_id,
            content: request.content,
            state: request.state.unwrap_or_default(),
            created_at: Utc::now(),
        };

        let created = self.comment_repo.create_comment(&comment).await?;
        tracing::debug!("📝 Comment {} added to post {} at depth {}", created.id, post_id, created.depth);
        Ok(created)
    }

    pub async fn set_state(&self, comment_id: Uuid, state: CommentState) -> Result<Comment> {
        self.comment_repo.update_comment_state(comment_id, state).await
    }

    /// Draft and published comments of a post, threaded.
    pub async fn get_visible_comments(&self, post_id: Uuid) -> Result<Vec<CommentResponse>> {
        self.get_comments(post_id, &CommentState::VISIBLE).await
    }

    pub async fn get_comments(&self, post_id: Uuid, states: &[CommentState]) -> Result<Vec<CommentResponse>> {
        let comments = self.comment_repo.get_comments_by_post_id(post_id, states).await?;
        Ok(Self::build_comment_tree(comments))
    }

    /// Threads a `lft`-ordered list by interval containment.
    ///
    /// The list may have gaps left by state filtering, so a comment hangs
    /// under its nearest ancestor that is present, or at the top level if
    /// none is.
    pub fn build_comment_tree(comments: Vec<Comment>) -> Vec<CommentResponse> {
        let mut roots = Vec::new();
        let mut open: Vec<(i32, CommentResponse)> = Vec::new();

        for comment in comments {
            while open.last().map_or(false, |(rgt, _)| *rgt < comment.lft) {
                if let Some((_, finished)) = open.pop() {
                    Self::attach(&mut open, &mut roots, finished);
                }
            }
            open.push((comment.rgt, CommentResponse::from(comment)));
        }

        while let Some((_, finished)) = open.pop() {
            Self::attach(&mut open, &mut roots, finished);
        }

        roots
    }

    fn attach(open: &mut [(i32, CommentResponse)], roots: &mut Vec<CommentResponse>, node: CommentResponse) {
        match open.last_mut() {
            Some((_, parent)) => parent.replies.push(node),
            None => roots.push(node),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::{InMemoryStore, UserRepository};
    use crate::models::{Post, User};

    fn comment(lft: i32, rgt: i32, depth: i32, state: CommentState) -> Comment {
        Comment {
            id: Uuid::new_v4(),
            post_id: Uuid::nil(),
            user_id: Uuid::nil(),
            parent_id: None,
            content: format!("{}-{}", lft, rgt),
            state,
            lft,
            rgt,
            depth,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn shape(nodes: &[CommentResponse]) -> Vec<(String, usize)> {
        nodes.iter().map(|n| (n.content.clone(), n.replies.len())).collect()
    }

    #[test]
    fn test_tree_follows_nested_set() {
        // a { a1 { a1x } a2 } b
        let tree = CommentService::build_comment_tree(vec![
            comment(1, 8, 0, CommentState::Published),
            comment(2, 5, 1, CommentState::Published),
            comment(3, 4, 2, CommentState::Draft),
            comment(6, 7, 1, CommentState::Published),
            comment(9, 10, 0, CommentState::Draft),
        ]);

        assert_eq!(shape(&tree), vec![("1-8".to_string(), 2), ("9-10".to_string(), 0)]);
        assert_eq!(shape(&tree[0].replies), vec![("2-5".to_string(), 1), ("6-7".to_string(), 0)]);
        assert_eq!(tree[0].replies[0].replies[0].content, "3-4");
    }

    #[test]
    fn test_filtered_parent_promotes_children_to_nearest_ancestor() {
        // a { (a1 removed) { a1x } a2 }
        let tree = CommentService::build_comment_tree(vec![
            comment(1, 8, 0, CommentState::Published),
            comment(3, 4, 2, CommentState::Published),
            comment(6, 7, 1, CommentState::Published),
        ]);

        assert_eq!(shape(&tree), vec![("1-8".to_string(), 2)]);
        assert_eq!(shape(&tree[0].replies), vec![("3-4".to_string(), 0), ("6-7".to_string(), 0)]);
    }

    #[test]
    fn test_filtered_root_promotes_children_to_top_level() {
        let tree = CommentService::build_comment_tree(vec![
            comment(2, 3, 1, CommentState::Published),
            comment(4, 5, 1, CommentState::Published),
            comment(7, 8, 0, CommentState::Published),
        ]);

        assert_eq!(shape(&tree).len(), 3);
        assert!(tree.iter().all(|n| n.replies.is_empty()));
    }

    #[test]
    fn test_empty_list() {
        assert!(CommentService::build_comment_tree(Vec::new()).is_empty());
    }

    async fn service_with_post() -> (CommentService, Uuid, Uuid) {
        let store = InMemoryStore::new();
        let user = store.user_repo().create_user(&User {
            id: Uuid::new_v4(),
            email: "author@mail.com".to_string(),
            password_hash: "hash".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }).await.unwrap();
        let post = store.post_repo().create_post(&Post {
            id: Uuid::new_v4(),
            user_id: user.id,
            title: "title".to_string(),
            content: "content".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }).await.unwrap();

        let service = CommentService::new(Arc::new(store.comment_repo()), Arc::new(store.post_repo()));
        (service, post.id, user.id)
    }

    fn request(content: &str, state: Option<CommentState>) -> CreateCommentRequest {
        CreateCommentRequest { content: content.to_string(), parent_id: None, state }
    }

    #[tokio::test]
    async fn test_add_comment_defaults_to_draft() {
        let (service, post_id, user_id) = service_with_post().await;
        let created = service.add_comment(post_id, user_id, request("hello", None)).await.unwrap();

        assert_eq!(created.state, CommentState::Draft);
        assert_eq!((created.lft, created.rgt, created.depth), (1, 2, 0));
        assert_eq!(service.get_visible_comments(post_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_add_comment_rejects_blank_content() {
        let (service, post_id, user_id) = service_with_post().await;
        let err = service.add_comment(post_id, user_id, request("   ", None)).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_add_comment_to_unknown_post() {
        let (service, _post_id, user_id) = service_with_post().await;
        let err = service.add_comment(Uuid::new_v4(), user_id, request("hello", None)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_add_comment_by_unknown_user() {
        let (service, post_id, _user_id) = service_with_post().await;
        let err = service.add_comment(post_id, Uuid::new_v4(), request("hello", None)).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
        assert!(service.get_visible_comments(post_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_state_hides_comment() {
        let (service, post_id, user_id) = service_with_post().await;
        let created = service.add_comment(post_id, user_id, request("hello", Some(CommentState::Published))).await.unwrap();

        let deleted = service.set_state(created.id, CommentState::Deleted).await.unwrap();
        assert_eq!(deleted.state, CommentState::Deleted);
        assert!(service.get_visible_comments(post_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_state_of_unknown_comment() {
        let (service, _post_id, _user_id) = service_with_post().await;
        let err = service.set_state(Uuid::new_v4(), CommentState::Published).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
