use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentState {
    Draft,
    Published,
    Deleted,
}

impl CommentState {
    /// States shown on a post page.
    pub const VISIBLE: [CommentState; 2] = [CommentState::Draft, CommentState::Published];

    pub fn as_str(&self) -> &'static str {
        match self {
            CommentState::Draft => "draft",
            CommentState::Published => "published",
            CommentState::Deleted => "deleted",
        }
    }
}

impl Default for CommentState {
    fn default() -> Self {
        CommentState::Draft
    }
}

impl fmt::Display for CommentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommentState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(CommentState::Draft),
            "published" => Ok(CommentState::Published),
            "deleted" => Ok(CommentState::Deleted),
            other => Err(format!("unknown comment state '{}'", other)),
        }
    }
}

/// A comment positioned in its post's nested set.
///
/// `lft`/`rgt` bound the interval that contains every descendant, so a
/// post's comments read in `lft` order are a depth-first walk of the thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub parent_id: Option<Uuid>, // None for top-level comments
    pub content: String,
    pub state: CommentState,
    pub lft: i32,
    pub rgt: i32,
    pub depth: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A comment before the repository assigns its nested-set position.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub content: String,
    pub state: CommentState,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
    pub parent_id: Option<Uuid>, // Reply to another comment
    #[serde(default)]
    pub state: Option<CommentState>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub content: String,
    pub state: CommentState,
    pub depth: i32,
    pub created_at: DateTime<Utc>,
    pub replies: Vec<CommentResponse>, // Nested replies
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            post_id: comment.post_id,
            user_id: comment.user_id,
            parent_id: comment.parent_id,
            content: comment.content,
            state: comment.state,
            depth: comment.depth,
            created_at: comment.created_at,
            replies: vec![], // Populated by the comment service
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_round_trips_through_text() {
        for state in [CommentState::Draft, CommentState::Published, CommentState::Deleted] {
            assert_eq!(state.as_str().parse::<CommentState>(), Ok(state));
        }
        assert!("spam".parse::<CommentState>().is_err());
    }

    #[test]
    fn test_visible_states_exclude_deleted() {
        assert!(CommentState::VISIBLE.contains(&CommentState::Draft));
        assert!(CommentState::VISIBLE.contains(&CommentState::Published));
        assert!(!CommentState::VISIBLE.contains(&CommentState::Deleted));
    }
}
