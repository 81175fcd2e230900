pub mod user;
pub mod post;
pub mod comment;

// Re-export models for convenience
pub use user::User;
pub use post::{Post, PostWithUser};
pub use comment::{Comment, CommentState, NewComment};
