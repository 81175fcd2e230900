pub mod user_service;
pub mod post_service;
pub mod comment_service;
pub mod seed_service;

// Re-export services for convenience
pub use user_service::UserService;
pub use post_service::PostService;
pub use comment_service::CommentService;
pub use seed_service::{SeedConfig, SeedReport, SeedService};
