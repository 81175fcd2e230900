// Library modules for the threaded posts application
pub mod config;
pub mod models;
pub mod db;
pub mod routes;
pub mod services;
pub mod auth;
pub mod error;
pub mod utils;

// Re-export commonly used types
pub use error::{AppError, Result};
pub use config::AppConfig;

use std::sync::Arc;

// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub db: db::DatabaseClient,
    pub auth_service: Arc<auth::AuthService>,
    pub user_service: Arc<services::UserService>,
    pub post_service: Arc<services::PostService>,
    pub comment_service: Arc<services::CommentService>,
}

impl AppState {
    pub async fn new(config: AppConfig) -> Result<Self> {
        let db = db::DatabaseClient::new(&config).await?;
        Ok(Self::from_parts(config, db, Arc::new(auth::AuthService::new())))
    }

    /// Wires services over an already opened database.
    pub fn from_parts(config: AppConfig, db: db::DatabaseClient, auth_service: Arc<auth::AuthService>) -> Self {
        let user_service = Arc::new(services::UserService::new(db.user_repo.clone()));
        let post_service = Arc::new(services::PostService::new(
            db.post_repo.clone(),
            db.user_repo.clone(),
        ));
        let comment_service = Arc::new(services::CommentService::new(
            db.comment_repo.clone(),
            db.post_repo.clone(),
        ));

        Self {
            config,
            db,
            auth_service,
            user_service,
            post_service,
            comment_service,
        }
    }

    pub fn seed_service(&self) -> services::SeedService {
        services::SeedService::new(
            self.user_service.clone(),
            self.post_service.clone(),
            self.auth_service.clone(),
        )
    }
}
