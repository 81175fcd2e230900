pub mod postgres;
pub mod repository;

// Database connection and state management
use crate::config::AppConfig;
use crate::utils::database_retry::with_database_retry;
use crate::{AppError, Result};
use repository::{CommentRepository, InMemoryStore, PostRepository, UserRepository};
use sqlx::postgres::PgPool;
use std::sync::Arc;

#[derive(Clone)]
enum Backend {
    Postgres(Arc<PgPool>),
    InMemory,
}

#[derive(Clone)]
pub struct DatabaseClient {
    pub user_repo: Arc<dyn UserRepository>,
    pub post_repo: Arc<dyn PostRepository>,
    pub comment_repo: Arc<dyn CommentRepository>,
    backend: Backend,
}

impl DatabaseClient {
    /// Connects to PostgreSQL when `DATABASE_URL` is configured, otherwise
    /// falls back to in-memory storage.
    pub async fn new(config: &AppConfig) -> Result<Self> {
        match &config.database_url {
            Some(url) => Self::connect_postgres(url, config).await,
            None => {
                tracing::warn!("⚠️ DATABASE: DATABASE_URL not set, using in-memory storage");
                Ok(Self::in_memory())
            }
        }
    }

    pub async fn connect_postgres(database_url: &str, config: &AppConfig) -> Result<Self> {
        let database = with_database_retry(move || postgres::PostgresDatabase::connect(database_url, config)).await?;
        database.run_migrations().await?;

        Ok(Self {
            user_repo: Arc::new(database.user_repo()),
            post_repo: Arc::new(database.post_repo()),
            comment_repo: Arc::new(database.comment_repo()),
            backend: Backend::Postgres(database.pool.clone()),
        })
    }

    pub fn in_memory() -> Self {
        let store = InMemoryStore::new();

        Self {
            user_repo: Arc::new(store.user_repo()),
            post_repo: Arc::new(store.post_repo()),
            comment_repo: Arc::new(store.comment_repo()),
            backend: Backend::InMemory,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self.backend {
            Backend::Postgres(_) => "postgres",
            Backend::InMemory => "in_memory",
        }
    }

    pub async fn health_check(&self) -> Result<()> {
        match &self.backend {
            Backend::Postgres(pool) => {
                sqlx::query("SELECT 1")
                    .execute(&**pool)
                    .await
                    .map_err(|e| AppError::DatabaseError(format!("Health check failed: {}", e)))?;
                Ok(())
            }
            Backend::InMemory => Ok(()),
        }
    }
}
