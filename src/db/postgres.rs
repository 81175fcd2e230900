// PostgreSQL repository implementations using sqlx
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use crate::config::AppConfig;
use crate::{Result, AppError};
use crate::models::{Comment, CommentState, NewComment, Post, PostWithUser, User};
use crate::db::repository::{UserRepository, PostRepository, CommentRepository};

// PostgreSQL connection pool wrapper
pub struct PostgresDatabase {
    pub pool: Arc<PgPool>,
}

impl PostgresDatabase {
    pub async fn connect(database_url: &str, config: &AppConfig) -> Result<Self> {
        tracing::info!("🔗 DATABASE: Configuring connection pool");
        tracing::info!("   📊 Max connections: {}", config.database_max_connections);
        tracing::info!("   ⏰ Acquire timeout: {}s", config.database_acquire_timeout_secs);

        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(3600))
            .acquire_timeout(config.acquire_timeout())
            .connect(database_url)
            .await
            .map_err(|e| {
                tracing::error!("❌ DATABASE: Failed to create connection pool: {}", e);
                AppError::DatabaseError(format!("Failed to connect to PostgreSQL: {}", e))
            })?;

        tracing::info!("✅ DATABASE: Connection pool configured successfully");

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&*self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to run migrations: {}", e)))?;

        tracing::info!("✅ DATABASE: Migrations applied");
        Ok(())
    }

    pub fn user_repo(&self) -> PostgresUserRepository {
        PostgresUserRepository { pool: self.pool.clone() }
    }

    pub fn post_repo(&self) -> PostgresPostRepository {
        PostgresPostRepository { pool: self.pool.clone() }
    }

    pub fn comment_repo(&self) -> PostgresCommentRepository {
        PostgresCommentRepository { pool: self.pool.clone() }
    }
}

// Unique and foreign-key violations are caller mistakes, not outages
fn map_db_error(context: &str, e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::Conflict(format!("{}: {}", context, db_err.message()));
        }
        if db_err.is_foreign_key_violation() {
            return AppError::ValidationError(format!("{}: {}", context, db_err.message()));
        }
    }
    AppError::DatabaseError(format!("{}: {}", context, e))
}

// PostgreSQL User Repository
pub struct PostgresUserRepository {
    pool: Arc<PgPool>,
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create_user(&self, user: &User) -> Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email, password_hash, created_at, updated_at
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| match map_db_error("Failed to create user", e) {
            AppError::Conflict(_) => AppError::Conflict("Email has already been taken".to_string()),
            other => other,
        })
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, created_at, updated_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_db_error("Failed to get user by id", e))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, created_at, updated_at FROM users WHERE LOWER(email) = LOWER($1)",
        )
        .bind(email)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_db_error("Failed to get user by email", e))
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, created_at, updated_at FROM users ORDER BY created_at, id",
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_db_error("Failed to list users", e))
    }

    async fn count_users(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_db_error("Failed to count users", e))?;
        Ok(count as u64)
    }
}

// PostgreSQL Post Repository
pub struct PostgresPostRepository {
    pool: Arc<PgPool>,
}

// A post row joined with its owner's columns
#[derive(sqlx::FromRow)]
struct PostWithUserRow {
    id: Uuid,
    user_id: Uuid,
    title: String,
    content: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    user_email: String,
    user_password_hash: String,
    user_created_at: DateTime<Utc>,
    user_updated_at: DateTime<Utc>,
}

impl From<PostWithUserRow> for PostWithUser {
    fn from(row: PostWithUserRow) -> Self {
        Self {
            user: User {
                id: row.user_id,
                email: row.user_email,
                password_hash: row.user_password_hash,
                created_at: row.user_created_at,
                updated_at: row.user_updated_at,
            },
            post: Post {
                id: row.id,
                user_id: row.user_id,
                title: row.title,
                content: row.content,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
        }
    }
}

const POST_WITH_USER_SELECT: &str = r#"
    SELECT p.id, p.user_id, p.title, p.content, p.created_at, p.updated_at,
           u.email AS user_email, u.password_hash AS user_password_hash,
           u.created_at AS user_created_at, u.updated_at AS user_updated_at
    FROM posts p
    JOIN users u ON u.id = p.user_id
"#;

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create_post(&self, post: &Post) -> Result<Post> {
        sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (id, user_id, title, content, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, title, content, created_at, updated_at
            "#,
        )
        .bind(post.id)
        .bind(post.user_id)
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.created_at)
        .bind(post.updated_at)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| match map_db_error("Failed to create post", e) {
            AppError::ValidationError(_) => AppError::ValidationError("User must exist".to_string()),
            other => other,
        })
    }

    async fn get_post_by_id(&self, id: Uuid) -> Result<Option<Post>> {
        sqlx::query_as::<_, Post>(
            "SELECT id, user_id, title, content, created_at, updated_at FROM posts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_db_error("Failed to get post by id", e))
    }

    async fn get_post_with_user(&self, id: Uuid) -> Result<Option<PostWithUser>> {
        let row = sqlx::query_as::<_, PostWithUserRow>(&format!("{} WHERE p.id = $1", POST_WITH_USER_SELECT))
            .bind(id)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_db_error("Failed to get post with user", e))?;

        Ok(row.map(PostWithUser::from))
    }

    async fn list_posts_with_users(&self) -> Result<Vec<PostWithUser>> {
        let rows = sqlx::query_as::<_, PostWithUserRow>(&format!("{} ORDER BY p.created_at, p.id", POST_WITH_USER_SELECT))
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_db_error("Failed to list posts", e))?;

        Ok(rows.into_iter().map(PostWithUser::from).collect())
    }

    async fn count_posts(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_db_error("Failed to count posts", e))?;
        Ok(count as u64)
    }
}

// PostgreSQL Comment Repository
pub struct PostgresCommentRepository {
    pool: Arc<PgPool>,
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: Uuid,
    post_id: Uuid,
    user_id: Uuid,
    parent_id: Option<Uuid>,
    content: String,
    state: String,
    lft: i32,
    rgt: i32,
    depth: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CommentRow> for Comment {
    type Error = AppError;

    fn try_from(row: CommentRow) -> Result<Self> {
        let state = row.state.parse::<CommentState>()
            .map_err(|e| AppError::DatabaseError(format!("Invalid comment row {}: {}", row.id, e)))?;

        Ok(Comment {
            id: row.id,
            post_id: row.post_id,
            user_id: row.user_id,
            parent_id: row.parent_id,
            content: row.content,
            state,
            lft: row.lft,
            rgt: row.rgt,
            depth: row.depth,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const COMMENT_COLUMNS: &str =
    "id, post_id, user_id, parent_id, content, state, lft, rgt, depth, created_at, updated_at";

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    // Nested-set insert in one transaction; the post row lock serializes
    // concurrent inserts into the same thread
    async fn create_comment(&self, comment: &NewComment) -> Result<Comment> {
        let mut tx = self.pool.begin()
            .await
            .map_err(|e| map_db_error("Failed to start comment transaction", e))?;

        let post_exists = sqlx::query_scalar::<_, Uuid>("SELECT id FROM posts WHERE id = $1 FOR UPDATE")
            .bind(comment.post_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_db_error("Failed to lock post", e))?;
        if post_exists.is_none() {
            return Err(AppError::NotFound("Post not found".to_string()));
        }

        let (lft, depth) = match comment.parent_id {
            None => {
                let max_rgt = sqlx::query_scalar::<_, Option<i32>>("SELECT MAX(rgt) FROM comments WHERE post_id = $1")
                    .bind(comment.post_id)
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(|e| map_db_error("Failed to read nested set bounds", e))?;
                (max_rgt.unwrap_or(0) + 1, 0)
            }
            Some(parent_id) => {
                let parent = sqlx::query_as::<_, (i32, i32)>(
                    "SELECT rgt, depth FROM comments WHERE id = $1 AND post_id = $2",
                )
                .bind(parent_id)
                .bind(comment.post_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| map_db_error("Failed to load parent comment", e))?;

                let (boundary, parent_depth) = parent.ok_or_else(|| AppError::ValidationError(
                    "Parent comment must belong to the same post".to_string()
                ))?;

                sqlx::query("UPDATE comments SET rgt = rgt + 2 WHERE post_id = $1 AND rgt >= $2")
                    .bind(comment.post_id)
                    .bind(boundary)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| map_db_error("Failed to shift nested set", e))?;

                sqlx::query("UPDATE comments SET lft = lft + 2 WHERE post_id = $1 AND lft > $2")
                    .bind(comment.post_id)
                    .bind(boundary)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| map_db_error("Failed to shift nested set", e))?;

                (boundary, parent_depth + 1)
            }
        };

        let row = sqlx::query_as::<_, CommentRow>(&format!(
            r#"
            INSERT INTO comments (id, post_id, user_id, parent_id, content, state, lft, rgt, depth, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
            RETURNING {}
            "#,
            COMMENT_COLUMNS
        ))
        .bind(comment.id)
        .bind(comment.post_id)
        .bind(comment.user_id)
        .bind(comment.parent_id)
        .bind(&comment.content)
        .bind(comment.state.as_str())
        .bind(lft)
        .bind(lft + 1)
        .bind(depth)
        .bind(comment.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match map_db_error("Failed to create comment", e) {
            AppError::ValidationError(_) => AppError::ValidationError("User must exist".to_string()),
            other => other,
        })?;

        tx.commit()
            .await
            .map_err(|e| map_db_error("Failed to commit comment transaction", e))?;

        Comment::try_from(row)
    }

    async fn get_comments_by_post_id(&self, post_id: Uuid, states: &[CommentState]) -> Result<Vec<Comment>> {
        let states: Vec<String> = states.iter().map(|s| s.as_str().to_string()).collect();

        let rows = sqlx::query_as::<_, CommentRow>(&format!(
            "SELECT {} FROM comments WHERE post_id = $1 AND state = ANY($2) ORDER BY lft",
            COMMENT_COLUMNS
        ))
        .bind(post_id)
        .bind(&states)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_db_error("Failed to get comments for post", e))?;

        rows.into_iter().map(Comment::try_from).collect()
    }

    async fn update_comment_state(&self, id: Uuid, state: CommentState) -> Result<Comment> {
        let row = sqlx::query_as::<_, CommentRow>(&format!(
            "UPDATE comments SET state = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            COMMENT_COLUMNS
        ))
        .bind(id)
        .bind(state.as_str())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_db_error("Failed to update comment state", e))?;

        row.map(Comment::try_from)
            .transpose()?
            .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))
    }
}
