//! Demo data for a fresh database.
//!
//! Seeding creates a fixed number of users, then a fixed number of posts
//! whose owners are drawn at random from every user in the database. It is
//! not idempotent: running it twice fails on the first duplicate email.

use crate::auth::AuthService;
use crate::config::parse_var;
use crate::models::post::CreatePostRequest;
use crate::models::user::CreateUserRequest;
use crate::services::{PostService, UserService};
use crate::{AppError, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use std::env;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct SeedConfig {
    pub user_count: usize,
    pub post_count: usize,
    pub password: String,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            user_count: 10,
            post_count: 100,
            password: "Password123".to_string(),
        }
    }
}

impl SeedConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            user_count: parse_var("SEED_USERS").unwrap_or(defaults.user_count),
            post_count: parse_var("SEED_POSTS").unwrap_or(defaults.post_count),
            password: env::var("SEED_PASSWORD").unwrap_or(defaults.password),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub users_created: usize,
    pub posts_created: usize,
}

pub struct SeedService {
    user_service: Arc<UserService>,
    post_service: Arc<PostService>,
    auth_service: Arc<AuthService>,
}

impl SeedService {
    pub fn new(
        user_service: Arc<UserService>,
        post_service: Arc<PostService>,
        auth_service: Arc<AuthService>,
    ) -> Self {
        Self { user_service, post_service, auth_service }
    }

    pub fn user_email(index: usize) -> String {
        format!("email_{}@mail.com", index)
    }

    /// Runs the seed; the first failure aborts and is returned as is.
    pub async fn run<R: Rng + ?Sized>(&self, config: &SeedConfig, rng: &mut R) -> Result<SeedReport> {
        for i in 0..config.user_count {
            self.user_service.create_user(CreateUserRequest {
                email: Self::user_email(i),
                password: config.password.clone(),
                password_confirmation: config.password.clone(),
            }, &self.auth_service).await?;

            tracing::info!("User {} created", i);
        }

        let users = self.user_service.list_users().await?;

        for i in 0..config.post_count {
            let owner = users.choose(rng)
                .ok_or_else(|| AppError::ValidationError("User must exist".to_string()))?;

            self.post_service.create_post(CreatePostRequest {
                title: format!("Post title: {}", i),
                content: format!("Post content: {}", i),
            }, owner.id).await?;

            tracing::info!("Post {} created", i);
        }

        Ok(SeedReport {
            users_created: config.user_count,
            posts_created: config.post_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_from_env_ignore_surrounding_whitespace() {
        env::set_var("SEED_USERS", " 5 ");
        env::set_var("SEED_POSTS", "not a number");
        let config = SeedConfig::from_env();
        env::remove_var("SEED_USERS");
        env::remove_var("SEED_POSTS");

        assert_eq!(config.user_count, 5);
        assert_eq!(config.post_count, 100);
    }
}
