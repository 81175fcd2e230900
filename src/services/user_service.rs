use crate::auth::AuthService;
use crate::db::repository::UserRepository;
use crate::models::User;
use crate::models::user::{CreateUserRequest, UserResponse};
use crate::{AppError, Result};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

const MIN_PASSWORD_LENGTH: usize = 6;
const MAX_PASSWORD_LENGTH: usize = 128;

pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(user_repo: Arc<dyn UserRepository>) -> Self {
        Self { user_repo }
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<Option<UserResponse>> {
        Ok(self.user_repo.get_user_by_id(user_id).await?.map(UserResponse::from))
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.user_repo.list_users().await
    }

    pub async fn count_users(&self) -> Result<u64> {
        self.user_repo.count_users().await
    }

    pub async fn create_user(&self, request: CreateUserRequest, auth_service: &AuthService) -> Result<UserResponse> {
        let email = request.email.trim().to_string();
        Self::validate(&email, &request)?;

        if self.user_repo.get_user_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("Email has already been taken".to_string()));
        }

        // Hash the password before storing
        let password_hash = auth_service.hash_password(&request.password)?;
        let now = Utc::now();

        let user = User {
            id: Uuid::new_v4(),
            email,
            password_hash,
            created_at: now,
            updated_at: now,
        };

        let created_user = self.user_repo.create_user(&user).await?;
        Ok(UserResponse::from(created_user))
    }

    fn validate(email: &str, request: &CreateUserRequest) -> Result<()> {
        let well_formed = email
            .split_once('@')
            .map(|(local, domain)| !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.'))
            .unwrap_or(false);
        if !well_formed || email.chars().any(char::is_whitespace) {
            return Err(AppError::ValidationError("Email is invalid".to_string()));
        }

        let length = request.password.chars().count();
        if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&length) {
            return Err(AppError::ValidationError(format!(
                "Password must be between {} and {} characters", MIN_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH
            )));
        }

        if request.password != request.password_confirmation {
            return Err(AppError::ValidationError("Password confirmation doesn't match Password".to_string()));
        }

        Ok(())
    }
}
