// Password hashing for user accounts
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, Params,
};
use rand_core::OsRng;
use crate::{AppError, Result};

pub struct AuthService {
    hasher: Argon2<'static>,
}

impl Default for AuthService {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthService {
    pub fn new() -> Self {
        Self { hasher: Argon2::default() }
    }

    /// Argon2id with explicit cost parameters, e.g. a cheap cost for tests.
    pub fn with_params(params: Params) -> Self {
        Self {
            hasher: Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params),
        }
    }

    /// Returns a PHC string embedding algorithm, cost, and a random salt.
    pub fn hash_password(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.hasher
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::InternalError(format!("Failed to hash password: {}", e)))
    }

    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| AppError::InternalError(format!("Stored password hash is invalid: {}", e)))?;

        Ok(self.hasher.verify_password(password.as_bytes(), &parsed).is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> AuthService {
        AuthService::with_params(Params::new(8, 1, 1, None).unwrap())
    }

    #[test]
    fn test_hash_and_verify() {
        let auth = cheap();
        let hash = auth.hash_password("Password123").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(auth.verify_password("Password123", &hash).unwrap());
        assert!(!auth.verify_password("password123", &hash).unwrap());
    }

    #[test]
    fn test_salts_differ() {
        let auth = cheap();
        let first = auth.hash_password("Password123").unwrap();
        let second = auth.hash_password("Password123").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_garbage_hash_is_an_error() {
        assert!(cheap().verify_password("Password123", "not-a-hash").is_err());
    }
}
