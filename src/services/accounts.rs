//! Account registration, login and lookup.
//!
//! Username uniqueness is a read-then-write check: two concurrent
//! registrations of the same name can both pass `validate` and both be stored.
//! The store carries no unique constraint to catch that.

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::AppError;
use crate::repos::{UserRepo, UserRow};
use crate::services::auth::{
    TokenCodec,
    password::{hash_password, verify_password},
};

pub const USERNAME_MIN: usize = 4;
pub const USERNAME_MAX: usize = 20;
pub const PASSWORD_MIN: usize = 6;
pub const PASSWORD_MAX: usize = 30;

/// Registration / login input. Plaintext only lives as long as the request.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Clone)]
pub struct AccountService {
    repo: Arc<dyn UserRepo>,
    tokens: Arc<TokenCodec>,
    bcrypt_cost: u32,
}

impl std::fmt::Debug for AccountService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountService")
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

impl AccountService {
    pub fn new(repo: Arc<dyn UserRepo>, tokens: Arc<TokenCodec>, bcrypt_cost: u32) -> Self {
        Self {
            repo,
            tokens,
            bcrypt_cost,
        }
    }

    /// Length bounds (in characters) and username availability.
    pub async fn validate(&self, candidate: &Credentials) -> Result<(), AppError> {
        let username_len = candidate.username.chars().count();
        if !(USERNAME_MIN..=USERNAME_MAX).contains(&username_len) {
            return Err(AppError::validation(format!(
                "username is required ({USERNAME_MIN} <= length <= {USERNAME_MAX})"
            )));
        }

        let password_len = candidate.password.chars().count();
        if !(PASSWORD_MIN..=PASSWORD_MAX).contains(&password_len) {
            return Err(AppError::validation(format!(
                "password is required ({PASSWORD_MIN} <= length <= {PASSWORD_MAX})"
            )));
        }

        // A storage fault here is not a validation problem; it bubbles up as Internal.
        if self
            .repo
            .find_by_username(&candidate.username)
            .await?
            .is_some()
        {
            return Err(AppError::validation("username is already in use"));
        }

        Ok(())
    }

    pub async fn create(&self, candidate: Credentials) -> Result<UserRow, AppError> {
        self.validate(&candidate).await?;

        let password_hash = hash_password(&candidate.password, self.bcrypt_cost)?;
        let row = self
            .repo
            .insert(&candidate.username, &password_hash)
            .await?;

        info!(user_id = row.id, "account created");
        Ok(row)
    }

    /// Returns a freshly issued access token on success.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, AppError> {
        let Some(account) = self.repo.find_by_username(username).await? else {
            debug!("login for unknown username");
            return Err(AppError::validation("username not found"));
        };

        if !verify_password(password, &account.password_hash)? {
            debug!(user_id = account.id, "login with wrong password");
            return Err(AppError::validation("invalid credentials"));
        }

        self.tokens.issue(account.id)
    }

    /// Stored record, hash included. Callers project it before serializing.
    pub async fn get(&self, user_id: i64) -> Result<UserRow, AppError> {
        self.repo
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::not_found("user"))
    }

    pub fn token_ttl_seconds(&self) -> u64 {
        self.tokens.ttl_seconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::MemoryUserRepo;

    fn service() -> (AccountService, Arc<TokenCodec>) {
        let tokens = Arc::new(TokenCodec::new(b"accounts-test", 3600, 0));
        let svc = AccountService::new(Arc::new(MemoryUserRepo::new()), tokens.clone(), 4);
        (svc, tokens)
    }

    fn creds(username: &str, password: &str) -> Credentials {
        Credentials {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn create_stores_hash_not_plaintext() {
        let (svc, _) = service();
        let row = svc.create(creds("tum0xa", "secret123")).await.unwrap();

        assert_eq!(row.username, "tum0xa");
        assert_ne!(row.password_hash, "secret123");
        assert!(verify_password("secret123", &row.password_hash).unwrap());
    }

    #[tokio::test]
    async fn length_bounds_are_enforced() {
        let (svc, _) = service();
        let cases = vec![
            creds("abc", "secret123"),
            creds(&"u".repeat(21), "secret123"),
            creds("valid_user", "12345"),
            creds("valid_user", &"p".repeat(31)),
        ];

        for c in cases {
            assert!(matches!(
                svc.create(c).await,
                Err(AppError::Validation(_))
            ));
        }

        assert!(svc.create(creds("abcd", "123456")).await.is_ok());
        assert!(svc.create(creds(&"u".repeat(20), &"p".repeat(30))).await.is_ok());
    }

    #[tokio::test]
    async fn username_length_counts_characters() {
        let (svc, _) = service();
        // 4 characters, 12 bytes
        assert!(svc.create(creds("ユーザー", "secret123")).await.is_ok());
    }

    #[tokio::test]
    async fn duplicate_username_is_a_validation_error() {
        let (svc, _) = service();
        svc.create(creds("tum0xa", "secret123")).await.unwrap();

        let err = svc.create(creds("tum0xa", "other-pass")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(m) if m.contains("already in use")));
    }

    #[tokio::test]
    async fn login_returns_token_for_the_account() {
        let (svc, tokens) = service();
        let row = svc.create(creds("tum0xa", "secret123")).await.unwrap();

        let token = svc.login("tum0xa", "secret123").await.unwrap();
        assert_eq!(tokens.verify(&token), Ok(row.id));
    }

    #[tokio::test]
    async fn login_failures_are_validation_errors() {
        let (svc, _) = service();
        svc.create(creds("tum0xa", "secret123")).await.unwrap();

        let wrong_password = svc.login("tum0xa", "secret124").await.unwrap_err();
        assert!(matches!(wrong_password, AppError::Validation(m) if m == "invalid credentials"));

        let unknown = svc.login("nobody", "secret123").await.unwrap_err();
        assert!(matches!(unknown, AppError::Validation(m) if m == "username not found"));
    }

    #[tokio::test]
    async fn get_missing_user_is_not_found() {
        let (svc, _) = service();
        assert!(matches!(
            svc.get(99).await,
            Err(AppError::NotFound { resource: "user" })
        ));
    }
}
