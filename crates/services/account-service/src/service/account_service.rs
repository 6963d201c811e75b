//! Account service - registration, password changes and login checks.
//!
//! Hashing is CPU-bound, so every encode/verify runs on the blocking pool to
//! keep the async runtime responsive.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use common::{AppError, AppResult};
use domain::{NewUser, PasswordEncoder, UserRecord};

/// Account service trait for dependency injection.
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Validate the input, check password strength and build a record with
    /// a hashed credential. Nothing is persisted.
    async fn register(&self, input: NewUser) -> AppResult<UserRecord>;

    /// Replace the user's password. The record is untouched on failure.
    async fn change_password(&self, user: &mut UserRecord, raw: &str) -> AppResult<()>;

    /// Check a login attempt. Fails for wrong passwords and disabled accounts.
    async fn authenticate(&self, user: &UserRecord, raw: &str) -> AppResult<()>;
}

/// Concrete implementation of AccountService using a password encoder.
pub struct AccountManager {
    encoder: Arc<dyn PasswordEncoder>,
}

impl AccountManager {
    /// Create new account service instance with encoder
    pub fn new(encoder: Arc<dyn PasswordEncoder>) -> Self {
        Self { encoder }
    }

    async fn blocking<F, T>(&self, f: F) -> AppResult<T>
    where
        F: FnOnce(&dyn PasswordEncoder) -> T + Send + 'static,
        T: Send + 'static,
    {
        let encoder = Arc::clone(&self.encoder);
        tokio::task::spawn_blocking(move || f(encoder.as_ref()))
            .await
            .map_err(|e| AppError::internal(format!("Task join error: {}", e)))
    }
}

#[async_trait]
impl AccountService for AccountManager {
    async fn register(&self, input: NewUser) -> AppResult<UserRecord> {
        let username = input.username.clone();
        let record = self
            .blocking(move |encoder| input.into_record(encoder))
            .await??;

        info!(username = %username, "Registered user");
        Ok(record)
    }

    async fn change_password(&self, user: &mut UserRecord, raw: &str) -> AppResult<()> {
        let mut updated = user.clone();
        let raw = raw.to_string();
        let updated = self
            .blocking(move |encoder| updated.set_password_encoded(&raw, encoder).map(|_| updated))
            .await??;

        *user = updated;
        info!(username = %user.username, "Password changed");
        Ok(())
    }

    async fn authenticate(&self, user: &UserRecord, raw: &str) -> AppResult<()> {
        let candidate = user.clone();
        let raw = raw.to_string();
        let verified = self
            .blocking(move |encoder| candidate.verify_password(&raw, encoder))
            .await?;

        if !verified {
            warn!(username = %user.username, "Failed login attempt");
            return Err(AppError::InvalidCredentials);
        }

        if !user.is_active {
            warn!(username = %user.username, "Login attempt on inactive account");
            return Err(AppError::Inactive);
        }

        Ok(())
    }
}
