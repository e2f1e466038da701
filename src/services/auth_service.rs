//! Domain service for authentication and self-service account operations.
//!
//! Handles registration, login credential checks and password changes.

use thiserror::Error;

use crate::db::StoreError;
use crate::models::user::User;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Username '{0}' already exists")]
    DuplicateUser(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        Self::Store(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates a new active account.
    ///
    /// The first account in an empty store becomes the admin; every later
    /// account is a standard user.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::DuplicateUser`] if the username is taken and
    /// [`AuthError::Validation`] for empty or too-short input.
    async fn register(&self, username: &str, password: &str) -> Result<User, AuthError>;

    /// Verifies credentials and returns the user.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown username, a
    /// deactivated account, or a wrong password.
    async fn authenticate(&self, username: &str, password: &str) -> Result<User, AuthError>;

    /// Changes a user's password after checking the old one.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] if the old password does not
    /// verify and [`AuthError::Validation`] if the new password is rejected.
    async fn change_password(
        &self,
        username: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError>;

    /// Gets a user by name.
    async fn get_user(&self, username: &str) -> Result<User, AuthError>;
}
