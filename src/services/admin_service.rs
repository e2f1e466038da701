//! Domain service for account administration.
//!
//! Every operation takes the caller explicitly and refuses non-admins.
//! The store must always keep at least one active admin.

use thiserror::Error;

use crate::db::StoreError;
use crate::models::user::{CurrentUser, User};

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Admin role required")]
    Forbidden,

    #[error("User not found: {0}")]
    NotFound(String),

    #[error("'{0}' is the last active admin")]
    LastAdminViolation(String),

    #[error("Admins cannot delete their own account")]
    SelfDeleteViolation,

    #[error("Store error: {0}")]
    Store(String),
}

impl From<StoreError> for AdminError {
    fn from(err: StoreError) -> Self {
        Self::Store(err.to_string())
    }
}

#[async_trait::async_trait]
pub trait AdminService: Send + Sync {
    /// All users ordered by username.
    async fn list_users(&self, caller: &CurrentUser) -> Result<Vec<User>, AdminError>;

    /// Activates or deactivates an account.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::LastAdminViolation`] when deactivating the only
    /// active admin.
    async fn set_active(
        &self,
        caller: &CurrentUser,
        username: &str,
        active: bool,
    ) -> Result<User, AdminError>;

    /// Removes an account permanently.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::SelfDeleteViolation`] when an admin targets
    /// themselves and [`AdminError::LastAdminViolation`] when the target is
    /// the only active admin.
    async fn delete_user(&self, caller: &CurrentUser, username: &str) -> Result<(), AdminError>;
}
