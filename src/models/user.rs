use serde::{Deserialize, Serialize};

use crate::entities::users::{self, Role};

/// A user record without secret material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub role: Role,
    pub active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    #[must_use]
    pub fn from_model(username: &str, model: &users::Model) -> Self {
        Self {
            username: username.to_string(),
            role: model.role,
            active: model.active,
            created_at: model.created_at.clone(),
            updated_at: model.updated_at.clone(),
        }
    }

    #[must_use]
    pub fn current(&self) -> CurrentUser {
        CurrentUser {
            username: self.username.clone(),
            role: self.role,
        }
    }
}

/// The authenticated caller of an operation.
///
/// Handlers receive this from the auth middleware and pass it explicitly to
/// the services; nothing reads the session directly below the API layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub username: String,
    pub role: Role,
}

impl CurrentUser {
    /// Admin context for offline maintenance from the command line. The empty
    /// username can never belong to a registered account.
    #[must_use]
    pub const fn system() -> Self {
        Self {
            username: String::new(),
            role: Role::Admin,
        }
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
