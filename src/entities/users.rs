use serde::{Deserialize, Serialize};
use std::fmt;

/// Account role. Closed set: anything else in the user file is a parse error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    StandardUser,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::StandardUser => "standard_user",
        }
    }

    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the user file, keyed by username in the surrounding map.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    /// Argon2id password hash (PHC string)
    pub password_hash: String,

    pub role: Role,

    pub active: bool,

    pub created_at: String,

    pub updated_at: String,
}

impl Model {
    #[must_use]
    pub const fn is_active_admin(&self) -> bool {
        self.active && self.role.is_admin()
    }
}
