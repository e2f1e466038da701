//! File-store implementation of the `AdminService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::db::{UserMap, UserRepository};
use crate::models::user::{CurrentUser, User};
use crate::services::admin_service::{AdminError, AdminService};

pub struct FileAdminService {
    users: UserRepository,
}

impl FileAdminService {
    #[must_use]
    pub const fn new(users: UserRepository) -> Self {
        Self { users }
    }
}

fn require_admin(caller: &CurrentUser) -> Result<(), AdminError> {
    if caller.is_admin() {
        Ok(())
    } else {
        Err(AdminError::Forbidden)
    }
}

fn active_admin_count(users: &UserMap) -> usize {
    users.values().filter(|m| m.is_active_admin()).count()
}

/// Whether removing `username` from the active admins would leave none.
fn is_last_active_admin(users: &UserMap, username: &str) -> bool {
    users
        .get(username)
        .is_some_and(|m| m.is_active_admin() && active_admin_count(users) == 1)
}

#[async_trait]
impl AdminService for FileAdminService {
    async fn list_users(&self, caller: &CurrentUser) -> Result<Vec<User>, AdminError> {
        require_admin(caller)?;
        Ok(self.users.list().await?)
    }

    async fn set_active(
        &self,
        caller: &CurrentUser,
        username: &str,
        active: bool,
    ) -> Result<User, AdminError> {
        require_admin(caller)?;

        let now = chrono::Utc::now().to_rfc3339();
        let user = self
            .users
            .store()
            .update(|users| {
                if !active && is_last_active_admin(users, username) {
                    return Err(AdminError::LastAdminViolation(username.to_string()));
                }

                let record = users
                    .get_mut(username)
                    .ok_or_else(|| AdminError::NotFound(username.to_string()))?;

                if record.active != active {
                    record.active = active;
                    record.updated_at = now;
                }
                Ok(User::from_model(username, record))
            })
            .await?;

        info!(
            target_user = username,
            active,
            by = %caller.username,
            "Account status updated"
        );
        Ok(user)
    }

    async fn delete_user(&self, caller: &CurrentUser, username: &str) -> Result<(), AdminError> {
        require_admin(caller)?;

        if caller.username == username {
            return Err(AdminError::SelfDeleteViolation);
        }

        self.users
            .store()
            .update(|users| {
                if !users.contains_key(username) {
                    return Err(AdminError::NotFound(username.to_string()));
                }
                if is_last_active_admin(users, username) {
                    return Err(AdminError::LastAdminViolation(username.to_string()));
                }
                users.remove(username);
                Ok(())
            })
            .await?;

        info!(target_user = username, by = %caller.username, "User deleted");
        Ok(())
    }
}
