//! File-store implementation of the `AuthService` trait.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::db::UserRepository;
use crate::entities::users::{self, Role};
use crate::models::user::User;
use crate::services::auth_service::{AuthError, AuthService};

pub struct FileAuthService {
    users: UserRepository,
}

impl FileAuthService {
    #[must_use]
    pub const fn new(users: UserRepository) -> Self {
        Self { users }
    }

    fn validate_new_password(&self, password: &str) -> Result<(), AuthError> {
        if password.is_empty() {
            return Err(AuthError::Validation("Password cannot be empty".to_string()));
        }

        let min = self.users.security().min_password_length;
        if password.chars().count() < min {
            return Err(AuthError::Validation(format!(
                "Password must be at least {min} characters"
            )));
        }

        Ok(())
    }
}

fn record_auth_event(event: &'static str, outcome: &'static str) {
    metrics::counter!("auth_events_total", "event" => event, "outcome" => outcome).increment(1);
}

#[async_trait]
impl AuthService for FileAuthService {
    async fn register(&self, username: &str, password: &str) -> Result<User, AuthError> {
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::Validation(
                "Username and password cannot be empty".to_string(),
            ));
        }
        self.validate_new_password(password)?;

        // Fail fast before paying for the hash; re-checked under the lock.
        if self.users.get_model(username).await?.is_some() {
            record_auth_event("register", "duplicate");
            return Err(AuthError::DuplicateUser(username.to_string()));
        }

        let password_hash = self.users.hash_password(password).await?;
        let now = chrono::Utc::now().to_rfc3339();

        let user = self
            .users
            .store()
            .update(|users| {
                if users.contains_key(username) {
                    return Err(AuthError::DuplicateUser(username.to_string()));
                }

                let role = if users.is_empty() {
                    Role::Admin
                } else {
                    Role::StandardUser
                };

                let model = users::Model {
                    password_hash,
                    role,
                    active: true,
                    created_at: now.clone(),
                    updated_at: now,
                };
                let user = User::from_model(username, &model);
                users.insert(username.to_string(), model);
                Ok(user)
            })
            .await
            .inspect_err(|e| {
                if matches!(e, AuthError::DuplicateUser(_)) {
                    record_auth_event("register", "duplicate");
                }
            })?;

        record_auth_event("register", "success");
        info!(username = %user.username, role = %user.role, "User registered");
        Ok(user)
    }

    async fn authenticate(&self, username: &str, password: &str) -> Result<User, AuthError> {
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::Validation(
                "Username and password cannot be empty".to_string(),
            ));
        }

        let Some(model) = self.users.get_model(username).await? else {
            record_auth_event("login", "failure");
            warn!(username, "Login failed: unknown user");
            return Err(AuthError::InvalidCredentials);
        };

        let is_valid = self
            .users
            .verify_hash(password, &model.password_hash)
            .await?;

        if !is_valid {
            record_auth_event("login", "failure");
            warn!(username, "Login failed: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        if !model.active {
            record_auth_event("login", "inactive");
            warn!(username, "Login failed: account deactivated");
            return Err(AuthError::InvalidCredentials);
        }

        record_auth_event("login", "success");
        Ok(User::from_model(username, &model))
    }

    async fn change_password(
        &self,
        username: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        self.validate_new_password(new_password)?;

        if old_password == new_password {
            return Err(AuthError::Validation(
                "New password must be different from current password".to_string(),
            ));
        }

        let model = self
            .users
            .get_model(username)
            .await?
            .filter(|m| m.active)
            .ok_or(AuthError::InvalidCredentials)?;

        let is_valid = self
            .users
            .verify_hash(old_password, &model.password_hash)
            .await?;

        if !is_valid {
            record_auth_event("change_password", "failure");
            return Err(AuthError::InvalidCredentials);
        }

        let new_hash = self.users.hash_password(new_password).await?;
        let now = chrono::Utc::now().to_rfc3339();

        self.users
            .store()
            .update(|users| {
                let record = users
                    .get_mut(username)
                    .ok_or(AuthError::InvalidCredentials)?;

                // Changed or replaced since we verified: make the caller retry.
                if record.password_hash != model.password_hash {
                    return Err(AuthError::InvalidCredentials);
                }

                record.password_hash = new_hash;
                record.updated_at = now;
                Ok(())
            })
            .await?;

        record_auth_event("change_password", "success");
        info!(username, "Password changed");
        Ok(())
    }

    async fn get_user(&self, username: &str) -> Result<User, AuthError> {
        self.users
            .get_by_username(username)
            .await?
            .ok_or_else(|| AuthError::NotFound(username.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SecurityConfig;
    use crate::db::Store;

    fn service() -> (FileAuthService, Store) {
        service_with_min_length(1)
    }

    fn service_with_min_length(min_password_length: usize) -> (FileAuthService, Store) {
        let path = std::env::temp_dir()
            .join(format!("insight-auth-test-{}", uuid::Uuid::new_v4()))
            .join("users.toml");
        let store = Store::new(path);
        let security = SecurityConfig {
            argon2_memory_cost_kib: 64,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
            min_password_length,
        };
        let repo = UserRepository::new(store.clone(), security);
        (FileAuthService::new(repo), store)
    }

    #[tokio::test]
    async fn test_first_user_is_admin_rest_are_standard() {
        let (auth, _) = service();

        let alice = auth.register("alice", "pw1").await.unwrap();
        assert_eq!(alice.role, Role::Admin);
        assert!(alice.active);

        let bob = auth.register("bob", "pw2").await.unwrap();
        assert_eq!(bob.role, Role::StandardUser);

        let carol = auth.register("carol", "pw3").await.unwrap();
        assert_eq!(carol.role, Role::StandardUser);
    }

    #[tokio::test]
    async fn test_duplicate_registration_leaves_store_unchanged() {
        let (auth, store) = service();
        auth.register("alice", "pw1").await.unwrap();
        let before = tokio::fs::read(store.path()).await.unwrap();

        let err = auth.register("alice", "other").await.unwrap_err();
        assert!(matches!(err, AuthError::DuplicateUser(name) if name == "alice"));

        let after = tokio::fs::read(store.path()).await.unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_usernames_are_case_sensitive() {
        let (auth, _) = service();
        auth.register("alice", "pw1").await.unwrap();
        let upper = auth.register("Alice", "pw1").await.unwrap();
        assert_eq!(upper.role, Role::StandardUser);
    }

    #[tokio::test]
    async fn test_register_rejects_empty_input() {
        let (auth, store) = service();
        assert!(matches!(
            auth.register("", "pw").await,
            Err(AuthError::Validation(_))
        ));
        assert!(matches!(
            auth.register("alice", "").await,
            Err(AuthError::Validation(_))
        ));
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_authenticate() {
        let (auth, _) = service();
        auth.register("alice", "pw1").await.unwrap();

        let user = auth.authenticate("alice", "pw1").await.unwrap();
        assert_eq!(user.username, "alice");

        assert!(matches!(
            auth.authenticate("alice", "wrong").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.authenticate("nobody", "pw1").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_authenticate_rejects_inactive_account() {
        let (auth, store) = service();
        auth.register("alice", "pw1").await.unwrap();
        auth.register("bob", "pw2").await.unwrap();

        store
            .update(|users| {
                users.get_mut("bob").unwrap().active = false;
                Ok::<_, AuthError>(())
            })
            .await
            .unwrap();

        assert!(matches!(
            auth.authenticate("bob", "pw2").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_change_password() {
        let (auth, _) = service();
        auth.register("alice", "pw1").await.unwrap();

        assert!(matches!(
            auth.change_password("alice", "wrong", "pw9").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.change_password("alice", "pw1", "pw1").await,
            Err(AuthError::Validation(_))
        ));

        auth.change_password("alice", "pw1", "pw9").await.unwrap();
        assert!(auth.authenticate("alice", "pw1").await.is_err());
        assert!(auth.authenticate("alice", "pw9").await.is_ok());
    }

    #[tokio::test]
    async fn test_minimum_password_length() {
        let (auth, store) = service_with_min_length(8);

        let err = auth.register("alice", "short").await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(msg) if msg.contains('8')));
        assert!(store.load().await.unwrap().is_empty());

        // Counted in characters, not bytes.
        assert!(matches!(
            auth.register("alice", "ééééééé").await,
            Err(AuthError::Validation(_))
        ));

        auth.register("alice", "longenough").await.unwrap();
        assert!(matches!(
            auth.change_password("alice", "longenough", "tiny").await,
            Err(AuthError::Validation(_))
        ));
        auth.authenticate("alice", "longenough").await.unwrap();
    }

    #[tokio::test]
    async fn test_change_password_rejects_inactive_account() {
        let (auth, store) = service();
        auth.register("alice", "pw1").await.unwrap();
        auth.register("bob", "pw2").await.unwrap();

        store
            .update(|users| {
                users.get_mut("bob").unwrap().active = false;
                Ok::<_, AuthError>(())
            })
            .await
            .unwrap();
        let before = store.load().await.unwrap()["bob"].clone();

        assert!(matches!(
            auth.change_password("bob", "pw2", "pw9").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert_eq!(store.load().await.unwrap()["bob"], before);
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let (auth, _) = service();
        assert!(matches!(
            auth.get_user("ghost").await,
            Err(AuthError::NotFound(_))
        ));
    }
}
