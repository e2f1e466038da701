use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use tokio::task;

use crate::config::SecurityConfig;
use crate::db::{Store, StoreError, UserMap};
use crate::entities::users;
use crate::models::user::User;

/// Read-side queries and password handling on top of the raw [`Store`].
#[derive(Clone)]
pub struct UserRepository {
    store: Store,
    security: SecurityConfig,
}

impl UserRepository {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }

    #[must_use]
    pub const fn store(&self) -> &Store {
        &self.store
    }

    #[must_use]
    pub const fn security(&self) -> &SecurityConfig {
        &self.security
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let users = self.store.load().await?;
        Ok(users.get(username).map(|m| User::from_model(username, m)))
    }

    /// Get user record including the password hash
    pub async fn get_model(&self, username: &str) -> Result<Option<users::Model>, StoreError> {
        let mut users = self.store.load().await?;
        Ok(users.remove(username))
    }

    pub async fn list(&self) -> Result<Vec<User>, StoreError> {
        let users = self.store.load().await?;
        Ok(to_views(&users))
    }

    pub async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.store.load().await?.len())
    }

    /// Hash a password with the configured Argon2 params.
    /// Runs on the blocking pool; Argon2 is deliberately slow.
    pub async fn hash_password(&self, password: &str) -> Result<String> {
        let password = password.to_string();
        let config = self.security.clone();
        task::spawn_blocking(move || hash_password(&password, Some(&config)))
            .await
            .context("Password hashing task panicked")?
    }

    /// Check `password` against a stored PHC hash.
    pub async fn verify_hash(&self, password: &str, password_hash: &str) -> Result<bool> {
        let password = password.to_string();
        let password_hash = password_hash.to_string();

        task::spawn_blocking(move || verify_password(&password, &password_hash))
            .await
            .context("Password verification task panicked")?
    }
}

#[must_use]
pub fn to_views(users: &UserMap) -> Vec<User> {
    users
        .iter()
        .map(|(name, model)| User::from_model(name, model))
        .collect()
}

/// Hash a password using Argon2id with optional custom params.
/// If config is None, uses the crate's default params.
pub fn hash_password(password: &str, config: Option<&SecurityConfig>) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = if let Some(cfg) = config {
        let params = Params::new(
            cfg.argon2_memory_cost_kib,
            cfg.argon2_time_cost,
            cfg.argon2_parallelism,
            None,
        )
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    } else {
        Argon2::default()
    };

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// The PHC string carries its own params, so the default instance verifies
/// hashes produced with any configuration.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
