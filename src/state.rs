use std::sync::Arc;

use anyhow::Context;

use crate::config::Config;
use crate::db::{Store, UserRepository};
use crate::services::{
    AdminService, AuthService, DocumentService, FileAdminService, FileAuthService,
    FsDocumentService,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub users: UserRepository,

    pub auth_service: Arc<dyn AuthService>,

    pub admin_service: Arc<dyn AdminService>,

    pub document_service: Arc<dyn DocumentService>,
}

impl SharedState {
    /// Opens the user store and wires the services.
    ///
    /// Fails if the user file exists but cannot be read or parsed.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::open(&config.general.users_path)
            .await
            .context("Failed to open user store")?;

        let users = UserRepository::new(store, config.security.clone());

        let auth_service =
            Arc::new(FileAuthService::new(users.clone())) as Arc<dyn AuthService + 'static>;
        let admin_service =
            Arc::new(FileAdminService::new(users.clone())) as Arc<dyn AdminService + 'static>;
        let document_service = Arc::new(FsDocumentService::new(&config.documents))
            as Arc<dyn DocumentService + 'static>;

        Ok(Self {
            config: Arc::new(config),
            users,
            auth_service,
            admin_service,
            document_service,
        })
    }
}
