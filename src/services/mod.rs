pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService};
pub use auth_service_impl::FileAuthService;

pub mod admin_service;
pub mod admin_service_impl;
pub use admin_service::{AdminError, AdminService};
pub use admin_service_impl::FileAdminService;

pub mod document_service;
pub use document_service::{DocumentError, DocumentService, FsDocumentService};
