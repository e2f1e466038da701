//! Account administration endpoints. Mounted behind the admin middleware;
//! the service re-checks the caller's role on every call.

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, MessageResponse};
use crate::models::user::{CurrentUser, User};
use crate::services::AdminError;

#[derive(Deserialize)]
pub struct SetActiveRequest {
    pub active: bool,
}

impl From<AdminError> for ApiError {
    fn from(err: AdminError) -> Self {
        match err {
            AdminError::Forbidden => Self::admin_required(),
            AdminError::NotFound(_) => Self::NotFound(err.to_string()),
            AdminError::LastAdminViolation(_) | AdminError::SelfDeleteViolation => {
                Self::Conflict(err.to_string())
            }
            AdminError::Store(msg) => Self::InternalError(msg),
        }
    }
}

/// GET /admin/users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<User>>>, ApiError> {
    let users = state.admin_service().list_users(&caller).await?;
    Ok(Json(ApiResponse::success(users)))
}

/// PUT /admin/users/{username}/active
pub async fn set_active(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CurrentUser>,
    Path(username): Path<String>,
    Json(payload): Json<SetActiveRequest>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state
        .admin_service()
        .set_active(&caller, &username, payload.active)
        .await?;

    Ok(Json(ApiResponse::success(user)))
}

/// DELETE /admin/users/{username}
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CurrentUser>,
    Path(username): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .admin_service()
        .delete_user(&caller, &username)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(format!(
        "User '{username}' deleted"
    )))))
}
