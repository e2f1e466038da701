use axum::{
    Extension, Json,
    extract::{Request, State},
    middleware::Next,
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState, MessageResponse};
use crate::models::user::{CurrentUser, User};
use crate::services::AuthError;

/// Session key holding the logged-in username.
pub const SESSION_USER_KEY: &str = "user";

/// Session key holding the account's `updated_at` as of login. A password
/// change or status toggle moves it, which ends every older session.
pub const SESSION_STAMP_KEY: &str = "stamp";

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::DuplicateUser(_) => Self::Conflict(err.to_string()),
            AuthError::InvalidCredentials => Self::Unauthorized(err.to_string()),
            AuthError::NotFound(_) => Self::NotFound(err.to_string()),
            AuthError::Validation(msg) => Self::ValidationError(msg),
            AuthError::Store(msg) | AuthError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Resolves the session to a live, active account and attaches it to the
/// request as [`CurrentUser`].
///
/// Sessions are flushed when their account was deleted, deactivated or
/// changed its password since login.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let username = get_session_username(&session).await?;
    let stamp = session
        .get::<String>(SESSION_STAMP_KEY)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?;

    let user = match state.auth_service().get_user(&username).await {
        Ok(user) if user.active && stamp.as_deref() == Some(user.updated_at.as_str()) => user,
        Ok(_) | Err(AuthError::NotFound(_)) => {
            tracing::info!(username = %username, "Dropping stale session");
            let _ = session.flush().await;
            return Err(ApiError::not_authenticated());
        }
        Err(e) => return Err(e.into()),
    };

    tracing::Span::current().record("user_id", &user.username);
    request.extensions_mut().insert(user.current());
    Ok(next.run(request).await)
}

/// Must run after [`auth_middleware`].
pub async fn admin_middleware(
    Extension(caller): Extension<CurrentUser>,
    request: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    if !caller.is_admin() {
        tracing::warn!(username = %caller.username, "Admin route denied");
        return Err(ApiError::admin_required());
    }
    Ok(next.run(request).await)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/register
/// Create an account. The first account becomes the admin.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state
        .auth_service()
        .register(&payload.username, &payload.password)
        .await?;

    Ok(Json(ApiResponse::success(user)))
}

/// POST /auth/login
/// Authenticate with username and password and start a session
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<CredentialsRequest>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state
        .auth_service()
        .authenticate(&payload.username, &payload.password)
        .await?;

    start_session(&session, &user).await?;

    tracing::info!(username = %user.username, role = %user.role, "User logged in");

    Ok(Json(ApiResponse::success(user)))
}

/// POST /auth/logout
pub async fn logout(session: Session) -> Json<ApiResponse<MessageResponse>> {
    let _ = session.flush().await;
    Json(ApiResponse::success(MessageResponse::new("Logged out")))
}

/// GET /auth/me
pub async fn get_current_user(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state.auth_service().get_user(&caller.username).await?;
    Ok(Json(ApiResponse::success(user)))
}

/// PUT /auth/password
/// Change password (requires current password verification).
/// Other sessions of the account end; this one continues under a new id.
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CurrentUser>,
    session: Session,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .auth_service()
        .change_password(
            &caller.username,
            &payload.current_password,
            &payload.new_password,
        )
        .await?;

    let user = state.auth_service().get_user(&caller.username).await?;
    start_session(&session, &user).await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Password updated successfully",
    ))))
}

// ============================================================================
// Helpers
// ============================================================================

async fn start_session(session: &Session, user: &User) -> Result<(), ApiError> {
    // New id on every credential change.
    session
        .cycle_id()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to rotate session: {e}")))?;

    session
        .insert(SESSION_USER_KEY, &user.username)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;
    session
        .insert(SESSION_STAMP_KEY, &user.updated_at)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;

    Ok(())
}

async fn get_session_username(session: &Session) -> Result<String, ApiError> {
    session
        .get::<String>(SESSION_USER_KEY)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?
        .ok_or_else(ApiError::not_authenticated)
}
