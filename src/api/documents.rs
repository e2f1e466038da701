use axum::{
    Extension, Json,
    extract::{Multipart, Path, State},
};
use serde::Serialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::models::document::{IndexedDocument, StoredDocument};
use crate::models::user::CurrentUser;
use crate::services::DocumentError;

#[derive(Serialize)]
pub struct SummaryResponse {
    pub stem: String,
    pub summary: String,
}

impl From<DocumentError> for ApiError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::Validation(msg) => Self::ValidationError(msg),
            DocumentError::NotFound(_) => Self::NotFound(err.to_string()),
            DocumentError::Io(e) => Self::internal(format!("Document storage error: {e}")),
        }
    }
}

/// GET /documents
/// Documents with a built index, available for QA.
pub async fn list_documents(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<IndexedDocument>>>, ApiError> {
    let documents = state.document_service().list_documents().await?;
    Ok(Json(ApiResponse::success(documents)))
}

/// POST /documents
/// Multipart upload, one or more files. Admin only; one rejected name
/// rejects the whole batch.
pub async fn upload_documents(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CurrentUser>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<Vec<StoredDocument>>>, ApiError> {
    if !caller.is_admin() {
        return Err(ApiError::admin_required());
    }

    // Read and check the whole batch first so a rejected file leaves
    // nothing behind.
    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Invalid multipart body: {e}")))?
    {
        let Some(file_name) = field.file_name().map(ToString::to_string) else {
            continue;
        };

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::validation(format!("Failed to read '{file_name}': {e}")))?;

        files.push((file_name, bytes));
    }

    let documents = state.document_service();
    for (file_name, _) in &files {
        documents.check_upload(file_name)?;
    }

    let mut stored = Vec::with_capacity(files.len());
    for (file_name, bytes) in &files {
        stored.push(documents.save_upload(file_name, bytes).await?);
    }

    if stored.is_empty() {
        return Err(ApiError::validation("No files in upload"));
    }

    tracing::info!(
        count = stored.len(),
        by = %caller.username,
        "Documents uploaded"
    );

    Ok(Json(ApiResponse::success(stored)))
}

/// GET /documents/{stem}/summary
pub async fn get_summary(
    State(state): State<Arc<AppState>>,
    Path(stem): Path<String>,
) -> Result<Json<ApiResponse<SummaryResponse>>, ApiError> {
    let summary = state.document_service().read_summary(&stem).await?;
    Ok(Json(ApiResponse::success(SummaryResponse { stem, summary })))
}
