use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::extract_multipart_file;
use axum::{
    extract::{Multipart, State},
    Json,
};
use metascan_core::CleanOutcome;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct CleanResponse {
    pub success: bool,
    /// Opaque token accepted by `GET /download/{token}`
    pub download_token: String,
    pub download_url: String,
    pub download_filename: String,
    /// Original size minus cleaned size, in bytes
    pub size_reduction: i64,
}

impl From<CleanOutcome> for CleanResponse {
    fn from(outcome: CleanOutcome) -> Self {
        Self {
            download_url: format!("/download/{}", outcome.download_token),
            success: outcome.success,
            download_token: outcome.download_token,
            download_filename: outcome.download_filename,
            size_reduction: outcome.size_reduction,
        }
    }
}

#[utoipa::path(
    post,
    path = "/remove_metadata",
    tag = "clean",
    request_body(content = String, description = "Image file (multipart field `file`)", content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Metadata removed; cleaned file is downloadable for a limited time", body = CleanResponse),
        (status = 400, description = "No file or unsupported file type", body = ErrorResponse),
        (status = 413, description = "File larger than the upload limit", body = ErrorResponse),
        (status = 422, description = "Image could not be rewritten", body = ErrorResponse)
    )
)]
pub async fn remove_metadata(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<CleanResponse>, HttpAppError> {
    let (data, filename, content_type) = extract_multipart_file(multipart).await?;

    state
        .validator
        .validate_all(&filename, &content_type, data.len())?;

    let outcome = state.clean_service.clean(data, &filename).await?;

    Ok(Json(outcome.into()))
}
