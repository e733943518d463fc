use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use metascan_core::AppError;
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/download/{token}",
    tag = "clean",
    params(
        ("token" = String, Path, description = "Token returned by /remove_metadata")
    ),
    responses(
        (status = 200, description = "Cleaned file", content_type = "application/octet-stream"),
        (status = 404, description = "Unknown or purged token", body = ErrorResponse),
        (status = 410, description = "Link expired", body = ErrorResponse)
    )
)]
pub async fn download_artifact(
    Path(token): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let artifact = state.store.get(&token).await?;

    tracing::debug!(
        filename = %artifact.filename,
        size = artifact.bytes.len(),
        "Serving cleaned artifact"
    );

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", artifact.filename),
        )
        .header(header::CONTENT_LENGTH, artifact.bytes.len())
        .body(Body::from(artifact.bytes))
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to build response");
            HttpAppError::from(AppError::Internal(e.to_string()))
        })?;

    Ok(response)
}
