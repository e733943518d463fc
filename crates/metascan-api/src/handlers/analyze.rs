use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::extract_multipart_file;
use axum::{
    extract::{Multipart, State},
    Json,
};
use metascan_core::{AnalysisReport, AppError};
use metascan_services::SourceFile;
use std::sync::Arc;
use std::time::Duration;

#[utoipa::path(
    post,
    path = "/upload",
    tag = "analysis",
    request_body(content = String, description = "Image file (multipart field `file`)", content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Privacy analysis report", content_type = "application/json"),
        (status = 400, description = "No file or unsupported file type", body = ErrorResponse),
        (status = 413, description = "File larger than the upload limit", body = ErrorResponse),
        (status = 504, description = "Analysis did not finish in time", body = ErrorResponse)
    )
)]
pub async fn analyze_image(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<AnalysisReport>, HttpAppError> {
    let (data, filename, content_type) = extract_multipart_file(multipart).await?;

    state
        .validator
        .validate_all(&filename, &content_type, data.len())?;

    tracing::debug!(
        filename = %filename,
        content_type = %content_type,
        size = data.len(),
        "Upload accepted for analysis"
    );

    let seconds = state.config.analysis_timeout_secs();
    let source = SourceFile::new(data, filename, content_type);
    let report = tokio::time::timeout(
        Duration::from_secs(seconds),
        state.pipeline.analyze(source),
    )
    .await
    .map_err(|_| AppError::AnalysisTimeout { seconds })?;

    Ok(Json(report))
}
