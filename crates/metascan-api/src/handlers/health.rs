//! Liveness check. Never touches the pipeline or the artifact store.

use crate::state::AppState;
use axum::{extract::State, Json};
use metascan_core::constants::APP_VERSION;
use metascan_services::CapabilityReport;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Which optional analysis capabilities are live
    #[schema(value_type = Object)]
    pub features: CapabilityReport,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Process is up", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: APP_VERSION.to_string(),
        features: state.pipeline.capabilities().availability(),
    })
}
