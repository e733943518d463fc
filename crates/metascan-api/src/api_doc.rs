//! OpenAPI documentation, served at `/api/openapi.json`.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "MetaScan API",
        version = "0.1.0",
        description = "Image privacy analysis: EXIF and GPS metadata, QR codes, steganography and script-injection signals, aggregated into a privacy score. Cleaned copies with metadata removed are downloadable for a short time."
    ),
    paths(
        handlers::analyze::analyze_image,
        handlers::clean::remove_metadata,
        handlers::download::download_artifact,
        handlers::health::health_check,
        handlers::info::api_info,
    ),
    components(schemas(
        error::ErrorResponse,
        handlers::clean::CleanResponse,
        handlers::health::HealthResponse,
        handlers::info::InfoResponse,
    )),
    tags(
        (name = "analysis", description = "Privacy analysis of uploaded images"),
        (name = "clean", description = "Metadata removal and cleaned-file download"),
        (name = "health", description = "Liveness"),
        (name = "info", description = "Risk concept catalogue")
    )
)]
pub struct ApiDoc;
