//! Route configuration and setup

use crate::api_doc::ApiDoc;
use crate::error::payload_limit_as_json;
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use metascan_core::Config;
use metascan_infra::{request_id_middleware, security_headers_middleware};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

/// Room for multipart boundaries and part headers on top of the file itself,
/// so an oversize file reaches the validator and gets a JSON 413.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    // Server-level concurrency limit; every analysis holds up to one decoded image
    let http_concurrency_limit = std::env::var("HTTP_CONCURRENCY_LIMIT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(256)
        .max(1);
    tracing::info!(
        http_concurrency_limit = http_concurrency_limit,
        "HTTP concurrency limit layer enabled"
    );

    let body_limit = config
        .max_file_size_bytes()
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    let app = Router::new()
        .route("/upload", post(handlers::analyze::analyze_image))
        .route("/remove_metadata", post(handlers::clean::remove_metadata))
        .route("/download/{token}", get(handlers::download::download_artifact))
        .route("/health", get(handlers::health::health_check))
        .route("/api/info", get(handlers::info::api_info))
        .route("/api/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(axum::middleware::from_fn(payload_limit_as_json))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(axum::middleware::from_fn(security_headers_middleware))
        .with_state(state);

    Ok(app)
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = if config.cors_origins().contains(&"*".to_string()) {
        if config.is_production() {
            tracing::warn!(
                "CORS configured to allow all origins - not recommended for production"
            );
        }
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", o, e))
            })
            .collect::<Result<Vec<_>, _>>()?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    };
    Ok(cors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use metascan_core::AnalyzerConfig;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_body_limit_rejection_is_json() {
        let app: Router = Router::new()
            .route("/upload", post(|| async { "ok" }))
            .layer(RequestBodyLimitLayer::new(16))
            .layer(axum::middleware::from_fn(payload_limit_as_json));

        let request = Request::builder()
            .method("POST")
            .uri("/upload")
            .header(header::CONTENT_LENGTH, "32")
            .body(Body::from(vec![0u8; 32]))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("application/json"));
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
    }

    #[tokio::test]
    async fn test_small_body_passes_limit() {
        let app: Router = Router::new()
            .route("/upload", post(|| async { "ok" }))
            .layer(RequestBodyLimitLayer::new(16))
            .layer(axum::middleware::from_fn(payload_limit_as_json));

        let request = Request::builder()
            .method("POST")
            .uri("/upload")
            .header(header::CONTENT_LENGTH, "4")
            .body(Body::from(vec![0u8; 4]))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_invalid_cors_origin_is_rejected() {
        let mut inner = AnalyzerConfig::default();
        inner.base.cors_origins = vec!["bad\norigin".to_string()];
        let config = Config(Box::new(inner));
        assert!(setup_cors(&config).is_err());
    }

    #[test]
    fn test_explicit_cors_origins_are_accepted() {
        let mut inner = AnalyzerConfig::default();
        inner.base.cors_origins = vec!["https://metascan.example".to_string()];
        let config = Config(Box::new(inner));
        assert!(setup_cors(&config).is_ok());
    }
}
