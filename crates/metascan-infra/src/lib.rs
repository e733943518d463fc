//! MetaScan Infrastructure Library
//!
//! Shared infrastructure for the MetaScan binaries:
//! - Middleware (request ID, security headers)
//! - Telemetry initialization
//! - HTTP error response body

#[cfg(feature = "middleware")]
pub mod middleware;

pub mod telemetry;

pub mod error;

// Re-export commonly used types
#[cfg(feature = "middleware")]
pub use middleware::{
    get_request_id, request_id_middleware, security_headers_middleware, RequestId,
    REQUEST_ID_HEADER,
};

pub use telemetry::{init_telemetry, shutdown_telemetry, DEFAULT_LOG_FILTER};

pub use error::ErrorResponse;
