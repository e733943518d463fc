//! Error types module
//!
//! Request-level failures of the MetaScan service are unified under `AppError`.
//! Failures local to a single detector never reach this type: they are recorded
//! as `{error}` sections inside the analysis report instead.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like expired links
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
/// This trait allows errors to self-describe their HTTP response characteristics
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "ARTIFACT_EXPIRED")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Metadata removal failed: {0}")]
    StripFailed(String),

    #[error("Artifact not found: {0}")]
    ArtifactNotFound(String),

    #[error("Artifact expired: {0}")]
    ArtifactExpired(String),

    #[error("Analysis timed out after {seconds}s")]
    AnalysisTimeout { seconds: u64 },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Upload a PNG, JPEG, GIF, TIFF, BMP or WEBP image"),
            false,
            LogLevel::Debug,
        ),
        AppError::PayloadTooLarge(_) => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce file size to 16MB or less"),
            false,
            LogLevel::Debug,
        ),
        AppError::StripFailed(_) => (
            422,
            "STRIP_FAILED",
            false,
            Some("Check image format and try a different file"),
            false,
            LogLevel::Warn,
        ),
        AppError::ArtifactNotFound(_) => (
            404,
            "ARTIFACT_NOT_FOUND",
            false,
            Some("Check the download link"),
            false,
            LogLevel::Debug,
        ),
        AppError::ArtifactExpired(_) => (
            410,
            "ARTIFACT_EXPIRED",
            false,
            Some("Clean the image again to get a fresh link"),
            false,
            LogLevel::Debug,
        ),
        AppError::AnalysisTimeout { .. } => (
            504,
            "ANALYSIS_TIMEOUT",
            false,
            Some("Try a smaller image"),
            false,
            LogLevel::Warn,
        ),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::StripFailed(_) => "StripFailed",
            AppError::ArtifactNotFound(_) => "ArtifactNotFound",
            AppError::ArtifactExpired(_) => "ArtifactExpired",
            AppError::AnalysisTimeout { .. } => "AnalysisTimeout",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::PayloadTooLarge(ref msg) => msg.clone(),
            AppError::StripFailed(ref msg) => msg.clone(),
            AppError::ArtifactNotFound(_) => {
                "Download link is invalid or the file has been removed".to_string()
            }
            AppError::ArtifactExpired(_) => "Download link has expired".to_string(),
            AppError::AnalysisTimeout { seconds } => {
                format!("Analysis did not finish within {} seconds", seconds)
            }
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_payload_too_large() {
        let err = AppError::PayloadTooLarge("File size exceeds maximum".to_string());
        assert_eq!(err.http_status_code(), 413);
        assert_eq!(err.error_code(), "PAYLOAD_TOO_LARGE");
        assert!(!err.is_recoverable());
        assert_eq!(err.client_message(), "File size exceeds maximum");
        assert!(!err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_invalid_input_is_the_only_400() {
        let err = AppError::InvalidInput("No file provided".to_string());
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert_eq!(err.error_type(), "InvalidInput");
        assert_eq!(err.client_message(), "No file provided");
    }

    #[test]
    fn test_artifact_errors_are_distinguished() {
        let missing = AppError::ArtifactNotFound("abc".to_string());
        let expired = AppError::ArtifactExpired("abc".to_string());
        assert_eq!(missing.http_status_code(), 404);
        assert_eq!(expired.http_status_code(), 410);
        assert_ne!(missing.error_code(), expired.error_code());
        assert_ne!(missing.client_message(), expired.client_message());
        assert!(!missing.client_message().contains("abc"));
    }

    #[test]
    fn test_internal_errors_are_sensitive() {
        let err = AppError::from(anyhow::anyhow!("disk exploded"));
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.client_message(), "Internal server error");
        assert!(err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Error);
        assert_eq!(err.error_type(), "Internal");
    }

    #[test]
    fn test_strip_failure_metadata() {
        let err = AppError::StripFailed("not a JPEG".to_string());
        assert_eq!(err.http_status_code(), 422);
        assert_eq!(err.error_code(), "STRIP_FAILED");
        assert_eq!(
            err.suggested_action(),
            Some("Check image format and try a different file")
        );
    }

    #[test]
    fn test_detailed_message_includes_source_chain() {
        let err = AppError::InternalWithSource {
            message: "outer".to_string(),
            source: anyhow::anyhow!("inner cause"),
        };
        let details = err.detailed_message();
        assert!(details.contains("Caused by: inner cause"));
    }
}
