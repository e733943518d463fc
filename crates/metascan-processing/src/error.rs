//! Detector and rewrite errors

/// Failure local to one detector. Rendered into that detector's `{error}` section.
#[derive(Debug, thiserror::Error)]
pub enum DetectorError {
    #[error("Metadata could not be parsed: {0}")]
    Metadata(String),

    #[error("Invalid GPS data: {0}")]
    Gps(String),

    #[error("Image pixels could not be decoded: {0}")]
    Decode(String),

    #[error("QR decoding failed: {0}")]
    Qr(String),

    #[error("{detector} detector aborted: {message}")]
    Aborted {
        detector: &'static str,
        message: String,
    },
}

/// Failure to rewrite an image without its metadata.
#[derive(Debug, thiserror::Error)]
pub enum StripError {
    #[error("Unsupported image format")]
    UnsupportedFormat,

    #[error("Could not parse {format} container: {message}")]
    Malformed {
        format: &'static str,
        message: String,
    },

    #[error("Could not re-encode {format} image: {message}")]
    Encode {
        format: &'static str,
        message: String,
    },
}

impl From<StripError> for metascan_core::AppError {
    fn from(err: StripError) -> Self {
        metascan_core::AppError::StripFailed(err.to_string())
    }
}

impl From<crate::validator::ValidationError> for metascan_core::AppError {
    fn from(err: crate::validator::ValidationError) -> Self {
        use crate::validator::ValidationError;

        match err {
            ValidationError::FileTooLarge { .. } => {
                metascan_core::AppError::PayloadTooLarge(err.to_string())
            }
            other => metascan_core::AppError::InvalidInput(other.to_string()),
        }
    }
}
