//! MetaScan Processing Library
//!
//! This crate provides the image analysis detectors and the metadata stripper:
//! - Upload validation (size ceiling, type allow-list)
//! - File hashes and magic-byte format detection
//! - Metadata extraction and GPS resolution
//! - QR, steganography and script payload detectors
//! - Privacy score aggregation
//! - The analysis pipeline composing all of the above

pub mod capabilities;
pub mod error;
pub mod exif;
pub mod geocode;
pub mod gif;
pub mod hashes;
pub mod magic;
pub mod pipeline;
pub mod qr;
pub mod score;
pub mod script;
pub mod stego;
pub mod strip;
pub mod validator;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use capabilities::{Capabilities, CapabilityReport};
pub use error::{DetectorError, StripError};
pub use exif::{analyze_exif, extract_metadata, resolve_gps};
pub use hashes::compute_hashes;
pub use magic::{detect_format, validate_magic_bytes, ImageFormat};
pub use pipeline::{AnalysisPipeline, SourceFile};
pub use score::{aggregate, ScoreBand, ScoreOutcome, ScoreWeights};
pub use strip::{strip_metadata, Stripped};
pub use validator::{file_extension, MediaValidator, ValidationError};
