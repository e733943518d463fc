//! MetaScan Core Library
//!
//! This crate provides the report model, error types, configuration and constants
//! shared across all MetaScan components.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{AnalyzerConfig, BaseConfig, Config, LogFormat};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    AnalysisReport, CleanOutcome, ExifData, FileHashes, FileInfo, GpsCoordinates, MagicBytes,
    MetadataField, MetadataMap, QrCodes, Rational, RiskCategory, RiskFinding, ScriptInjection,
    Section, Steganography, TagValue,
};
