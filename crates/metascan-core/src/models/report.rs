use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::metadata::MetadataMap;

/// One report section: either the detector's result or the reason it failed.
///
/// A failing detector only ever produces `Failed` for its own section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Section<T> {
    Failed { error: String },
    Ready(T),
}

impl<T> Section<T> {
    pub fn failed(message: impl Into<String>) -> Self {
        Section::Failed {
            error: message.into(),
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Section::Ready(value) => Some(value),
            Section::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Section::Failed { error } => Some(error),
            Section::Ready(_) => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Section::Ready(_))
    }
}

impl<T, E: std::fmt::Display> From<Result<T, E>> for Section<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Section::Ready(value),
            Err(err) => Section::failed(err.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileInfo {
    pub name: String,
    pub size: u64,
    pub modified: DateTime<Utc>,
    /// Lowercase, with leading dot (".jpg"); empty when the name has none.
    pub extension: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHashes {
    pub md5: String,
    pub sha1: String,
    pub sha256: String,
    pub file_size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MagicBytes {
    pub file_extension: String,
    pub detected_mime: String,
    pub is_valid: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpsCoordinates {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExifData {
    pub metadata: MetadataMap,
    /// `None` (serialized as null) when the image carries no GPS tags.
    pub gps_data: Option<Section<GpsCoordinates>>,
    pub has_sensitive_data: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrCodes {
    pub found: bool,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub data: Option<String>,
}

impl QrCodes {
    pub fn none() -> Self {
        Self {
            found: false,
            count: 0,
            data: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Steganography {
    pub suspicious: bool,
    pub size_ratio: f64,
    pub lsb_variance: f64,
    pub analysis: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptInjection {
    pub suspicious: bool,
    pub pattern_count: usize,
    pub patterns_found: Vec<String>,
    pub analysis: String,
}

/// Composite result of running every detector over one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub privacy_score: u8,
    pub risks: Vec<String>,
    pub file_info: Section<FileInfo>,
    pub exif_data: Section<ExifData>,
    pub qr_codes: Section<QrCodes>,
    pub steganography: Section<Steganography>,
    pub script_injection: Section<ScriptInjection>,
    pub magic_bytes: Section<MagicBytes>,
    pub hashes: Section<FileHashes>,
}
