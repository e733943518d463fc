use serde::{Deserialize, Serialize};

/// Category of a detected risk signal.
///
/// Variant order is the order detectors run in, which is also the order
/// findings appear in the report's risk list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    FormatMismatch,
    SensitiveMetadata,
    Gps,
    QrCode,
    Steganography,
    ScriptInjection,
}

impl RiskCategory {
    pub const ALL: [RiskCategory; 6] = [
        RiskCategory::FormatMismatch,
        RiskCategory::SensitiveMetadata,
        RiskCategory::Gps,
        RiskCategory::QrCode,
        RiskCategory::Steganography,
        RiskCategory::ScriptInjection,
    ];

    pub fn default_message(&self) -> &'static str {
        match self {
            RiskCategory::FormatMismatch => "File extension mismatch detected",
            RiskCategory::SensitiveMetadata => "Sensitive EXIF metadata found",
            RiskCategory::Gps => "GPS location data embedded in image",
            RiskCategory::QrCode => "QR code detected in image",
            RiskCategory::Steganography => "Potential steganography detected",
            RiskCategory::ScriptInjection => "Potential script injection detected",
        }
    }
}

/// A single risk signal contributed by one detector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFinding {
    pub category: RiskCategory,
    pub message: String,
}

impl RiskFinding {
    pub fn new(category: RiskCategory) -> Self {
        Self {
            category,
            message: category.default_message().to_string(),
        }
    }
}

impl From<RiskCategory> for RiskFinding {
    fn from(category: RiskCategory) -> Self {
        RiskFinding::new(category)
    }
}
