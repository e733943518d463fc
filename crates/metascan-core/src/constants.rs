//! Shared constants

/// Version reported by the health endpoint and the CLI.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_PORT: u16 = 5000;

/// Upload ceiling in MiB. A file of exactly this size is accepted.
pub const MAX_FILE_SIZE_MB: usize = 16;

pub const DEFAULT_ALLOWED_EXTENSIONS: &str = "png,jpg,jpeg,gif,tiff,tif,bmp,webp";

pub const DEFAULT_ALLOWED_CONTENT_TYPES: &str =
    "image/png,image/jpeg,image/gif,image/tiff,image/bmp,image/webp";

/// Time-to-live of a cleaned artifact.
pub const ARTIFACT_TTL_SECS: u64 = 180;

pub const REAPER_INTERVAL_SECS: u64 = 60;

pub const ANALYSIS_TIMEOUT_SECS: u64 = 30;

/// Raw bytes scanned for payload signatures at each end of the file.
pub const SCRIPT_SCAN_WINDOW_BYTES: usize = 8 * 1024;

pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org/reverse";

pub const GEOCODER_USER_AGENT: &str = "metascan-analyzer";

pub const GEOCODER_TIMEOUT_SECS: u64 = 5;

/// Risk list entry used when no detector produced a finding.
pub const NO_RISKS_MESSAGE: &str = "No significant risks detected";
