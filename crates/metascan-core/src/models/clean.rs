use serde::{Deserialize, Serialize};

/// Result of a successful clean request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanOutcome {
    pub success: bool,
    pub download_token: String,
    pub download_filename: String,
    /// Original size minus cleaned size. Zero or negative when nothing was removed.
    pub size_reduction: i64,
}
