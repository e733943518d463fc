//! Short-lived storage for cleaned files
//!
//! An artifact is downloadable until its expiry, reported as expired after
//! that, and gone once the reaper has purged it.

mod clock;
mod reaper;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use reaper::{ArtifactReaper, ReaperHandle};
pub use store::{ArtifactDownload, ArtifactStore};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArtifactError {
    #[error("No artifact for this token")]
    NotFound,

    #[error("Artifact has expired")]
    Expired,
}

impl From<ArtifactError> for metascan_core::AppError {
    fn from(err: ArtifactError) -> Self {
        match err {
            ArtifactError::NotFound => metascan_core::AppError::ArtifactNotFound(
                "The download link is invalid".to_string(),
            ),
            ArtifactError::Expired => metascan_core::AppError::ArtifactExpired(
                "The download link has expired".to_string(),
            ),
        }
    }
}
