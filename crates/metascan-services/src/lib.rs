//! MetaScan Services Layer
//!
//! Stateful services composed by the binaries: the artifact store with its
//! reaper, and the clean service that feeds it. Re-exports the processing
//! facade so the API crate depends on a single service crate.

pub mod artifacts;
pub mod clean;

pub use artifacts::{
    ArtifactDownload, ArtifactError, ArtifactReaper, ArtifactStore, Clock, ManualClock,
    ReaperHandle, SystemClock,
};
pub use clean::{clean_filename, secure_filename, CleanService};
pub use metascan_processing::{
    AnalysisPipeline, Capabilities, CapabilityReport, MediaValidator, SourceFile,
    ValidationError,
};
