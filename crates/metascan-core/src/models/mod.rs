//! Data models for the analyzer
//!
//! Report sections produced by the detectors, the risk findings they contribute,
//! and the outcome of a clean request.

mod clean;
mod finding;
mod metadata;
mod report;

pub use clean::*;
pub use finding::*;
pub use metadata::*;
pub use report::*;
