//! MetaScan API Library
//!
//! This crate provides the HTTP handlers and application setup for the
//! image privacy analyzer.

mod api_doc;
mod handlers;
mod utils;

// Public modules
pub mod error;
pub mod setup;
pub mod state;

// Re-exports
pub use api_doc::ApiDoc;
pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
