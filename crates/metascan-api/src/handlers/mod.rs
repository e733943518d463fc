pub mod analyze;
pub mod clean;
pub mod download;
pub mod health;
pub mod info;
