//! Shared library for the cover importer.
//!
//! This crate provides the pieces that do not talk to the network:
//! - Configuration management
//! - Logging infrastructure
//! - Catalog data model and blob naming

pub mod config;
pub mod logging;
pub mod models;

// Re-export commonly used types
pub use config::Config;
pub use logging::LogConfig;
pub use models::*;

/// Common result type using anyhow::Error
pub type Result<T> = anyhow::Result<T>;
