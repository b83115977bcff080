//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors that can occur while loading a snapshot
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Failed to read snapshot: {0}")]
    ReadFailed(#[from] std::io::Error),

    #[error("JSON deserialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Duplicate child name '{name}' under '{parent}'")]
    DuplicateName { parent: String, name: String },

    #[error("Empty child name under '{0}'")]
    EmptyName(String),
}

/// Errors that can occur while loading report configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadFailed(#[from] std::io::Error),

    #[error("Config TOML parse error: {0}")]
    ParseFailed(#[from] toml::de::Error),

    #[error("Threshold must be a fraction in [0, 1], got {0}")]
    InvalidThreshold(f64),
}

/// Errors that can occur while rendering a report
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write report: {0}")]
    WriteFailed(#[from] std::io::Error),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
