//! Error types for the editor adapter.

use std::path::PathBuf;

use markpane_preview::PreviewError;
use thiserror::Error;

/// Errors that can occur while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`EditorConfig`](crate::EditorConfig).
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Errors that can occur in an editor session.
#[derive(Error, Debug)]
pub enum EditorError {
    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Preview activation error.
    #[error("Preview error: {0}")]
    Preview(#[from] PreviewError),
}

/// Result type for editor operations.
pub type Result<T> = std::result::Result<T, EditorError>;
