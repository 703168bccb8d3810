//! Error types for the preview.

use thiserror::Error;

/// Errors that can occur while activating or serializing a preview.
#[derive(Error, Debug)]
pub enum PreviewError {
    /// `root_margin` is not a CSS margin shorthand of px or % lengths.
    #[error("Invalid root margin '{0}'")]
    InvalidRootMargin(String),

    /// A threshold outside of `[0, 1]`.
    #[error("Threshold {0} is outside [0, 1]")]
    InvalidThreshold(f64),

    /// The host clipboard refused the write.
    #[error("Clipboard error: {0}")]
    Clipboard(String),

    /// IO error while serializing the DOM.
    #[error("Serialization error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialized HTML was not UTF-8.
    #[error("Serialization error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Result type for preview operations.
pub type Result<T> = std::result::Result<T, PreviewError>;
