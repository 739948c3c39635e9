//! Error types for the site icon workflow

use std::fmt;
use thiserror::Error;

/// Which side of an image failed the minimum size check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Width,
    Height,
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Width => f.write_str("width"),
            Dimension::Height => f.write_str("height"),
        }
    }
}

/// Main error type for site icon operations
#[derive(Error, Debug)]
pub enum IconError {
    /// Upload rejected before any processing
    #[error("The uploaded file is not a valid image ({mime})")]
    UnsupportedType { mime: String },

    /// Source image is below the minimum icon size
    #[error("The selected image is smaller than {min}px in {dimension} (got {actual}px)")]
    TooSmall {
        dimension: Dimension,
        actual: u32,
        min: u32,
    },

    /// Decode, resize, crop or save failed
    #[error("Image could not be processed: {0}")]
    ImageProcessing(String),

    /// Workflow state or asset no longer exists
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed admin request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration could not be loaded or is invalid
    #[error("Config error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl IconError {
    pub fn processing(msg: impl Into<String>) -> Self {
        IconError::ImageProcessing(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        IconError::NotFound(msg.into())
    }

    /// Errors that send the user back to the file selection step
    /// instead of ending the request.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            IconError::UnsupportedType { .. } | IconError::TooSmall { .. }
        )
    }
}

impl From<image::ImageError> for IconError {
    fn from(err: image::ImageError) -> Self {
        IconError::ImageProcessing(err.to_string())
    }
}

/// Result type alias for site icon operations
pub type Result<T> = std::result::Result<T, IconError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_too_small_message_names_dimension() {
        let err = IconError::TooSmall {
            dimension: Dimension::Width,
            actual: 400,
            min: 512,
        };
        assert_eq!(
            err.to_string(),
            "The selected image is smaller than 512px in width (got 400px)"
        );
    }

    #[test]
    fn test_recoverable_errors() {
        assert!(IconError::UnsupportedType {
            mime: "text/plain".into()
        }
        .is_recoverable());
        assert!(!IconError::processing("boom").is_recoverable());
        assert!(!IconError::not_found("workflow").is_recoverable());
    }
}
