//! Error types for annotation export operations.

use thiserror::Error;

/// Errors that can occur while producing an export payload.
///
/// Missing preconditions (no image bound, no annotations) are not errors;
/// exports degrade to empty payloads instead. These variants cover genuine
/// faults in serialization and encoding.
#[derive(Error, Debug)]
pub enum ExportError {
    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// PNG encoding or decoding error
    #[error("PNG error: {0}")]
    Png(#[from] image::ImageError),

    /// Base image unusable for rasterization
    #[error("Invalid image: {message}")]
    InvalidImage {
        /// Description of what made the image unusable
        message: String,
    },
}

impl ExportError {
    /// Create an invalid image error with a message.
    pub fn invalid_image(message: impl Into<String>) -> Self {
        Self::InvalidImage {
            message: message.into(),
        }
    }
}
