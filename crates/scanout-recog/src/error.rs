//! Error types for scanout-recog

use thiserror::Error;

/// Errors that can occur during skew detection and dewarping
#[derive(Debug, Error)]
pub enum RecogError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] scanout_core::Error),

    /// Transform library error
    #[error("transform error: {0}")]
    Transform(#[from] scanout_transform::TransformError),

    /// Thresholding error
    #[error("color error: {0}")]
    Color(#[from] scanout_color::ColorError),

    /// Unsupported pixel depth for this operation
    #[error("unsupported depth: expected {expected}, got {actual}")]
    UnsupportedDepth { expected: &'static str, actual: u32 },

    /// Invalid parameter provided
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The distortion model cannot be turned into a dewarper
    #[error("invalid distortion model: {0}")]
    InvalidModel(String),

    /// No content found in image
    #[error("no content found: {0}")]
    NoContent(String),
}

/// Result type for recognition operations
pub type RecogResult<T> = Result<T, RecogError>;
