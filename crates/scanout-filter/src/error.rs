//! Error types for scanout-filter

use thiserror::Error;

/// Errors that can occur during filtering operations
#[derive(Debug, Error)]
pub enum FilterError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] scanout_core::Error),

    /// Morphology error
    #[error("morphology error: {0}")]
    Morph(#[from] scanout_morph::MorphError),

    /// Resampling error
    #[error("transform error: {0}")]
    Transform(#[from] scanout_transform::TransformError),

    /// Thresholding error
    #[error("color error: {0}")]
    Color(#[from] scanout_color::ColorError),

    /// Unsupported pixel depth for this operation
    #[error("unsupported depth: expected {expected}, got {actual}")]
    UnsupportedDepth {
        /// Expected depth description
        expected: &'static str,
        /// Actual depth in bits
        actual: u32,
    },

    /// Invalid parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// A least-squares system had no solution
    #[error("singular system in {0}")]
    SingularSystem(&'static str),
}

/// Result type for filter operations
pub type FilterResult<T> = Result<T, FilterError>;
