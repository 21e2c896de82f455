//! Error types for scanout-output

use thiserror::Error;

/// Errors that can occur while generating an output page
#[derive(Debug, Error)]
pub enum OutputError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] scanout_core::Error),

    /// Image I/O error
    #[error("io error: {0}")]
    Io(#[from] scanout_io::IoError),

    /// Morphology error
    #[error("morphology error: {0}")]
    Morph(#[from] scanout_morph::MorphError),

    /// Region (seed fill, despeckle) error
    #[error("region error: {0}")]
    Region(#[from] scanout_region::RegionError),

    /// Resampling error
    #[error("transform error: {0}")]
    Transform(#[from] scanout_transform::TransformError),

    /// Filter error
    #[error("filter error: {0}")]
    Filter(#[from] scanout_filter::FilterError),

    /// Thresholding error
    #[error("color error: {0}")]
    Color(#[from] scanout_color::ColorError),

    /// Skew detection or dewarping error
    #[error("recog error: {0}")]
    Recog(#[from] scanout_recog::RecogError),

    /// The task was cancelled between stages
    #[error("operation cancelled")]
    Cancelled,

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
}

/// Result type for output generation
pub type OutputResult<T> = Result<T, OutputError>;
