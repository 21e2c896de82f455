//! scanout-color - Histograms and binarization
//!
//! This crate provides:
//!
//! - [`GrayscaleHistogram`], optionally restricted by a binary mask
//! - Otsu thresholding and the bounded threshold bias used by the
//!   black and white output mode
//! - Sauvola and Wolf local binarization
//!
//! Binary results use 1 for black.

mod error;
pub mod histogram;
pub mod local;
pub mod threshold;

pub use error::{ColorError, ColorResult};
pub use histogram::GrayscaleHistogram;
pub use local::{binarize_sauvola, binarize_wolf, calc_local_window_size};
pub use threshold::{
    MAX_ADJUSTED_THRESHOLD, MIN_ADJUSTED_THRESHOLD, adjust_threshold, binarize_otsu,
    binarize_threshold, otsu_threshold, otsu_threshold_of,
};
