//! scanout-filter - Page filters for output generation
//!
//! This crate provides:
//!
//! - [`PolynomialSurface`] fitting and rendering
//! - Background estimation with dark-outlier rejection and the matching
//!   illumination lift ([`raise_above_background`])
//! - Gray range stretching with tail clipping
//! - Savitzky-Golay smoothing of low resolution scans
//! - Brightness transfer onto color images
//! - Dominant background color detection
//!
//! # Example
//!
//! ```ignore
//! use scanout_filter::{BackgroundEstimationOptions, estimate_background, raise_above_background};
//!
//! let surface = estimate_background(&gray, &area, || Ok::<_, FilterError>(()), &opts)?;
//! let normalized = raise_above_background(&gray, &surface.render(gray.size())?)?;
//! ```

pub mod background;
pub mod brightness;
pub mod dominant;
mod error;
mod linalg;
pub mod savgol;
pub mod stretch;
pub mod surface;

pub use error::{FilterError, FilterResult};
pub use surface::PolynomialSurface;

pub use background::{
    BackgroundEstimationOptions, DEFAULT_SURFACE_DEGREE, estimate_background,
    raise_above_background,
};
pub use brightness::adjust_brightness_grayscale;
pub use dominant::{calc_dominant_background_color, calc_dominant_background_color_bw};
pub use savgol::{savgol_filter, smooth_to_grayscale, smoothing_window_for};
pub use stretch::stretch_gray_range;
