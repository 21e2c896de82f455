//! scanout - Output stage for scanned pages
//!
//! Takes a deskewed, cropped page and renders its final form.
//!
//! # Overview
//!
//! - Binary, color/grayscale and mixed output with picture detection
//! - Illumination normalization and background estimation
//! - Otsu, Sauvola and Wolf binarization
//! - Despeckling and edge smoothing
//! - Cylindrical dewarping (automatic, marginal or manual models)
//! - Split foreground/background layers
//! - PNG I/O for inputs, outputs and debug images
//!
//! # Example
//!
//! ```
//! use scanout::{Pix, PixelDepth};
//!
//! let pix = Pix::new(640, 480, PixelDepth::Bit8).unwrap();
//! assert_eq!(pix.width(), 640);
//! assert_eq!(pix.height(), 480);
//! ```

// Core types are used everywhere
pub use scanout_core::*;

// Domain crates as modules to avoid name conflicts
pub use scanout_color as threshold;
pub use scanout_filter as filter;
pub use scanout_io as io;
pub use scanout_morph as morph;
pub use scanout_output as output;
pub use scanout_recog as recog;
pub use scanout_region as region;
pub use scanout_transform as transform;
