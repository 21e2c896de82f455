//! scanout-recog - Skew detection and page dewarping
//!
//! This crate provides:
//!
//! - **Skew detection**: find the residual rotation of a binarized page
//! - **Splines**: Catmull-Rom curves for user-edited distortion models
//! - **Dewarping**: distortion models, the cylindrical surface dewarper,
//!   raster dewarping and point mapping
//!
//! # Quick Start
//!
//! ```no_run
//! use scanout_recog::skew::{find_skew, SkewDetectOptions};
//! use scanout_core::{Pix, PixelDepth};
//!
//! let pix = Pix::new(800, 600, PixelDepth::Bit1).unwrap();
//! let skew = find_skew(&pix, &SkewDetectOptions::default()).unwrap();
//! if skew.is_confident() {
//!     println!("skew: {} degrees", skew.angle);
//! }
//! ```

pub mod dewarp;
mod error;
pub mod skew;
pub mod spline;

pub use error::{RecogError, RecogResult};

pub use dewarp::{
    ContentBoundaryTracer, Curve, CurveTracer, CylindricalSurfaceDewarper, DewarpingPointMapper,
    DistortionModel, MAX_DEPTH_PERCEPTION, MIN_DEPTH_PERCEPTION, RasterDewarper,
};
pub use skew::{Skew, SkewDetectOptions, find_skew};
pub use spline::Spline;
