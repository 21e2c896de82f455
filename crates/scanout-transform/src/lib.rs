//! scanout-transform - Geometric transformations for page output
//!
//! This crate provides:
//!
//! - Affine resampling through a [`Transform`](scanout_core::Transform)
//!   with an [`OutsidePixels`] policy (bilinear, or area averaging when
//!   shrinking)
//! - Scaling to an exact size
//! - Orthogonal rotations (90, 180, 270 degrees) and rotation about the
//!   image centre
//! - [`ImageTransformation`], the original-to-output page geometry

pub mod affine;
mod error;
pub mod image_transformation;
pub mod rotate;
pub mod scale;

pub use affine::{OutsidePixels, transform, transform_to_gray};
pub use error::{TransformError, TransformResult};
pub use image_transformation::ImageTransformation;
pub use rotate::{OrthogonalRotation, rotate_90, rotate_180, rotate_about_center, rotate_orth};
pub use scale::{scale, scale_to_size, scaled_size};
