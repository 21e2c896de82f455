//! Image rotation
//!
//! - Orthogonal rotations (90, 180, 270 degrees), exact pixel moves
//! - [`OrthogonalRotation`], the pre-rotation of a page expressed as a
//!   coordinate transform
//! - Rotation by an arbitrary angle about the image centre

use crate::affine::{OutsidePixels, transform};
use crate::TransformResult;
use scanout_core::{Pix, PointF, Size, Transform};

/// A rotation by a multiple of 90 degrees, clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OrthogonalRotation {
    degrees: u32,
}

impl OrthogonalRotation {
    /// Create a rotation; `degrees` is rounded to the nearest multiple of
    /// 90 and normalized into `0..360`.
    pub fn new(degrees: i32) -> Self {
        let quads = ((f64::from(degrees) / 90.0).round() as i32).rem_euclid(4);
        OrthogonalRotation {
            degrees: quads as u32 * 90,
        }
    }

    pub fn to_degrees(self) -> u32 {
        self.degrees
    }

    /// Number of clockwise quarter turns.
    pub fn quads(self) -> u32 {
        self.degrees / 90
    }

    pub fn next_clockwise(self) -> Self {
        Self::new(self.degrees as i32 + 90)
    }

    pub fn next_counter_clockwise(self) -> Self {
        Self::new(self.degrees as i32 - 90)
    }

    /// Size of an image of `size` after the rotation.
    pub fn rotate_size(self, size: Size) -> Size {
        if self.quads() % 2 == 1 {
            Size::new(size.height, size.width)
        } else {
            size
        }
    }

    /// Coordinate transform from an unrotated image of `size` to the
    /// rotated image, whose top-left corner stays at the origin.
    pub fn transform(self, size: Size) -> Transform {
        let w = f64::from(size.width);
        let h = f64::from(size.height);
        match self.quads() {
            1 => Transform::new(0.0, 1.0, -1.0, 0.0, h, 0.0),
            2 => Transform::new(-1.0, 0.0, 0.0, -1.0, w, h),
            3 => Transform::new(0.0, -1.0, 1.0, 0.0, 0.0, w),
            _ => Transform::identity(),
        }
    }

    /// Inverse of [`OrthogonalRotation::transform`] for the same `size`.
    pub fn transform_back(self, size: Size) -> Transform {
        let w = f64::from(size.width);
        let h = f64::from(size.height);
        match self.quads() {
            1 => Transform::new(0.0, -1.0, 1.0, 0.0, 0.0, h),
            2 => Transform::new(-1.0, 0.0, 0.0, -1.0, w, h),
            3 => Transform::new(0.0, 1.0, -1.0, 0.0, w, 0.0),
            _ => Transform::identity(),
        }
    }

    /// Rotate the raster itself.
    pub fn rotate(self, pix: &Pix) -> TransformResult<Pix> {
        rotate_orth(pix, self.quads())
    }
}

/// Rotate by `quads` clockwise quarter turns.
pub fn rotate_orth(pix: &Pix, quads: u32) -> TransformResult<Pix> {
    match quads % 4 {
        1 => rotate_90(pix, true),
        2 => rotate_180(pix),
        3 => rotate_90(pix, false),
        _ => Ok(pix.deep_clone()),
    }
}

/// Rotate an image 90 degrees
///
/// # Arguments
/// * `pix` - Input image
/// * `clockwise` - If true, rotate clockwise; otherwise counterclockwise
pub fn rotate_90(pix: &Pix, clockwise: bool) -> TransformResult<Pix> {
    let w = pix.width();
    let h = pix.height();
    let mut out = Pix::new(h, w, pix.depth())?.into_mut();
    out.copy_resolution_from(pix);
    for y in 0..h {
        for x in 0..w {
            let val = pix.get_pixel_unchecked(x, y);
            let (nx, ny) = if clockwise {
                (h - 1 - y, x)
            } else {
                (y, w - 1 - x)
            };
            out.set_pixel_unchecked(nx, ny, val);
        }
    }
    Ok(out.into())
}

/// Rotate an image 180 degrees
pub fn rotate_180(pix: &Pix) -> TransformResult<Pix> {
    let w = pix.width();
    let h = pix.height();
    let mut out = Pix::new(w, h, pix.depth())?.into_mut();
    out.copy_resolution_from(pix);
    for y in 0..h {
        for x in 0..w {
            out.set_pixel_unchecked(w - 1 - x, h - 1 - y, pix.get_pixel_unchecked(x, y));
        }
    }
    Ok(out.into())
}

/// Rotate by `angle` degrees counter-clockwise about the image centre.
///
/// The centre is taken on the integer grid, `(w / 2, h / 2)`. The output
/// keeps the input size; uncovered areas are resolved through `outside`.
/// A zero angle returns the input unchanged.
pub fn rotate_about_center(pix: &Pix, angle: f64, outside: OutsidePixels) -> TransformResult<Pix> {
    if angle == 0.0 {
        return Ok(pix.clone());
    }
    let center = PointF::new(f64::from(pix.width() / 2), f64::from(pix.height() / 2));
    let xform = Transform::rotation_about(center, -angle);
    tracing::debug!(angle, "rotating about centre");
    transform(pix, &xform, pix.rect(), outside)
}
