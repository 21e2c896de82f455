//! Image scaling
//!
//! Scaling is affine resampling with a pure scale transform: upscaling
//! interpolates bilinearly, downscaling averages the covered source
//! area. Edge pixels are extended rather than blended with a fill color.

use crate::affine::{OutsidePixels, transform};
use crate::{TransformError, TransformResult};
use scanout_core::{Pix, Rect, Size, Transform};

/// Scale `pix` to exactly `size`.
///
/// Returns a shared clone when the size is unchanged.
pub fn scale_to_size(pix: &Pix, size: Size) -> TransformResult<Pix> {
    if size.is_empty() {
        return Err(TransformError::InvalidParameters(format!(
            "cannot scale to an empty size {}x{}",
            size.width, size.height
        )));
    }
    if size == pix.size() {
        return Ok(pix.clone());
    }
    let sx = f64::from(size.width) / f64::from(pix.width());
    let sy = f64::from(size.height) / f64::from(pix.height());
    transform(
        pix,
        &Transform::scaling(sx, sy),
        Rect::from_size(size),
        OutsidePixels::WeakNearest,
    )
}

/// Scale by independent factors; each output dimension is
/// `max(1, round(dim * factor))`.
pub fn scale(pix: &Pix, sx: f64, sy: f64) -> TransformResult<Pix> {
    if !(sx > 0.0 && sy > 0.0 && sx.is_finite() && sy.is_finite()) {
        return Err(TransformError::InvalidParameters(format!(
            "scale factors must be positive, got {sx} x {sy}"
        )));
    }
    scale_to_size(pix, scaled_size(pix.size(), sx, sy))
}

/// `size` multiplied by the factors, rounded, each side at least 1.
pub fn scaled_size(size: Size, sx: f64, sy: f64) -> Size {
    let w = (f64::from(size.width) * sx).round().max(1.0) as u32;
    let h = (f64::from(size.height) * sy).round().max(1.0) as u32;
    Size::new(w, h)
}
