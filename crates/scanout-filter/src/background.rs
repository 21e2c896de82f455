//! Page background estimation
//!
//! The background of a page is modelled as a smooth polynomial surface.
//! The estimator works on a downscaled copy: a max filter wipes out thin
//! dark strokes, then a surface is fitted repeatedly, each round dropping
//! pixels that are much darker than the current surface.

use crate::surface::PolynomialSurface;
use crate::{FilterError, FilterResult};
use scanout_core::{FillRule, Pix, PixelDepth, Polygon, PolygonRasterizer, Transform};
use scanout_morph::dilate_gray;
use scanout_transform::{scale_to_size, scaled_size};

/// Default polynomial degree in each direction.
pub const DEFAULT_SURFACE_DEGREE: u32 = 5;

/// Tuning for [`estimate_background`].
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundEstimationOptions {
    /// Horizontal polynomial degree.
    pub hor_degree: u32,
    /// Vertical polynomial degree.
    pub vert_degree: u32,
    /// The longer side of the working copy, in pixels.
    pub max_working_size: u32,
    /// Side of the max filter that removes text strokes (odd, 1 = off).
    pub text_filter_size: u32,
    /// Number of fit/reject rounds.
    pub iterations: u32,
    /// Pixels darker than the surface by more than this many standard
    /// deviations of the residual are dropped.
    pub outlier_factor: f64,
    /// Lower bound on the rejection distance, in gray levels.
    pub min_outlier_distance: f64,
}

impl Default for BackgroundEstimationOptions {
    fn default() -> Self {
        Self {
            hor_degree: DEFAULT_SURFACE_DEGREE,
            vert_degree: DEFAULT_SURFACE_DEGREE,
            max_working_size: 300,
            text_filter_size: 5,
            iterations: 4,
            outlier_factor: 1.5,
            min_outlier_distance: 4.0,
        }
    }
}

impl BackgroundEstimationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_degrees(mut self, hor_degree: u32, vert_degree: u32) -> Self {
        self.hor_degree = hor_degree;
        self.vert_degree = vert_degree;
        self
    }

    pub fn with_max_working_size(mut self, size: u32) -> Self {
        self.max_working_size = size;
        self
    }

    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn validate(&self) -> FilterResult<()> {
        if self.max_working_size < 8 {
            return Err(FilterError::InvalidParameters(format!(
                "max_working_size must be at least 8, got {}",
                self.max_working_size
            )));
        }
        if self.text_filter_size == 0 || self.text_filter_size % 2 == 0 {
            return Err(FilterError::InvalidParameters(format!(
                "text_filter_size must be odd, got {}",
                self.text_filter_size
            )));
        }
        if self.iterations == 0 {
            return Err(FilterError::InvalidParameters(
                "iterations must be positive".to_string(),
            ));
        }
        if self.outlier_factor.is_nan() || self.outlier_factor <= 0.0 {
            return Err(FilterError::InvalidParameters(format!(
                "outlier_factor must be positive, got {}",
                self.outlier_factor
            )));
        }
        Ok(())
    }
}

/// Estimate the background of `gray` inside `area`.
///
/// `area` is in `gray` pixel coordinates; an empty polygon means the
/// whole image. `checkpoint` runs before each fitting round, and an error
/// from it aborts the estimation.
///
/// The returned surface is in normalized coordinates; render it at the
/// size of `gray` to get a background image.
pub fn estimate_background<E, F>(
    gray: &Pix,
    area: &Polygon,
    mut checkpoint: F,
    opts: &BackgroundEstimationOptions,
) -> Result<PolynomialSurface, E>
where
    E: From<FilterError>,
    F: FnMut() -> Result<(), E>,
{
    opts.validate()?;
    if gray.depth() != PixelDepth::Bit8 {
        return Err(FilterError::UnsupportedDepth {
            expected: "8 bpp",
            actual: gray.depth().bits(),
        }
        .into());
    }

    let longest = gray.width().max(gray.height());
    let factor = (f64::from(opts.max_working_size) / f64::from(longest)).min(1.0);
    let small_size = scaled_size(gray.size(), factor, factor);
    let small = scale_to_size(gray, small_size).map_err(FilterError::from)?;
    let small = if opts.text_filter_size > 1 {
        dilate_gray(&small, opts.text_filter_size, opts.text_filter_size, 0)
            .map_err(FilterError::from)?
    } else {
        small
    };

    let mut mask = Pix::new(small_size.width, small_size.height, PixelDepth::Bit1)
        .map_err(FilterError::from)?
        .into_mut();
    if area.is_empty() {
        mask.fill(1);
    } else {
        let sx = f64::from(small_size.width) / f64::from(gray.width());
        let sy = f64::from(small_size.height) / f64::from(gray.height());
        let scaled = Transform::scaling(sx, sy).map_polygon(area);
        PolygonRasterizer::fill(&mut mask, 1, &scaled, FillRule::Winding);
    }
    let mut mask: Pix = mask.into();
    if mask.count_black().map_err(FilterError::from)? == 0 {
        tracing::debug!("background area covers no pixels, using the whole image");
        mask = Pix::new_filled(small_size.width, small_size.height, PixelDepth::Bit1, 1)
            .map_err(FilterError::from)?;
    }

    let mut surface = PolynomialSurface::constant(255.0);
    for round in 0..opts.iterations {
        checkpoint()?;
        surface = PolynomialSurface::fit(opts.hor_degree, opts.vert_degree, &small, &mask)?;
        if round + 1 == opts.iterations {
            break;
        }
        let rendered = surface.render(small_size)?;
        let (kept, dropped) = reject_dark_outliers(&small, &rendered, &mut mask, opts)?;
        tracing::trace!(round, kept, dropped, "background fit");
        if dropped == 0 || kept == 0 {
            break;
        }
    }
    Ok(surface)
}

/// Drop masked pixels far below the surface. Returns the number of
/// pixels kept and dropped; the mask is left untouched when every pixel
/// would go.
fn reject_dark_outliers(
    small: &Pix,
    rendered: &Pix,
    mask: &mut Pix,
    opts: &BackgroundEstimationOptions,
) -> FilterResult<(u64, u64)> {
    let (w, h) = (small.width(), small.height());
    let mut n = 0u64;
    let mut sum_sq = 0.0;
    for y in 0..h {
        for x in 0..w {
            if mask.get_pixel_unchecked(x, y) != 0 {
                let r = f64::from(small.get_pixel_unchecked(x, y))
                    - f64::from(rendered.get_pixel_unchecked(x, y));
                sum_sq += r * r;
                n += 1;
            }
        }
    }
    if n == 0 {
        return Ok((0, 0));
    }
    let limit = (opts.outlier_factor * (sum_sq / n as f64).sqrt()).max(opts.min_outlier_distance);

    let mut next = mask.to_mut();
    let mut dropped = 0u64;
    for y in 0..h {
        for x in 0..w {
            if mask.get_pixel_unchecked(x, y) == 0 {
                continue;
            }
            let r = f64::from(small.get_pixel_unchecked(x, y))
                - f64::from(rendered.get_pixel_unchecked(x, y));
            if r < -limit {
                next.set_pixel_unchecked(x, y, 0);
                dropped += 1;
            }
        }
    }
    if dropped == n {
        return Ok((0, dropped));
    }
    *mask = next.into();
    Ok((n - dropped, dropped))
}

/// Lift `orig` against its background `bg`: the background maps to white
/// and darker pixels scale proportionally.
///
/// Per pixel: `255` where `bg - orig < 1`, otherwise
/// `(orig * 255 + bg / 2) / bg`.
pub fn raise_above_background(orig: &Pix, bg: &Pix) -> FilterResult<Pix> {
    for p in [orig, bg] {
        if p.depth() != PixelDepth::Bit8 {
            return Err(FilterError::UnsupportedDepth {
                expected: "8 bpp",
                actual: p.depth().bits(),
            });
        }
    }
    if !orig.same_dimensions(bg) {
        return Err(scanout_core::Error::IncompatibleSizes(
            orig.width(),
            orig.height(),
            bg.width(),
            bg.height(),
        )
        .into());
    }
    let mut out = orig.to_mut();
    for y in 0..orig.height() {
        for x in 0..orig.width() {
            let o = orig.get_pixel_unchecked(x, y);
            let b = bg.get_pixel_unchecked(x, y);
            let v = if b <= o { 255 } else { (o * 255 + b / 2) / b };
            out.set_pixel_unchecked(x, y, v);
        }
    }
    Ok(out.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanout_core::{RectF, Size};

    fn no_cancel() -> Result<(), FilterError> {
        Ok(())
    }

    #[test]
    fn test_raise_above_background() {
        let orig = Pix::new_filled(2, 1, PixelDepth::Bit8, 100).unwrap();
        let mut bg = Pix::new(2, 1, PixelDepth::Bit8).unwrap().into_mut();
        bg.set_pixel(0, 0, 200).unwrap();
        bg.set_pixel(1, 0, 100).unwrap();
        let out = raise_above_background(&orig, &bg.into()).unwrap();
        assert_eq!(out.get_pixel(0, 0), Some(128));
        assert_eq!(out.get_pixel(1, 0), Some(255));
    }

    #[test]
    fn test_background_ignores_text() {
        let page = scanout_test::synth::gray_text_page(200, 150, 12, 3);
        let surface = estimate_background(
            &page,
            &Polygon::default(),
            no_cancel,
            &BackgroundEstimationOptions::default(),
        )
        .unwrap();
        let bg = surface.render(Size::new(200, 150)).unwrap();
        for (x, y) in [(100, 16), (5, 5), (150, 100)] {
            let v = bg.get_pixel(x, y).unwrap() as i32;
            assert!((v - 240).abs() <= 6, "background at ({x}, {y}) = {v}");
        }
    }

    #[test]
    fn test_background_follows_gradient() {
        let page = scanout_test::synth::gray_uneven_page(240, 160, 240, 120);
        let area = Polygon::from_rect(&RectF::new(0.0, 0.0, 240.0, 160.0));
        let surface = estimate_background(
            &page,
            &area,
            no_cancel,
            &BackgroundEstimationOptions::default(),
        )
        .unwrap();
        let bg = surface.render(page.size()).unwrap();
        let left = bg.get_pixel(10, 80).unwrap() as i32;
        let right = bg.get_pixel(230, 80).unwrap() as i32;
        assert!(left > right + 80, "left {left}, right {right}");

        let flat = raise_above_background(&page, &bg).unwrap();
        // Paper becomes near white on both sides.
        assert!(flat.get_pixel(5, 5).unwrap() > 235);
        assert!(flat.get_pixel(235, 5).unwrap() > 235);
    }

    #[test]
    fn test_checkpoint_aborts() {
        let page = Pix::new_filled(20, 20, PixelDepth::Bit8, 200).unwrap();
        let result: Result<_, FilterError> = estimate_background(
            &page,
            &Polygon::default(),
            || Err(FilterError::InvalidParameters("stop".to_string())),
            &BackgroundEstimationOptions::default(),
        );
        assert!(matches!(result, Err(FilterError::InvalidParameters(_))));
    }
}
