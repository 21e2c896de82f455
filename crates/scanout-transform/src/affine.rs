//! Affine resampling
//!
//! [`transform`] renders a source image through an affine [`Transform`]
//! into a destination rectangle of the transformed space. Every
//! destination pixel centre is mapped back into the source:
//!
//! - when a destination pixel covers at most one source pixel along each
//!   axis the value is interpolated bilinearly;
//! - otherwise the source footprint is supersampled on a regular grid
//!   and averaged, which gives area-mapping quality when shrinking.
//!
//! Samples that fall outside the source are resolved through
//! [`OutsidePixels`].
//!
//! Binary images are resampled as grayscale and thresholded back at the
//! midpoint.

use crate::{TransformError, TransformResult};
use scanout_core::{Pix, PixelDepth, PointF, Rect, Transform, color};

/// Upper bound on supersampling per axis.
const MAX_SUBSAMPLES: u32 = 32;

/// How samples outside the source image are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutsidePixels {
    /// Outside samples take this color and are blended with inside ones.
    Color(u32),
    /// Outside samples are ignored while any inside sample contributes;
    /// pixels with no inside sample take this color.
    WeakColor(u32),
    /// Like [`OutsidePixels::WeakColor`], but pixels with no inside
    /// sample copy the nearest source pixel.
    WeakNearest,
}

impl OutsidePixels {
    /// Opaque white, blended.
    pub fn white() -> Self {
        OutsidePixels::Color(color::WHITE)
    }

    /// Opaque black, blended.
    pub fn black() -> Self {
        OutsidePixels::Color(color::BLACK)
    }
}

/// Sample accumulator over up to three channels.
#[derive(Default)]
struct Acc {
    sum: [f64; 3],
    weight: f64,
}

impl Acc {
    fn add(&mut self, v: [f64; 3], w: f64) {
        for (s, c) in self.sum.iter_mut().zip(v) {
            *s += c * w;
        }
        self.weight += w;
    }
}

/// Pixel source with per-channel access.
struct Source<'a> {
    pix: &'a Pix,
    rgb: bool,
}

impl Source<'_> {
    #[inline]
    fn fetch(&self, x: i64, y: i64) -> [f64; 3] {
        let v = self.pix.get_pixel_unchecked(x as u32, y as u32);
        if self.rgb {
            let (r, g, b) = color::extract_rgb(v);
            [f64::from(r), f64::from(g), f64::from(b)]
        } else {
            [f64::from(v), 0.0, 0.0]
        }
    }

    #[inline]
    fn inside(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < i64::from(self.pix.width()) && y < i64::from(self.pix.height())
    }

    fn nearest(&self, p: PointF) -> [f64; 3] {
        let x = (p.x.floor() as i64).clamp(0, i64::from(self.pix.width()) - 1);
        let y = (p.y.floor() as i64).clamp(0, i64::from(self.pix.height()) - 1);
        self.fetch(x, y)
    }

    fn channels_of(&self, c: u32) -> [f64; 3] {
        if self.rgb {
            let (r, g, b) = color::extract_rgb(c);
            [f64::from(r), f64::from(g), f64::from(b)]
        } else {
            [f64::from(color::gray(c)), 0.0, 0.0]
        }
    }

    /// Bilinear sample at a continuous source position.
    fn bilinear(&self, p: PointF, outside: OutsidePixels, acc: &mut Acc) {
        let fx = p.x - 0.5;
        let fy = p.y - 0.5;
        let x0 = fx.floor();
        let y0 = fy.floor();
        let ax = fx - x0;
        let ay = fy - y0;
        let (x0, y0) = (x0 as i64, y0 as i64);
        let taps = [
            (x0, y0, (1.0 - ax) * (1.0 - ay)),
            (x0 + 1, y0, ax * (1.0 - ay)),
            (x0, y0 + 1, (1.0 - ax) * ay),
            (x0 + 1, y0 + 1, ax * ay),
        ];
        for (x, y, w) in taps {
            if w <= 0.0 {
                continue;
            }
            self.tap(x, y, w, outside, acc);
        }
    }

    /// Nearest-pixel sample, used by the supersampling grid.
    fn point(&self, p: PointF, outside: OutsidePixels, acc: &mut Acc) {
        self.tap(p.x.floor() as i64, p.y.floor() as i64, 1.0, outside, acc);
    }

    #[inline]
    fn tap(&self, x: i64, y: i64, w: f64, outside: OutsidePixels, acc: &mut Acc) {
        if self.inside(x, y) {
            acc.add(self.fetch(x, y), w);
        } else if let OutsidePixels::Color(c) = outside {
            acc.add(self.channels_of(c), w);
        }
    }
}

/// Number of samples per axis needed to cover a destination pixel.
fn subsamples(extent: f64) -> u32 {
    if extent <= 1.0 {
        1
    } else {
        (extent.ceil() as u32).min(MAX_SUBSAMPLES)
    }
}

/// Render `src` through `xform` into `dst_rect` of the transformed space.
///
/// The result has the size of `dst_rect`; its pixel `(0, 0)` corresponds
/// to the top-left pixel of `dst_rect`. Depth is preserved and the
/// source resolution is copied.
///
/// # Errors
///
/// Returns [`TransformError::InvalidParameters`] for an empty destination
/// rectangle and [`scanout_core::Error::SingularTransform`] (wrapped) when
/// `xform` cannot be inverted.
pub fn transform(
    src: &Pix,
    xform: &Transform,
    dst_rect: Rect,
    outside: OutsidePixels,
) -> TransformResult<Pix> {
    if dst_rect.is_empty() {
        return Err(TransformError::InvalidParameters(format!(
            "empty destination rectangle {dst_rect:?}"
        )));
    }
    match src.depth() {
        PixelDepth::Bit1 => {
            let gray = transform(&src.convert_to_gray()?, xform, dst_rect, outside)?;
            Ok(gray.threshold_to_binary(128)?)
        }
        PixelDepth::Bit8 | PixelDepth::Bit32 => resample(src, xform, dst_rect, outside),
    }
}

/// Like [`transform`], but the result is always 8 bpp grayscale.
pub fn transform_to_gray(
    src: &Pix,
    xform: &Transform,
    dst_rect: Rect,
    outside: OutsidePixels,
) -> TransformResult<Pix> {
    transform(&src.convert_to_gray()?, xform, dst_rect, outside)
}

fn resample(
    src: &Pix,
    xform: &Transform,
    dst_rect: Rect,
    outside: OutsidePixels,
) -> TransformResult<Pix> {
    let inv = xform.inverted()?;
    let source = Source {
        pix: src,
        rgb: src.depth() == PixelDepth::Bit32,
    };
    let size = dst_rect.size();
    let mut out = Pix::new(size.width, size.height, src.depth())?.into_mut();
    out.copy_resolution_from(src);

    // Source-space extent of one destination pixel along each axis.
    let nx = subsamples(inv.m11.abs() + inv.m21.abs());
    let ny = subsamples(inv.m12.abs() + inv.m22.abs());
    let supersample = nx > 1 || ny > 1;

    let fallback = match outside {
        OutsidePixels::Color(c) | OutsidePixels::WeakColor(c) => Some(source.channels_of(c)),
        OutsidePixels::WeakNearest => None,
    };

    for y in 0..size.height {
        for x in 0..size.width {
            let cx = f64::from(dst_rect.x) + f64::from(x) + 0.5;
            let cy = f64::from(dst_rect.y) + f64::from(y) + 0.5;
            let mut acc = Acc::default();
            if supersample {
                for sy in 0..ny {
                    for sx in 0..nx {
                        let px = cx - 0.5 + (f64::from(sx) + 0.5) / f64::from(nx);
                        let py = cy - 0.5 + (f64::from(sy) + 0.5) / f64::from(ny);
                        source.point(inv.map_point(PointF::new(px, py)), outside, &mut acc);
                    }
                }
            } else {
                source.bilinear(inv.map_point(PointF::new(cx, cy)), outside, &mut acc);
            }

            let value = if acc.weight > 1e-9 {
                let w = acc.weight;
                acc.sum.map(|s| s / w)
            } else {
                match fallback {
                    Some(c) => c,
                    None => source.nearest(inv.map_point(PointF::new(cx, cy))),
                }
            };
            let px = if source.rgb {
                color::compose_rgb(to_u8(value[0]), to_u8(value[1]), to_u8(value[2]))
            } else {
                u32::from(to_u8(value[0]))
            };
            out.set_pixel_unchecked(x, y, px);
        }
    }

    Ok(out.into())
}

#[inline]
fn to_u8(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanout_core::Size;

    fn gradient(w: u32, h: u32) -> Pix {
        let mut pm = Pix::new(w, h, PixelDepth::Bit8).unwrap().to_mut();
        for y in 0..h {
            for x in 0..w {
                pm.set_pixel_unchecked(x, y, (x * 10 + y) % 256);
            }
        }
        pm.into()
    }

    #[test]
    fn test_identity_is_exact() {
        let pix = gradient(12, 9);
        let out = transform(&pix, &Transform::identity(), pix.rect(), OutsidePixels::white())
            .unwrap();
        for y in 0..9 {
            for x in 0..12 {
                assert_eq!(out.get_pixel(x, y), pix.get_pixel(x, y));
            }
        }
    }

    #[test]
    fn test_translation_and_outside_color() {
        let pix = gradient(10, 10);
        let xf = Transform::translation(3.0, 0.0);
        let out = transform(&pix, &xf, Rect::new(0, 0, 10, 10), OutsidePixels::black()).unwrap();
        assert_eq!(out.get_pixel(0, 4), Some(0));
        assert_eq!(out.get_pixel(5, 4), pix.get_pixel(2, 4));

        let weak = transform(
            &pix,
            &xf,
            Rect::new(0, 0, 10, 10),
            OutsidePixels::WeakColor(color::from_gray(77)),
        )
        .unwrap();
        assert_eq!(weak.get_pixel(1, 4), Some(77));
    }

    #[test]
    fn test_weak_nearest_extends_edges() {
        let pix = gradient(10, 10);
        let out = transform(
            &pix,
            &Transform::identity(),
            Rect::new(-4, 0, 18, 10),
            OutsidePixels::WeakNearest,
        )
        .unwrap();
        assert_eq!(out.size(), Size::new(18, 10));
        assert_eq!(out.get_pixel(0, 3), pix.get_pixel(0, 3));
        assert_eq!(out.get_pixel(17, 3), pix.get_pixel(9, 3));
    }

    #[test]
    fn test_downscale_averages() {
        // Alternating columns average to mid gray at half size.
        let mut pm = Pix::new(8, 8, PixelDepth::Bit8).unwrap().to_mut();
        for y in 0..8 {
            for x in (0..8).step_by(2) {
                pm.set_pixel_unchecked(x, y, 255);
            }
        }
        let pix: Pix = pm.into();
        let out = transform(
            &pix,
            &Transform::scaling(0.5, 0.5),
            Rect::new(0, 0, 4, 4),
            OutsidePixels::WeakNearest,
        )
        .unwrap();
        for x in 0..4 {
            assert_eq!(out.get_pixel(x, 2), Some(128));
        }
    }

    #[test]
    fn test_binary_and_rgb_keep_depth() {
        let mut pm = Pix::new(6, 6, PixelDepth::Bit1).unwrap().to_mut();
        pm.fill_rect(Rect::new(0, 0, 3, 6), 1);
        let bin: Pix = pm.into();
        let out = transform(&bin, &Transform::identity(), bin.rect(), OutsidePixels::white())
            .unwrap();
        assert_eq!(out.depth(), PixelDepth::Bit1);
        assert_eq!(out.count_black().unwrap(), 18);

        let rgb = Pix::new_filled(4, 4, PixelDepth::Bit32, color::compose_rgb(200, 10, 10))
            .unwrap();
        let out = transform(&rgb, &Transform::identity(), Rect::new(0, 0, 6, 4), OutsidePixels::white())
            .unwrap();
        assert_eq!(out.get_pixel(1, 1), Some(color::compose_rgb(200, 10, 10)));
        assert_eq!(out.get_pixel(5, 1), Some(color::WHITE));
    }

    #[test]
    fn test_empty_destination() {
        let pix = gradient(4, 4);
        assert!(transform(&pix, &Transform::identity(), Rect::default(), OutsidePixels::white())
            .is_err());
    }
}
