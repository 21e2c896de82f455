//! Raster dewarping

use super::cylindrical::CylindricalSurfaceDewarper;
use crate::error::{RecogError, RecogResult};
use scanout_core::{Pix, PixelDepth, PointF, Rect, Size, color};

pub struct RasterDewarper;

impl RasterDewarper {
    /// Render the flattened page.
    ///
    /// `domain` is the rectangle of the `dst_size` output that the unit
    /// square of `dewarper` stretches over; pixels outside it are
    /// extrapolated. `src` is sampled bilinearly in the coordinates the
    /// dewarper's curves are given in, and samples falling outside it
    /// take `background` (`0xRRGGBBAA`). A 1 bpp source is dewarped as
    /// grayscale and thresholded at 128.
    pub fn dewarp(
        src: &Pix,
        dst_size: Size,
        dewarper: &CylindricalSurfaceDewarper,
        domain: Rect,
        background: u32,
    ) -> RecogResult<Pix> {
        if dst_size.is_empty() || domain.is_empty() {
            return Err(RecogError::InvalidParameter(format!(
                "empty output {dst_size:?} or domain {domain:?}"
            )));
        }
        if src.depth() == PixelDepth::Bit1 {
            let gray = Self::dewarp(&src.convert_to_gray()?, dst_size, dewarper, domain, background)?;
            return Ok(gray.threshold_to_binary(128)?);
        }
        let rgb = src.depth() == PixelDepth::Bit32;
        let bg = if rgb {
            let (r, g, b) = color::extract_rgb(background);
            [f64::from(r), f64::from(g), f64::from(b)]
        } else {
            [f64::from(color::gray(background)); 3]
        };

        let mut out = Pix::new(dst_size.width, dst_size.height, src.depth())?.into_mut();
        out.copy_resolution_from(src);
        let dw = f64::from(domain.w);
        let dh = f64::from(domain.h);
        // Generatrix position per row does not depend on the column.
        let warped_v: Vec<f64> = (0..dst_size.height)
            .map(|y| dewarper.warp_v((f64::from(y) + 0.5 - f64::from(domain.y)) / dh))
            .collect();

        for x in 0..dst_size.width {
            let u = (f64::from(x) + 0.5 - f64::from(domain.x)) / dw;
            let (top, bottom) = dewarper.generatrix(u);
            for (y, &v) in warped_v.iter().enumerate() {
                let p = top.lerp(bottom, v);
                let value = sample(src, rgb, p, &bg);
                let px = if rgb {
                    color::compose_rgb(to_u8(value[0]), to_u8(value[1]), to_u8(value[2]))
                } else {
                    u32::from(to_u8(value[0]))
                };
                out.set_pixel_unchecked(x, y as u32, px);
            }
        }
        tracing::debug!(
            width = dst_size.width,
            height = dst_size.height,
            ?domain,
            "dewarped raster"
        );
        Ok(out.into())
    }
}

fn channels(src: &Pix, rgb: bool, x: u32, y: u32) -> [f64; 3] {
    let v = src.get_pixel_unchecked(x, y);
    if rgb {
        let (r, g, b) = color::extract_rgb(v);
        [f64::from(r), f64::from(g), f64::from(b)]
    } else {
        [f64::from(v); 3]
    }
}

/// Bilinear sample at the image point `p` (pixel centres at `+0.5`).
fn sample(src: &Pix, rgb: bool, p: PointF, bg: &[f64; 3]) -> [f64; 3] {
    let (w, h) = (f64::from(src.width()), f64::from(src.height()));
    if !(p.x >= 0.0 && p.y >= 0.0 && p.x < w && p.y < h) {
        return *bg;
    }
    let fx = (p.x - 0.5).max(0.0);
    let fy = (p.y - 0.5).max(0.0);
    let x0 = (fx.floor() as u32).min(src.width() - 1);
    let y0 = (fy.floor() as u32).min(src.height() - 1);
    let x1 = (x0 + 1).min(src.width() - 1);
    let y1 = (y0 + 1).min(src.height() - 1);
    let (ax, ay) = (fx - f64::from(x0), fy - f64::from(y0));
    let c00 = channels(src, rgb, x0, y0);
    let c10 = channels(src, rgb, x1, y0);
    let c01 = channels(src, rgb, x0, y1);
    let c11 = channels(src, rgb, x1, y1);
    let mut out = [0.0; 3];
    for i in 0..3 {
        let top = c00[i] + (c10[i] - c00[i]) * ax;
        let bottom = c01[i] + (c11[i] - c01[i]) * ax;
        out[i] = top + (bottom - top) * ay;
    }
    out
}

#[inline]
fn to_u8(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}
