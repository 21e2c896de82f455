//! Local (adaptive) binarization
//!
//! Both methods compare every pixel with a threshold computed from the
//! mean and standard deviation of a window centred on it. Window sums
//! come from integral images, so the cost does not depend on the window
//! size. Windows are clipped to the image.

use crate::{ColorError, ColorResult};
use scanout_core::{Dpi, Pix, PixelDepth, Size};

/// Window statistics over a gray image.
struct IntegralImages {
    w: usize,
    h: usize,
    sum: Vec<u64>,
    sum_sq: Vec<u64>,
}

impl IntegralImages {
    fn new(gray: &Pix) -> Self {
        let w = gray.width() as usize;
        let h = gray.height() as usize;
        let stride = w + 1;
        let mut sum = vec![0u64; stride * (h + 1)];
        let mut sum_sq = vec![0u64; stride * (h + 1)];
        for y in 0..h {
            let mut row = 0u64;
            let mut row_sq = 0u64;
            for x in 0..w {
                let v = u64::from(gray.get_pixel_unchecked(x as u32, y as u32));
                row += v;
                row_sq += v * v;
                let i = (y + 1) * stride + x + 1;
                sum[i] = sum[i - stride] + row;
                sum_sq[i] = sum_sq[i - stride] + row_sq;
            }
        }
        IntegralImages { w, h, sum, sum_sq }
    }

    /// Mean and standard deviation of the window of `window` centred at
    /// `(x, y)`.
    fn stats(&self, x: usize, y: usize, window: Size) -> (f64, f64) {
        let half_w = window.width as usize / 2;
        let half_h = window.height as usize / 2;
        let x0 = x.saturating_sub(half_w);
        let y0 = y.saturating_sub(half_h);
        let x1 = (x0 + window.width as usize).min(self.w);
        let y1 = (y0 + window.height as usize).min(self.h);
        let stride = self.w + 1;
        let area = ((x1 - x0) * (y1 - y0)) as f64;
        let rect = |t: &[u64]| {
            (t[y1 * stride + x1] + t[y0 * stride + x0]) as f64
                - (t[y0 * stride + x1] + t[y1 * stride + x0]) as f64
        };
        let mean = rect(&self.sum) / area;
        let var = (rect(&self.sum_sq) / area - mean * mean).max(0.0);
        (mean, var.sqrt())
    }
}

fn check_input(gray: &Pix, window: Size) -> ColorResult<()> {
    if gray.depth() != PixelDepth::Bit8 {
        return Err(ColorError::UnsupportedDepth {
            expected: "8 bpp",
            actual: gray.depth().bits(),
        });
    }
    if window.is_empty() {
        return Err(ColorError::InvalidParameters(format!(
            "window must not be empty, got {}x{}",
            window.width, window.height
        )));
    }
    Ok(())
}

/// Sauvola binarization.
///
/// Threshold `T = mean * (1 + k * (stddev / 128 - 1))`; pixels below `T`
/// become black.
pub fn binarize_sauvola(gray: &Pix, window: Size, k: f64) -> ColorResult<Pix> {
    check_input(gray, window)?;
    let integral = IntegralImages::new(gray);
    let mut out = Pix::new(gray.width(), gray.height(), PixelDepth::Bit1)?.into_mut();
    out.copy_resolution_from(gray);
    for y in 0..integral.h {
        for x in 0..integral.w {
            let (mean, dev) = integral.stats(x, y, window);
            let threshold = mean * (1.0 + k * (dev / 128.0 - 1.0));
            if f64::from(gray.get_pixel_unchecked(x as u32, y as u32)) < threshold {
                out.set_pixel_unchecked(x as u32, y as u32, 1);
            }
        }
    }
    Ok(out.into())
}

/// Wolf-Jolion binarization.
///
/// Threshold `T = mean - k * (1 - stddev / max_stddev) * (mean - min_gray)`
/// where `min_gray` is the darkest pixel of the image and `max_stddev`
/// the largest window deviation. Pixels below `lower_bound` are always
/// black, pixels above `upper_bound` always white.
pub fn binarize_wolf(
    gray: &Pix,
    window: Size,
    lower_bound: u8,
    upper_bound: u8,
    k: f64,
) -> ColorResult<Pix> {
    check_input(gray, window)?;
    if lower_bound > upper_bound {
        return Err(ColorError::InvalidParameters(format!(
            "lower bound {lower_bound} exceeds upper bound {upper_bound}"
        )));
    }
    let integral = IntegralImages::new(gray);
    let (w, h) = (integral.w, integral.h);

    let mut min_gray = 255u32;
    let mut stats = Vec::with_capacity(w * h);
    let mut max_dev = 0.0f64;
    for y in 0..h {
        for x in 0..w {
            min_gray = min_gray.min(gray.get_pixel_unchecked(x as u32, y as u32));
            let s = integral.stats(x, y, window);
            max_dev = max_dev.max(s.1);
            stats.push(s);
        }
    }
    let max_dev = max_dev.max(1e-6);
    let min_gray = f64::from(min_gray);

    let mut out = Pix::new(gray.width(), gray.height(), PixelDepth::Bit1)?.into_mut();
    out.copy_resolution_from(gray);
    for y in 0..h {
        for x in 0..w {
            let v = gray.get_pixel_unchecked(x as u32, y as u32);
            let black = if v < u32::from(lower_bound) {
                true
            } else if v > u32::from(upper_bound) {
                false
            } else {
                let (mean, dev) = stats[y * w + x];
                let threshold = mean - k * (1.0 - dev / max_dev) * (mean - min_gray);
                f64::from(v) < threshold
            };
            if black {
                out.set_pixel_unchecked(x as u32, y as u32, 1);
            }
        }
    }
    tracing::trace!(min_gray, max_dev, "wolf binarization");
    Ok(out.into())
}

/// Window of 3 x 30 millimetres at `dpi`, each side at least 3 pixels.
pub fn calc_local_window_size(dpi: Dpi) -> Size {
    let to_px = |mm: f64, d: u32| ((mm * f64::from(d) / 25.4).round() as u32).max(3);
    Size::new(to_px(3.0, dpi.horizontal), to_px(30.0, dpi.vertical))
}
