//! Gray range stretching

use crate::{FilterError, FilterResult};
use scanout_color::GrayscaleHistogram;
use scanout_core::{Pix, PixelDepth};

/// Stretch the gray levels of `gray` to the full `0..=255` range.
///
/// The darkest `black_clip_fraction` and the lightest
/// `white_clip_fraction` of the pixels are clipped to black and white;
/// levels between are mapped linearly. An image whose remaining range
/// collapses to a single level is returned unchanged.
pub fn stretch_gray_range(
    gray: &Pix,
    black_clip_fraction: f64,
    white_clip_fraction: f64,
) -> FilterResult<Pix> {
    if gray.depth() != PixelDepth::Bit8 {
        return Err(FilterError::UnsupportedDepth {
            expected: "8 bpp",
            actual: gray.depth().bits(),
        });
    }
    for f in [black_clip_fraction, white_clip_fraction] {
        if !(0.0..0.5).contains(&f) {
            return Err(FilterError::InvalidParameters(format!(
                "clip fraction must be in [0, 0.5), got {f}"
            )));
        }
    }
    let hist = GrayscaleHistogram::new(gray)?;
    let total = hist.total() as f64;
    let counts = hist.counts();

    let black_budget = (total * black_clip_fraction) as u64;
    let mut acc = 0u64;
    let mut lo = 0usize;
    for (level, &c) in counts.iter().enumerate() {
        acc += u64::from(c);
        if acc > black_budget {
            lo = level;
            break;
        }
    }
    let white_budget = (total * white_clip_fraction) as u64;
    let mut acc = 0u64;
    let mut hi = 255usize;
    for (level, &c) in counts.iter().enumerate().rev() {
        acc += u64::from(c);
        if acc > white_budget {
            hi = level;
            break;
        }
    }
    if hi <= lo {
        return Ok(gray.clone());
    }

    let mut lut = [0u8; 256];
    let range = (hi - lo) as f64;
    for (level, out) in lut.iter_mut().enumerate() {
        let t = (level as f64 - lo as f64) / range;
        *out = (t * 255.0).round().clamp(0.0, 255.0) as u8;
    }
    let mut out = gray.to_mut();
    for y in 0..gray.height() {
        for x in 0..gray.width() {
            let v = gray.get_pixel_unchecked(x, y) as usize;
            out.set_pixel_unchecked(x, y, u32::from(lut[v]));
        }
    }
    Ok(out.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanout_core::Rect;

    #[test]
    fn test_stretch_to_full_range() {
        let mut pm = Pix::new_filled(10, 10, PixelDepth::Bit8, 150).unwrap().into_mut();
        pm.fill_rect(Rect::new(0, 0, 10, 5), 100);
        pm.set_pixel(0, 9, 149).unwrap();
        let out = stretch_gray_range(&pm.into(), 0.0, 0.0).unwrap();
        assert_eq!(out.get_pixel(0, 0), Some(0));
        assert_eq!(out.get_pixel(5, 5), Some(255));
        assert_eq!(out.get_pixel(0, 9), Some(250));
    }

    #[test]
    fn test_stretch_clips_tails() {
        let mut pm = Pix::new_filled(10, 10, PixelDepth::Bit8, 128).unwrap().into_mut();
        pm.fill_rect(Rect::new(0, 0, 10, 5), 64);
        // One outlier on each end.
        pm.set_pixel(0, 0, 0).unwrap();
        pm.set_pixel(9, 9, 255).unwrap();
        let out = stretch_gray_range(&pm.into(), 0.01, 0.01).unwrap();
        assert_eq!(out.get_pixel(5, 0), Some(0));
        assert_eq!(out.get_pixel(5, 9), Some(255));
    }

    #[test]
    fn test_flat_image_unchanged() {
        let flat = Pix::new_filled(4, 4, PixelDepth::Bit8, 77).unwrap();
        let out = stretch_gray_range(&flat, 0.01, 0.01).unwrap();
        assert_eq!(out.get_pixel(2, 2), Some(77));
        assert!(stretch_gray_range(&flat, 0.6, 0.0).is_err());
    }
}
