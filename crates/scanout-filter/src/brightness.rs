//! Brightness transfer from a grayscale image onto a color image

use crate::{FilterError, FilterResult};
use scanout_core::{Pix, PixelDepth, color};

/// Set the luminance of every pixel of `rgb` to the level of the matching
/// pixel of `brightness`, keeping its chroma.
///
/// Chroma is kept by shifting all three channels by the same amount;
/// channels are clamped to `0..=255`. A grayscale `rgb` yields a copy of
/// `brightness`.
pub fn adjust_brightness_grayscale(rgb: &Pix, brightness: &Pix) -> FilterResult<Pix> {
    if brightness.depth() != PixelDepth::Bit8 {
        return Err(FilterError::UnsupportedDepth {
            expected: "8 bpp brightness",
            actual: brightness.depth().bits(),
        });
    }
    if !rgb.same_dimensions(brightness) {
        return Err(scanout_core::Error::IncompatibleSizes(
            rgb.width(),
            rgb.height(),
            brightness.width(),
            brightness.height(),
        )
        .into());
    }
    match rgb.depth() {
        PixelDepth::Bit8 => Ok(brightness.deep_clone()),
        PixelDepth::Bit32 => {
            let mut out = rgb.to_mut();
            for y in 0..rgb.height() {
                for x in 0..rgb.width() {
                    let px = rgb.get_pixel_unchecked(x, y);
                    let shift = brightness.get_pixel_unchecked(x, y) as i32
                        - i32::from(color::gray(px));
                    let (r, g, b) = color::extract_rgb(px);
                    let ch = |c: u8| (i32::from(c) + shift).clamp(0, 255) as u8;
                    out.set_pixel_unchecked(
                        x,
                        y,
                        color::compose_rgba(ch(r), ch(g), ch(b), color::alpha(px)),
                    );
                }
            }
            Ok(out.into())
        }
        other => Err(FilterError::UnsupportedDepth {
            expected: "8 or 32 bpp",
            actual: other.bits(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brightness_shift_keeps_chroma() {
        let rgb = Pix::new_filled(2, 2, PixelDepth::Bit32, color::compose_rgb(100, 120, 80)).unwrap();
        let gray_before = color::gray(color::compose_rgb(100, 120, 80));
        let target = Pix::new_filled(2, 2, PixelDepth::Bit8, u32::from(gray_before) + 50).unwrap();
        let out = adjust_brightness_grayscale(&rgb, &target).unwrap();
        assert_eq!(out.get_rgb(1, 1), Some((150, 170, 130)));
    }

    #[test]
    fn test_gray_input_takes_brightness() {
        let gray = Pix::new_filled(3, 3, PixelDepth::Bit8, 10).unwrap();
        let target = Pix::new_filled(3, 3, PixelDepth::Bit8, 200).unwrap();
        let out = adjust_brightness_grayscale(&gray, &target).unwrap();
        assert_eq!(out.get_pixel(0, 0), Some(200));
        let small = Pix::new(2, 3, PixelDepth::Bit8).unwrap();
        assert!(adjust_brightness_grayscale(&gray, &small).is_err());
    }
}
