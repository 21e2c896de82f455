//! Depth conversion
//!
//! - Any depth to 8 bpp gray ([`Pix::convert_to_gray`])
//! - Any depth to 32 bpp RGB ([`Pix::convert_to_rgb`])
//! - Fixed-threshold binarization ([`Pix::threshold_to_binary`])

use super::{Pix, PixelDepth};
use crate::color;
use crate::error::Result;

impl Pix {
    /// Convert to 8 bpp grayscale.
    ///
    /// 1 bpp maps black to 0 and white to 255; 32 bpp uses
    /// [`color::gray`] luminance. An 8 bpp image is returned as a
    /// shared clone.
    pub fn convert_to_gray(&self) -> Result<Pix> {
        let src_depth = self.depth();
        if src_depth == PixelDepth::Bit8 {
            return Ok(self.clone());
        }
        let mut out = Pix::new(self.width(), self.height(), PixelDepth::Bit8)?.into_mut();
        out.copy_resolution_from(self);
        for y in 0..self.height() {
            for x in 0..self.width() {
                let v = self.get_pixel_unchecked(x, y);
                let g = match src_depth {
                    PixelDepth::Bit1 => {
                        if v != 0 {
                            0
                        } else {
                            255
                        }
                    }
                    PixelDepth::Bit32 => u32::from(color::gray(v)),
                    PixelDepth::Bit8 => v,
                };
                out.set_pixel_unchecked(x, y, g);
            }
        }
        Ok(out.into())
    }

    /// Convert to 32 bpp opaque RGB.
    pub fn convert_to_rgb(&self) -> Result<Pix> {
        let src_depth = self.depth();
        if src_depth == PixelDepth::Bit32 {
            return Ok(self.clone());
        }
        let mut out = Pix::new(self.width(), self.height(), PixelDepth::Bit32)?.into_mut();
        out.copy_resolution_from(self);
        for y in 0..self.height() {
            for x in 0..self.width() {
                let v = self.get_pixel_unchecked(x, y);
                let rgb = match src_depth {
                    PixelDepth::Bit1 => {
                        if v != 0 {
                            color::BLACK
                        } else {
                            color::WHITE
                        }
                    }
                    _ => color::from_gray(v as u8),
                };
                out.set_pixel_unchecked(x, y, rgb);
            }
        }
        Ok(out.into())
    }

    /// Binarize with a fixed threshold.
    ///
    /// A pixel whose gray level is below `threshold` becomes black.
    /// 1 bpp input is returned unchanged.
    pub fn threshold_to_binary(&self, threshold: u32) -> Result<Pix> {
        if self.depth() == PixelDepth::Bit1 {
            return Ok(self.clone());
        }
        let gray = self.convert_to_gray()?;
        let mut out = Pix::new(self.width(), self.height(), PixelDepth::Bit1)?.into_mut();
        out.copy_resolution_from(self);
        for y in 0..gray.height() {
            let src = gray.row_data(y);
            let dst = out.row_data_mut(y);
            for x in 0..gray.width() {
                if super::get_data_byte(src, x) < threshold {
                    super::set_data_bit(dst, x, 1);
                }
            }
        }
        Ok(out.into())
    }

    /// True if the image carries no chroma.
    ///
    /// 1 and 8 bpp images are always gray; 32 bpp images are gray when
    /// every pixel has equal color channels.
    pub fn is_all_gray(&self) -> bool {
        match self.depth() {
            PixelDepth::Bit1 | PixelDepth::Bit8 => true,
            PixelDepth::Bit32 => (0..self.height()).all(|y| {
                self.row_data(y)[..self.width() as usize]
                    .iter()
                    .all(|&p| color::is_gray(p))
            }),
        }
    }

    /// Convert to 8 bpp if the image has no chroma, otherwise to 32 bpp.
    ///
    /// Binary input becomes gray.
    pub fn convert_to_gray_or_rgb(&self) -> Result<Pix> {
        if self.is_all_gray() {
            self.convert_to_gray()
        } else {
            Ok(self.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_to_gray() {
        let mut pm = Pix::new(3, 1, PixelDepth::Bit1).unwrap().to_mut();
        pm.set_pixel(1, 0, 1).unwrap();
        let gray = Pix::from(pm).convert_to_gray().unwrap();
        assert_eq!(gray.get_pixel(0, 0), Some(255));
        assert_eq!(gray.get_pixel(1, 0), Some(0));
    }

    #[test]
    fn test_threshold_to_binary() {
        let mut pm = Pix::new(3, 1, PixelDepth::Bit8).unwrap().to_mut();
        pm.set_pixel(0, 0, 10).unwrap();
        pm.set_pixel(1, 0, 127).unwrap();
        pm.set_pixel(2, 0, 128).unwrap();
        let bin = Pix::from(pm).threshold_to_binary(128).unwrap();
        assert_eq!(bin.get_pixel(0, 0), Some(1));
        assert_eq!(bin.get_pixel(1, 0), Some(1));
        assert_eq!(bin.get_pixel(2, 0), Some(0));
    }

    #[test]
    fn test_rgb_roundtrip_gray() {
        let gray = Pix::new_filled(2, 2, PixelDepth::Bit8, 90).unwrap();
        let rgb = gray.convert_to_rgb().unwrap();
        assert!(rgb.is_all_gray());
        assert_eq!(rgb.convert_to_gray().unwrap().get_pixel(1, 1), Some(90));
    }

    #[test]
    fn test_is_all_gray_detects_color() {
        let mut pm = Pix::new_filled(2, 2, PixelDepth::Bit32, color::WHITE)
            .unwrap()
            .to_mut();
        pm.set_rgb(1, 1, 255, 0, 0).unwrap();
        let pix: Pix = pm.into();
        assert!(!pix.is_all_gray());
        assert_eq!(pix.convert_to_gray_or_rgb().unwrap().depth(), PixelDepth::Bit32);
    }
}
