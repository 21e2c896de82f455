//! Grayscale histograms
//!
//! Color images are counted by their luminance. A mask restricts the
//! count to pixels where the mask is black.

use crate::{ColorError, ColorResult};
use scanout_core::{Pix, PixelDepth};

/// 256-bin histogram of gray levels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayscaleHistogram {
    counts: [u32; 256],
}

impl Default for GrayscaleHistogram {
    fn default() -> Self {
        GrayscaleHistogram { counts: [0; 256] }
    }
}

impl GrayscaleHistogram {
    /// Histogram of every pixel of `pix` (any depth).
    pub fn new(pix: &Pix) -> ColorResult<Self> {
        let gray = pix.convert_to_gray()?;
        let mut hist = GrayscaleHistogram::default();
        for y in 0..gray.height() {
            for x in 0..gray.width() {
                hist.counts[gray.get_pixel_unchecked(x, y) as usize] += 1;
            }
        }
        Ok(hist)
    }

    /// Histogram of the pixels of `pix` under black pixels of `mask`.
    ///
    /// # Errors
    ///
    /// `mask` must be 1 bpp and have the size of `pix`.
    pub fn with_mask(pix: &Pix, mask: &Pix) -> ColorResult<Self> {
        if mask.depth() != PixelDepth::Bit1 {
            return Err(ColorError::UnsupportedDepth {
                expected: "1 bpp mask",
                actual: mask.depth().bits(),
            });
        }
        if !pix.same_dimensions(mask) {
            return Err(ColorError::InvalidParameters(format!(
                "mask is {}x{}, image is {}x{}",
                mask.width(),
                mask.height(),
                pix.width(),
                pix.height()
            )));
        }
        let gray = pix.convert_to_gray()?;
        let mut hist = GrayscaleHistogram::default();
        for y in 0..gray.height() {
            for x in 0..gray.width() {
                if mask.get_pixel_unchecked(x, y) != 0 {
                    hist.counts[gray.get_pixel_unchecked(x, y) as usize] += 1;
                }
            }
        }
        Ok(hist)
    }

    #[inline]
    pub fn get(&self, level: u8) -> u32 {
        self.counts[level as usize]
    }

    pub fn counts(&self) -> &[u32; 256] {
        &self.counts
    }

    /// Total number of counted pixels.
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| u64::from(c)).sum()
    }
}
