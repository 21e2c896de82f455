//! Output split into foreground and background layers
//!
//! A split page is either an explicit pair of layers, or a composited
//! image plus a mask. Black mask pixels belong to the foreground (text),
//! white ones to the background (pictures).

use crate::error::{OutputError, OutputResult};
use scanout_core::{Dpi, Pix, PixelDepth};

#[derive(Debug, Clone, Default)]
pub struct SplitImage {
    foreground: Option<Pix>,
    background: Option<Pix>,
    mask: Option<Pix>,
    binary_foreground: bool,
}

impl SplitImage {
    pub fn new() -> Self {
        Self::default()
    }

    /// A pair of explicit layers.
    pub fn from_layers(foreground: Pix, background: Pix) -> Self {
        SplitImage {
            binary_foreground: foreground.depth() == PixelDepth::Bit1,
            foreground: Some(foreground),
            background: Some(background),
            mask: None,
        }
    }

    pub fn set_foreground(&mut self, pix: Pix) {
        self.binary_foreground = pix.depth() == PixelDepth::Bit1;
        self.foreground = Some(pix);
    }

    pub fn set_background(&mut self, pix: Pix) {
        self.background = Some(pix);
    }

    /// Set the 1 bpp layer mask. With `binary_foreground` the derived
    /// foreground is thresholded to 1 bpp.
    pub fn set_mask(&mut self, mask: Pix, binary_foreground: bool) {
        self.mask = Some(mask);
        self.binary_foreground = binary_foreground;
    }

    pub fn mask(&self) -> Option<&Pix> {
        self.mask.as_ref()
    }

    pub fn is_binary_foreground(&self) -> bool {
        self.binary_foreground
    }

    pub fn is_null(&self) -> bool {
        self.background.is_none() && self.foreground.is_none()
    }

    /// The foreground layer, derived from the mask when not set.
    pub fn foreground(&self) -> OutputResult<Option<Pix>> {
        if let Some(fg) = &self.foreground {
            return Ok(Some(fg.clone()));
        }
        let (Some(bg), Some(mask)) = (&self.background, &self.mask) else {
            return Ok(None);
        };
        let layer = keep_where(bg, mask, true)?;
        if self.binary_foreground {
            return Ok(Some(layer.threshold_to_binary(128)?));
        }
        Ok(Some(layer))
    }

    /// The background layer; with a mask, foreground pixels turn white.
    pub fn background(&self) -> OutputResult<Option<Pix>> {
        let Some(bg) = &self.background else {
            return Ok(None);
        };
        match (&self.mask, &self.foreground) {
            (Some(mask), None) => Ok(Some(keep_where(bg, mask, false)?)),
            _ => Ok(Some(bg.clone())),
        }
    }

    /// Stamp `dpi` on every present layer.
    pub fn apply_dpi(&mut self, dpi: Dpi) {
        for layer in [&mut self.foreground, &mut self.background, &mut self.mask] {
            if let Some(pix) = layer.take() {
                let mut pm = pix.into_mut();
                pm.set_dpi(dpi);
                *layer = Some(pm.into());
            }
        }
    }
}

/// Copy of `image` with pixels whose mask is not `black` turned white.
fn keep_where(image: &Pix, mask: &Pix, black: bool) -> OutputResult<Pix> {
    if mask.depth() != PixelDepth::Bit1 {
        return Err(OutputError::UnsupportedDepth {
            expected: "1 bpp mask",
            actual: mask.depth().bits(),
        });
    }
    if !image.same_dimensions(mask) {
        return Err(OutputError::InvalidParameters(format!(
            "mask size {:?} differs from image size {:?}",
            mask.size(),
            image.size()
        )));
    }
    let white = image.depth().white();
    let mut out = image.to_mut();
    for y in 0..image.height() {
        for x in 0..image.width() {
            if (mask.get_pixel_unchecked(x, y) == 1) != black {
                out.set_pixel_unchecked(x, y, white);
            }
        }
    }
    Ok(out.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanout_core::{Rect, Size};

    fn layers() -> (Pix, Pix) {
        let mut bg = Pix::new_filled(6, 4, PixelDepth::Bit8, 90).unwrap().to_mut();
        bg.fill_rect(Rect::new(0, 0, 3, 4), 10);
        let mut mask = Pix::new(6, 4, PixelDepth::Bit1).unwrap().to_mut();
        mask.fill_rect(Rect::new(0, 0, 3, 4), 1);
        (bg.into(), mask.into())
    }

    #[test]
    fn test_layers_from_mask() {
        let (bg, mask) = layers();
        let mut split = SplitImage::new();
        split.set_background(bg);
        split.set_mask(mask, true);
        let fg = split.foreground().unwrap().unwrap();
        assert_eq!(fg.depth(), PixelDepth::Bit1);
        assert_eq!(fg.get_pixel(1, 1), Some(1));
        assert_eq!(fg.get_pixel(4, 1), Some(0));
        let back = split.background().unwrap().unwrap();
        assert_eq!(back.get_pixel(1, 1), Some(255));
        assert_eq!(back.get_pixel(4, 1), Some(90));
    }

    #[test]
    fn test_color_foreground_keeps_pixels() {
        let (bg, mask) = layers();
        let mut split = SplitImage::new();
        split.set_background(bg);
        split.set_mask(mask, false);
        let fg = split.foreground().unwrap().unwrap();
        assert_eq!(fg.depth(), PixelDepth::Bit8);
        assert_eq!(fg.get_pixel(1, 1), Some(10));
        assert_eq!(fg.get_pixel(5, 3), Some(255));
    }

    #[test]
    fn test_apply_dpi_to_layers() {
        let white = Pix::new_white(Size::new(3, 3), PixelDepth::Bit1).unwrap();
        let mut split = SplitImage::from_layers(white.clone(), white.convert_to_gray().unwrap());
        assert!(split.is_binary_foreground());
        split.apply_dpi(Dpi::square(600));
        assert_eq!(split.foreground().unwrap().unwrap().dpi(), Dpi::square(600));
        assert_eq!(split.background().unwrap().unwrap().dpi(), Dpi::square(600));
        assert!(SplitImage::new().is_null());
    }
}
