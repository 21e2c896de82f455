//! Binarization of the normalized page
//!
//! [`Binarizer`] turns a grayscale or color page into 1 bpp using the
//! method selected in [`BlackWhiteOptions`]. A crop polygon and a mask
//! restrict the result: black survives only inside the (slightly eroded)
//! polygon and where the mask is black.

use crate::error::OutputResult;
use crate::params::{BinarizationMethod, BlackWhiteOptions};
use scanout_color::{
    GrayscaleHistogram, adjust_threshold, binarize_sauvola, binarize_threshold, binarize_wolf,
    calc_local_window_size, otsu_threshold, otsu_threshold_of,
};
use scanout_core::{BwColor, Dpi, FillRule, Pix, PixelDepth, Polygon, PolygonRasterizer, Size};
use scanout_morph::erode_brick;

#[derive(Debug, Clone, Copy)]
pub struct Binarizer {
    options: BlackWhiteOptions,
    white_on_black: bool,
    dpi: Dpi,
}

impl Binarizer {
    pub fn new(options: BlackWhiteOptions, white_on_black: bool, dpi: Dpi) -> Self {
        Binarizer {
            options,
            white_on_black,
            dpi,
        }
    }

    /// Apply the user's threshold adjustment, bounded to `30..=225`.
    pub fn adjust_threshold(&self, threshold: u8) -> u8 {
        adjust_threshold(threshold, self.options.threshold_adjustment)
    }

    fn window(&self) -> Size {
        match self.options.window_size {
            0 => calc_local_window_size(self.dpi),
            ws => Size::new(ws, ws),
        }
    }

    /// Binarize the whole image. 1 bpp input is returned as is.
    pub fn binarize(&self, image: &Pix) -> OutputResult<Pix> {
        if image.depth() == PixelDepth::Bit1 {
            return Ok(image.clone());
        }
        let opts = &self.options;
        let binarized = match opts.binarization_method {
            BinarizationMethod::Otsu => {
                let threshold = self.adjust_threshold(otsu_threshold_of(image)?);
                tracing::debug!(threshold, "otsu binarization");
                binarize_threshold(image, threshold)?
            }
            BinarizationMethod::Sauvola => {
                let gray = self.local_input(image)?;
                let bw = binarize_sauvola(&gray, self.window(), opts.sauvola_coef)?;
                self.local_output(bw)
            }
            BinarizationMethod::Wolf => {
                let gray = self.local_input(image)?;
                let bw = binarize_wolf(
                    &gray,
                    self.window(),
                    opts.wolf_lower_bound,
                    opts.wolf_upper_bound,
                    opts.wolf_coef,
                )?;
                self.local_output(bw)
            }
        };
        Ok(binarized)
    }

    // Local methods look for dark text; white-on-black pages are flipped
    // before and after.
    fn local_input(&self, image: &Pix) -> OutputResult<Pix> {
        let gray = image.convert_to_gray()?;
        Ok(if self.white_on_black {
            gray.invert()
        } else {
            gray
        })
    }

    fn local_output(&self, bw: Pix) -> Pix {
        if self.white_on_black { bw.invert() } else { bw }
    }

    /// Binarize, then clear black outside the black area of `mask`.
    pub fn binarize_masked(&self, image: &Pix, mask: &Pix) -> OutputResult<Pix> {
        let mut binarized = self.binarize(image)?.into_mut();
        binarized.and_inplace(mask)?;
        Ok(binarized.into())
    }

    /// Binarize restricted to `crop_area` (image coordinates) and the
    /// optional mask.
    pub fn binarize_with_crop(
        &self,
        image: &Pix,
        crop_area: &Polygon,
        mask: Option<&Pix>,
    ) -> OutputResult<Pix> {
        if mask.is_none() && crop_area.contains_rect(&image.rect()) {
            let threshold = self.adjust_threshold(otsu_threshold_of(image)?);
            return Ok(binarize_threshold(image, threshold)?);
        }
        let crop_mask = crop_mask(image, crop_area, mask)?;
        self.binarize_masked(image, &crop_mask)
    }

    /// Otsu threshold of the pixels inside `crop_area` and the optional
    /// mask, with the user's adjustment applied.
    pub fn calc_binarization_threshold(
        &self,
        image: &Pix,
        crop_area: &Polygon,
        mask: Option<&Pix>,
    ) -> OutputResult<u8> {
        if mask.is_none() && crop_area.contains_rect(&image.rect()) {
            return Ok(self.adjust_threshold(otsu_threshold_of(image)?));
        }
        let crop_mask = crop_mask(image, crop_area, mask)?;
        let hist = GrayscaleHistogram::with_mask(image, &crop_mask)?;
        Ok(self.adjust_threshold(otsu_threshold(&hist)))
    }
}

/// Black inside `crop_area` shrunk by a pixel, ANDed with `mask`.
fn crop_mask(image: &Pix, crop_area: &Polygon, mask: Option<&Pix>) -> OutputResult<Pix> {
    let mut modified = Pix::new_black(image.size(), PixelDepth::Bit1)?.into_mut();
    PolygonRasterizer::fill_except(&mut modified, 0, crop_area, FillRule::Winding);
    let mut modified = erode_brick(&modified.into(), 3, 3, BwColor::White)?.into_mut();
    if let Some(mask) = mask {
        modified.and_inplace(mask)?;
    }
    Ok(modified.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanout_core::{Rect, RectF};
    use scanout_test::synth::gray_text_page;

    fn binarizer(method: BinarizationMethod) -> Binarizer {
        let opts = BlackWhiteOptions {
            binarization_method: method,
            window_size: 31,
            ..Default::default()
        };
        Binarizer::new(opts, false, Dpi::square(300))
    }

    #[test]
    fn test_all_methods_find_text() {
        let page = gray_text_page(120, 100, 10, 3);
        for method in [
            BinarizationMethod::Otsu,
            BinarizationMethod::Sauvola,
            BinarizationMethod::Wolf,
        ] {
            let bw = binarizer(method).binarize(&page).unwrap();
            assert_eq!(bw.depth(), PixelDepth::Bit1);
            // First bar starts at row 10, column 12.
            assert_eq!(bw.get_pixel(40, 11), Some(1), "{method:?}");
            assert_eq!(bw.get_pixel(40, 5), Some(0), "{method:?}");
        }
    }

    #[test]
    fn test_white_on_black_local_method() {
        let page = gray_text_page(120, 100, 10, 3).invert();
        let opts = BlackWhiteOptions {
            binarization_method: BinarizationMethod::Sauvola,
            window_size: 31,
            ..Default::default()
        };
        let bw = Binarizer::new(opts, true, Dpi::square(300)).binarize(&page).unwrap();
        // Dark background stays black, bright strokes turn white.
        assert_eq!(bw.get_pixel(40, 5), Some(1));
        assert_eq!(bw.get_pixel(40, 11), Some(0));
    }

    #[test]
    fn test_crop_area_clears_outside() {
        let page = gray_text_page(120, 100, 10, 3);
        let b = binarizer(BinarizationMethod::Otsu);
        let crop = Polygon::from_rect(&RectF::new(0.0, 0.0, 60.0, 100.0));
        let bw = b.binarize_with_crop(&page, &crop, None).unwrap();
        assert_eq!(bw.get_pixel(30, 11), Some(1));
        assert_eq!(bw.get_pixel(90, 11), Some(0));

        let mut mask = Pix::new_black(page.size(), PixelDepth::Bit1).unwrap().into_mut();
        mask.fill_rect(Rect::new(0, 0, 40, 100), 0);
        let full = Polygon::from_rect(&RectF::new(0.0, 0.0, 120.0, 100.0));
        let bw = b.binarize_with_crop(&page, &full, Some(&mask.into())).unwrap();
        assert_eq!(bw.get_pixel(30, 11), Some(0));
        assert_eq!(bw.get_pixel(50, 11), Some(1));
    }

    #[test]
    fn test_threshold_adjustment_is_bounded() {
        let opts = BlackWhiteOptions::default().with_threshold_adjustment(-50);
        let b = Binarizer::new(opts, false, Dpi::square(300));
        assert_eq!(b.adjust_threshold(60), 30);
        let page = gray_text_page(120, 100, 10, 3);
        let full = Polygon::from_rect(&RectF::new(0.0, 0.0, 120.0, 100.0));
        let masked = Polygon::from_rect(&RectF::new(10.0, 5.0, 100.0, 90.0));
        let t_full = b.calc_binarization_threshold(&page, &full, None).unwrap();
        let t_masked = b.calc_binarization_threshold(&page, &masked, None).unwrap();
        assert!((30..=225).contains(&t_full));
        assert!((30..=225).contains(&t_masked));
    }
}
