//! Picture region detection
//!
//! Pictures are told apart from text by local contrast: text is thin
//! dark strokes on a flat background, so its min/max gradient vanishes
//! under a large max filter, while pictures keep large areas of mid-tone
//! gradient. Detection runs at 300 dpi.

use crate::context::PipelineContext;
use crate::error::OutputResult;
use crate::zone::{PictureLayer, ZoneSet};
use scanout_core::{
    BwColor, Dpi, FillRule, Pix, PixMut, PixelDepth, PolygonRasterizer, Rect, Size, Transform,
};
use scanout_filter::stretch_gray_range;
use scanout_morph::{dilate_gray, erode_gray};
use scanout_region::{ConnectivityType, seedfill_gray_inv};
use scanout_transform::scale_to_size;

/// Gray levels below this in the rescaled picture map are not pictures.
const PICTURE_THRESHOLD: u32 = 48;

fn rescaled(size: Size, hscale: f64, vscale: f64) -> Size {
    Size::new(
        ((f64::from(size.width) * hscale).round() as u32).max(1),
        ((f64::from(size.height) * vscale).round() as u32).max(1),
    )
}

/// Size of an image of `size` at `source_dpi` once resampled to 300 dpi.
pub fn to_300dpi(size: Size, source_dpi: Dpi) -> Size {
    if source_dpi.is_null() {
        return size.expanded_to_one();
    }
    rescaled(
        size,
        300.0 / f64::from(source_dpi.horizontal),
        300.0 / f64::from(source_dpi.vertical),
    )
}

/// Size of a 300 dpi image of `size` once resampled to `target_dpi`.
pub fn from_300dpi(size: Size, target_dpi: Dpi) -> Size {
    if target_dpi.is_null() {
        return size.expanded_to_one();
    }
    rescaled(
        size,
        f64::from(target_dpi.horizontal) / 300.0,
        f64::from(target_dpi.vertical) / 300.0,
    )
}

/// Gray map of a 300 dpi page where light areas are pictures.
pub fn detect_pictures(ctx: &mut PipelineContext<'_>, input_300dpi: &Pix) -> OutputResult<Pix> {
    // Text and background must sit equally far from mid-gray, or big
    // print would pass for a picture.
    let stretched = stretch_gray_range(&input_300dpi.convert_to_gray()?, 0.01, 0.01)?;
    ctx.debug(&stretched, "stretched");
    ctx.checkpoint()?;

    let lightest = dilate_gray(&stretched, 3, 3, 0x00)?;
    ctx.debug(&lightest, "lightest");
    ctx.checkpoint()?;

    let darkest = erode_gray(&stretched, 3, 3, 0xff)?;
    ctx.debug(&darkest, "darkest");
    drop(stretched);
    ctx.checkpoint()?;

    let gradient = combine_inverted(&darkest, &lightest);
    drop(darkest);
    drop(lightest);
    ctx.debug(&gradient, "gray_gradient");
    ctx.checkpoint()?;

    let marker = dilate_gray(&gradient, 35, 35, 0x00)?;
    ctx.debug(&marker, "marker");
    ctx.checkpoint()?;

    let reconstructed = seedfill_gray_inv(&marker, &gradient, ConnectivityType::EightWay)?;
    drop(marker);
    drop(gradient);
    ctx.debug(&reconstructed, "reconstructed");
    ctx.checkpoint()?;

    let inverted = reconstructed.invert();
    drop(reconstructed);
    ctx.debug(&inverted, "reconstructed_inverted");
    ctx.checkpoint()?;

    let seed = framed_seed(inverted.size())?;
    let holes_filled = seedfill_gray_inv(&seed, &inverted, ConnectivityType::EightWay)?;
    ctx.debug(&holes_filled, "holes_filled");
    Ok(holes_filled)
}

/// `255 - (255 - dark) * light / 255`, per pixel.
fn combine_inverted(dark: &Pix, light: &Pix) -> Pix {
    let mut out = dark.to_mut();
    for y in 0..dark.height() {
        for x in 0..dark.width() {
            let d = dark.get_pixel_unchecked(x, y);
            let l = light.get_pixel_unchecked(x, y);
            out.set_pixel_unchecked(x, y, 255 - (255 - d) * l / 255);
        }
    }
    out.into()
}

/// White image with a black one-pixel frame.
fn framed_seed(size: Size) -> OutputResult<Pix> {
    let mut pm = Pix::new_black(size, PixelDepth::Bit8)?.into_mut();
    if size.width > 2 && size.height > 2 {
        pm.fill_rect(
            Rect::new(1, 1, size.width as i32 - 2, size.height as i32 - 2),
            0xff,
        );
    }
    Ok(pm.into())
}

/// Picture mask of `source_sub_rect`: white where pictures are.
///
/// `gray_source` covers `source_rect`; both rectangles share the same
/// coordinate system and the sub rectangle must lie inside.
pub fn estimate_binarization_mask(
    ctx: &mut PipelineContext<'_>,
    gray_source: &Pix,
    source_rect: Rect,
    source_sub_rect: Rect,
    dpi: Dpi,
) -> OutputResult<Pix> {
    let trimmed = if source_rect == source_sub_rect {
        gray_source.convert_to_gray()?
    } else {
        gray_source
            .convert_to_gray()?
            .crop(source_sub_rect.translated(-source_rect.x, -source_rect.y))?
    };
    ctx.checkpoint()?;

    let downscaled = scale_to_size(&trimmed, to_300dpi(trimmed.size(), dpi))?;
    drop(trimmed);
    ctx.checkpoint()?;

    let picture_areas = detect_pictures(ctx, &downscaled)?;
    drop(downscaled);
    ctx.checkpoint()?;

    let picture_areas = scale_to_size(&picture_areas, source_sub_rect.size())?;
    Ok(picture_areas.threshold_to_binary(PICTURE_THRESHOLD)?)
}

/// Apply the picture zones to a mask covering `mask_rect` of the output.
///
/// `Eraser1` zones turn black first, then `Painter2` zones white, then
/// `Eraser3` zones black again. `orig_to_output` maps zone outlines.
pub fn modify_binarization_mask(
    bw_mask: &mut PixMut,
    mask_rect: Rect,
    zones: &ZoneSet,
    orig_to_output: &Transform,
) {
    let xform = orig_to_output.translated(-f64::from(mask_rect.x), -f64::from(mask_rect.y));
    for (layer, color) in [
        (PictureLayer::Eraser1, BwColor::Black),
        (PictureLayer::Painter2, BwColor::White),
        (PictureLayer::Eraser3, BwColor::Black),
    ] {
        for zone in zones.iter().filter(|z| z.properties().picture_layer() == layer) {
            PolygonRasterizer::fill(bw_mask, color.bit(), &zone.polygon(&xform), FillRule::Winding);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{InMemorySettings, PageId, SubPage};
    use crate::status::TaskStatus;
    use crate::zone::{PropertySet, Zone, ZoneProperty};
    use scanout_core::{Polygon, RectF};
    use scanout_test::synth::color_page_with_picture;

    #[test]
    fn test_dpi_scaling() {
        assert_eq!(to_300dpi(Size::new(600, 300), Dpi::square(600)), Size::new(300, 150));
        assert_eq!(from_300dpi(Size::new(300, 150), Dpi::square(600)), Size::new(600, 300));
        assert_eq!(to_300dpi(Size::new(1, 1), Dpi::square(1200)), Size::new(1, 1));
    }

    #[test]
    fn test_picture_is_detected() {
        let (page, pic) = color_page_with_picture(240, 180);
        let gray = page.convert_to_gray().unwrap();
        let status = TaskStatus::new();
        let settings = InMemorySettings::new();
        let mut ctx = PipelineContext::new(&status, PageId::new("p", SubPage::Single), &settings);
        let mask =
            estimate_binarization_mask(&mut ctx, &gray, gray.rect(), gray.rect(), Dpi::square(300))
                .unwrap();
        assert_eq!(mask.size(), gray.size());
        let c = pic.center();
        // The picture centre is white (picture), the text area black.
        assert_eq!(mask.get_pixel(c.x as u32, c.y as u32), Some(0));
        assert_eq!(mask.get_pixel(40, 60), Some(1));
    }

    #[test]
    fn test_zone_layers_apply_in_order() {
        let mut mask = Pix::new(40, 40, PixelDepth::Bit1).unwrap().into_mut();
        let zone = |rect: RectF, layer| {
            Zone::new(
                Polygon::from_rect(&rect),
                PropertySet::new().with(ZoneProperty::PictureLayer(layer)),
            )
        };
        let zones: ZoneSet = [
            zone(RectF::new(20.0, 20.0, 10.0, 10.0), PictureLayer::Eraser3),
            zone(RectF::new(10.0, 10.0, 30.0, 30.0), PictureLayer::Painter2),
            zone(RectF::new(0.0, 0.0, 15.0, 15.0), PictureLayer::Eraser1),
        ]
        .into_iter()
        .collect();
        mask.fill(1);
        modify_binarization_mask(&mut mask, Rect::new(5, 5, 40, 40), &zones, &Transform::identity());
        // Painter2 overrides Eraser1 where they overlap.
        assert_eq!(mask.get_pixel(7, 7), Some(0));
        assert_eq!(mask.get_pixel(2, 2), Some(1));
        // Eraser3 wins over Painter2.
        assert_eq!(mask.get_pixel(17, 17), Some(1));
        assert_eq!(mask.get_pixel(30, 30), Some(0));
    }
}
