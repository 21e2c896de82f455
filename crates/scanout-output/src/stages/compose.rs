//! Compositing helpers: mixed output, margins and fill zones

use crate::error::{OutputError, OutputResult};
use crate::zone::ZoneSet;
use scanout_core::{
    FillRule, Pix, PixMut, PixelDepth, PointF, Polygon, PolygonRasterizer, Transform, color,
};

/// Value of an opaque `0xRRGGBBAA` color at `depth`.
///
/// At 1 bpp dark colors (gray below 128) are black.
pub fn pixel_for_depth(rgba: u32, depth: PixelDepth) -> u32 {
    match depth {
        PixelDepth::Bit1 => u32::from(color::gray(rgba) < 128),
        PixelDepth::Bit8 => u32::from(color::gray(rgba)),
        PixelDepth::Bit32 => rgba | 0xff,
    }
}

fn check_mask(image: &PixMut, mask: &Pix) -> OutputResult<()> {
    if mask.depth() != PixelDepth::Bit1 {
        return Err(OutputError::UnsupportedDepth {
            expected: "1 bpp mask",
            actual: mask.depth().bits(),
        });
    }
    if image.size() != mask.size() {
        return Err(OutputError::InvalidParameters(format!(
            "mask size {:?} differs from image size {:?}",
            mask.size(),
            image.size()
        )));
    }
    Ok(())
}

/// Pure black and white are kept for binarized content; other pixels
/// are nudged one step inward.
fn reserve(value: u32, depth: PixelDepth) -> u32 {
    match depth {
        PixelDepth::Bit8 => match value {
            0x00 => 0x01,
            0xff => 0xfe,
            v => v,
        },
        PixelDepth::Bit32 => match value & 0xffff_ff00 {
            0x0000_0000 => 0x0101_01ff,
            0xffff_ff00 => 0xfefe_feff,
            _ => value,
        },
        PixelDepth::Bit1 => value,
    }
}

/// Make pure black and white unique to binarized content.
pub fn reserve_black_and_white(image: &mut PixMut) {
    let depth = image.depth();
    if depth == PixelDepth::Bit1 {
        return;
    }
    for y in 0..image.height() {
        for x in 0..image.width() {
            let v = image.get_pixel_unchecked(x, y);
            image.set_pixel_unchecked(x, y, reserve(v, depth));
        }
    }
}

/// Paste `bw_content` into `mixed` where `bw_mask` is black.
///
/// With `reserve_bw` the remaining pixels lose pure black and white so
/// the binarized areas can be found again later.
pub fn combine_mixed(
    mixed: &mut PixMut,
    bw_content: &Pix,
    bw_mask: &Pix,
    reserve_bw: bool,
) -> OutputResult<()> {
    let depth = mixed.depth();
    if depth == PixelDepth::Bit1 {
        return Err(OutputError::UnsupportedDepth {
            expected: "8 or 32 bpp",
            actual: 1,
        });
    }
    check_mask(mixed, bw_mask)?;
    check_mask(mixed, bw_content)?;
    let (black, white) = (depth.black(), depth.white());
    for y in 0..mixed.height() {
        for x in 0..mixed.width() {
            if bw_mask.get_pixel_unchecked(x, y) == 1 {
                let v = if bw_content.get_pixel_unchecked(x, y) == 1 {
                    black
                } else {
                    white
                };
                mixed.set_pixel_unchecked(x, y, v);
            } else if reserve_bw {
                let v = mixed.get_pixel_unchecked(x, y);
                mixed.set_pixel_unchecked(x, y, reserve(v, depth));
            }
        }
    }
    Ok(())
}

/// Paint everything outside `content_poly` with `rgba`.
pub fn fill_margins(image: &mut PixMut, content_poly: &Polygon, rgba: u32) {
    let val = pixel_for_depth(rgba, image.depth());
    PolygonRasterizer::fill_except(image, val, content_poly, FillRule::Winding);
}

/// Paint every pixel where `content_mask` is white with `rgba`.
pub fn fill_margins_with_mask(image: &mut PixMut, content_mask: &Pix, rgba: u32) -> OutputResult<()> {
    check_mask(image, content_mask)?;
    let val = pixel_for_depth(rgba, image.depth());
    for y in 0..image.height() {
        for x in 0..image.width() {
            if content_mask.get_pixel_unchecked(x, y) == 0 {
                image.set_pixel_unchecked(x, y, val);
            }
        }
    }
    Ok(())
}

/// Outline of a fill zone in output coordinates.
fn zone_outline(
    spline: &Polygon,
    orig_to_output: &dyn Fn(PointF) -> PointF,
    post: &Transform,
) -> Polygon {
    post.map_polygon(&spline.mapped(orig_to_output))
}

/// Paint fill zones in their colors, in zone order.
///
/// `orig_to_output` maps zone outlines from original image coordinates;
/// `post` is applied afterwards (post-deskew rotation or identity).
pub fn apply_fill_zones(
    image: &mut PixMut,
    zones: &ZoneSet,
    orig_to_output: &dyn Fn(PointF) -> PointF,
    post: &Transform,
) {
    let depth = image.depth();
    for zone in zones {
        let val = pixel_for_depth(zone.properties().fill_color().to_pixel(), depth);
        let outline = zone_outline(zone.spline(), orig_to_output, post);
        PolygonRasterizer::fill(image, val, &outline, FillRule::Winding);
    }
}

/// Take fill zones out of a layer mask: zone areas turn white so they
/// go to the background layer, where their color was painted.
pub fn apply_fill_zones_to_mask(
    mask: &mut PixMut,
    zones: &ZoneSet,
    orig_to_output: &dyn Fn(PointF) -> PointF,
    post: &Transform,
) {
    for zone in zones {
        let outline = zone_outline(zone.spline(), orig_to_output, post);
        PolygonRasterizer::fill(mask, 0, &outline, FillRule::Winding);
    }
}
