//! Dominant background color
//!
//! The page is split into dark and light pixels at the Otsu threshold;
//! the more numerous side is the background. Its color is the mean of
//! the most populated cell of a coarse RGB grid.

use crate::{FilterError, FilterResult};
use scanout_color::{GrayscaleHistogram, otsu_threshold};
use scanout_core::{BwColor, FillRule, Pix, PixelDepth, Polygon, PolygonRasterizer, color};
use std::collections::HashMap;

/// Levels per channel folded into one grid cell.
const CELL: u32 = 16;

fn area_mask(pix: &Pix, area: &Polygon) -> FilterResult<Pix> {
    let mut mask = Pix::new(pix.width(), pix.height(), PixelDepth::Bit1)?.into_mut();
    if area.is_empty() {
        mask.fill(1);
    } else {
        PolygonRasterizer::fill(&mut mask, 1, area, FillRule::Winding);
    }
    Ok(mask.into())
}

/// Background side of `pix` within `area` together with the Otsu
/// threshold, or `None` when `area` covers no pixels.
fn background_side(gray: &Pix, mask: &Pix) -> FilterResult<Option<(BwColor, u32)>> {
    let hist = GrayscaleHistogram::with_mask(gray, mask)?;
    let total = hist.total();
    if total == 0 {
        return Ok(None);
    }
    let t = otsu_threshold(&hist);
    let dark: u64 = hist.counts()[..t as usize].iter().map(|&c| u64::from(c)).sum();
    let side = if dark * 2 > total {
        BwColor::Black
    } else {
        BwColor::White
    };
    Ok(Some((side, u32::from(t))))
}

/// Whether the background of `pix` within `area` is black or white.
///
/// `area` is in pixel coordinates; an empty polygon means the whole
/// image. An area covering no pixels is taken as white.
pub fn calc_dominant_background_color_bw(pix: &Pix, area: &Polygon) -> FilterResult<BwColor> {
    let gray = pix.convert_to_gray()?;
    let mask = area_mask(pix, area)?;
    Ok(background_side(&gray, &mask)?.map_or(BwColor::White, |(side, _)| side))
}

/// Dominant background color of `pix` within `area`, as an opaque
/// `0xRRGGBBAA` value.
///
/// Gray and binary images give a gray color. An area covering no pixels
/// gives white.
pub fn calc_dominant_background_color(pix: &Pix, area: &Polygon) -> FilterResult<u32> {
    if pix.depth() == PixelDepth::Bit1 {
        return Ok(match calc_dominant_background_color_bw(pix, area)? {
            BwColor::Black => color::BLACK,
            BwColor::White => color::WHITE,
        });
    }
    let gray = pix.convert_to_gray()?;
    let mask = area_mask(pix, area)?;
    let Some((side, threshold)) = background_side(&gray, &mask)? else {
        return Ok(color::WHITE);
    };

    let mut cells: HashMap<(u32, u32, u32), (u64, [u64; 3])> = HashMap::new();
    for y in 0..pix.height() {
        for x in 0..pix.width() {
            if mask.get_pixel_unchecked(x, y) == 0 {
                continue;
            }
            let is_dark = gray.get_pixel_unchecked(x, y) < threshold;
            if is_dark != (side == BwColor::Black) {
                continue;
            }
            let (r, g, b) = match pix.depth() {
                PixelDepth::Bit32 => color::extract_rgb(pix.get_pixel_unchecked(x, y)),
                _ => {
                    let v = pix.get_pixel_unchecked(x, y) as u8;
                    (v, v, v)
                }
            };
            let key = (u32::from(r) / CELL, u32::from(g) / CELL, u32::from(b) / CELL);
            let cell = cells.entry(key).or_insert((0, [0; 3]));
            cell.0 += 1;
            cell.1[0] += u64::from(r);
            cell.1[1] += u64::from(g);
            cell.1[2] += u64::from(b);
        }
    }
    let best = cells
        .into_iter()
        .max_by(|a, b| a.1.0.cmp(&b.1.0).then_with(|| b.0.cmp(&a.0)))
        .map(|(_, v)| v)
        .ok_or_else(|| FilterError::InvalidParameters("no background pixels".to_string()))?;
    let (n, sums) = best;
    let mean = |s: u64| ((s + n / 2) / n) as u8;
    let result = color::compose_rgb(mean(sums[0]), mean(sums[1]), mean(sums[2]));
    tracing::trace!(color = format_args!("{result:08x}"), "dominant background");
    Ok(result)
}
