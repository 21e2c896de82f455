//! Hit-miss matching and replacement
//!
//! The match image has a black pixel at every origin position where all
//! hits of the SEL land on black and all misses land on white. Pixels
//! outside the image take the `surroundings` color.
//!
//! Replacement computes the matches once on the unmodified image, then
//! paints every `+` position of every match black and finally erases
//! every `-` position white.

use crate::words::{Rows, clear_padding};
use crate::{MorphResult, Sel, check_binary};
use scanout_core::{BwColor, Pix, PixelDepth};

/// Hit-miss transform.
pub fn hit_miss_match(pix: &Pix, sel: &Sel, surroundings: BwColor) -> MorphResult<Pix> {
    check_binary(pix)?;

    let fill = surroundings.word();
    let img = Rows::from_pix(pix, false, fill);
    let inv = Rows::from_pix(pix, true, !fill);
    let hits: Vec<(i32, i32)> = sel.hit_offsets().collect();
    let misses: Vec<(i32, i32)> = sel.miss_offsets().collect();
    let wpl = pix.wpl() as usize;

    let mut out = Pix::new(pix.width(), pix.height(), PixelDepth::Bit1)?.into_mut();
    out.copy_resolution_from(pix);

    for y in 0..pix.height() {
        let yy = i64::from(y);
        let dst = out.row_data_mut(y);
        for (i, d) in dst.iter_mut().enumerate().take(wpl) {
            let mut word = u32::MAX;
            for &(dx, dy) in &hits {
                word &= img.word(yy + i64::from(dy), i, dx);
                if word == 0 {
                    break;
                }
            }
            if word != 0 {
                for &(dx, dy) in &misses {
                    word &= inv.word(yy + i64::from(dy), i, dx);
                    if word == 0 {
                        break;
                    }
                }
            }
            *d = word;
        }
    }

    clear_padding(&mut out);
    Ok(out.into())
}

/// Hit-miss replacement with a single SEL.
///
/// Returns a modified copy of `pix`.
pub fn hit_miss_replace(pix: &Pix, sel: &Sel, surroundings: BwColor) -> MorphResult<Pix> {
    let hm = hit_miss_match(pix, sel, surroundings)?;
    let matches = Rows::from_pix(&hm, false, 0);
    let paint: Vec<(i32, i32)> = sel.paint_offsets().collect();
    let erase: Vec<(i32, i32)> = sel.erase_offsets().collect();
    let wpl = pix.wpl() as usize;

    let mut out = pix.to_mut();
    for y in 0..pix.height() {
        let yy = i64::from(y);
        let dst = out.row_data_mut(y);
        for (i, d) in dst.iter_mut().enumerate().take(wpl) {
            for &(dx, dy) in &paint {
                *d |= matches.word(yy - i64::from(dy), i, -dx);
            }
        }
    }
    for y in 0..pix.height() {
        let yy = i64::from(y);
        let dst = out.row_data_mut(y);
        for (i, d) in dst.iter_mut().enumerate().take(wpl) {
            for &(dx, dy) in &erase {
                *d &= !matches.word(yy - i64::from(dy), i, -dx);
            }
        }
    }

    clear_padding(&mut out);
    Ok(out.into())
}

/// Hit-miss replacement with the SEL in four orientations, applied in
/// sequence: as given, rotated 90 degrees clockwise, rotated 180 degrees,
/// rotated 90 degrees counter-clockwise.
pub fn hit_miss_replace_all_directions(
    pix: &Pix,
    sel: &Sel,
    surroundings: BwColor,
) -> MorphResult<Pix> {
    let mut img = hit_miss_replace(pix, sel, surroundings)?;
    img = hit_miss_replace(&img, &sel.rotate_cw(), surroundings)?;
    img = hit_miss_replace(&img, &sel.rotate_180(), surroundings)?;
    hit_miss_replace(&img, &sel.rotate_ccw(), surroundings)
}
