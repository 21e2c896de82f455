//! Binary morphological operations
//!
//! Brick erosion and dilation for 1 bpp images. Both are separable and
//! run as word-level shift-and-accumulate passes, one per brick column
//! (horizontal pass) and one per brick row (vertical pass).
//!
//! Pixels outside the image take the `surroundings` color. With white
//! surroundings, erosion eats black regions touching the border; with
//! black surroundings it leaves them alone.

use crate::words::{Rows, clear_padding};
use crate::{MorphError, MorphResult, check_binary};
use scanout_core::{BwColor, Pix, PixelDepth};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Accumulate {
    And,
    Or,
}

/// Erode with a `width` x `height` brick centred on each pixel.
///
/// A pixel stays black only if the whole brick around it is black.
pub fn erode_brick(pix: &Pix, width: u32, height: u32, surroundings: BwColor) -> MorphResult<Pix> {
    brick(pix, width, height, surroundings, Accumulate::And)
}

/// Dilate with a `width` x `height` brick centred on each pixel.
///
/// A pixel becomes black if any pixel of the brick around it is black.
pub fn dilate_brick(
    pix: &Pix,
    width: u32,
    height: u32,
    surroundings: BwColor,
) -> MorphResult<Pix> {
    brick(pix, width, height, surroundings, Accumulate::Or)
}

fn brick(
    pix: &Pix,
    width: u32,
    height: u32,
    surroundings: BwColor,
    acc: Accumulate,
) -> MorphResult<Pix> {
    check_binary(pix)?;
    if width == 0 || height == 0 {
        return Err(MorphError::InvalidParameters(format!(
            "brick size must be positive: {}x{}",
            width, height
        )));
    }
    if width == 1 && height == 1 {
        return Ok(pix.clone());
    }
    let tmp = if width > 1 {
        brick_pass(pix, width, true, surroundings, acc)?
    } else {
        pix.clone()
    };
    if height > 1 {
        brick_pass(&tmp, height, false, surroundings, acc)
    } else {
        Ok(tmp)
    }
}

/// Offsets covered by a brick of `size` centred at 0.
fn brick_range(size: u32, acc: Accumulate) -> std::ops::RangeInclusive<i32> {
    let lo = ((size - 1) / 2) as i32;
    let hi = (size / 2) as i32;
    // Dilation uses the reflected brick.
    match acc {
        Accumulate::And => -lo..=hi,
        Accumulate::Or => -hi..=lo,
    }
}

fn brick_pass(
    pix: &Pix,
    size: u32,
    horizontal: bool,
    surroundings: BwColor,
    acc: Accumulate,
) -> MorphResult<Pix> {
    let fill = surroundings.word();
    let rows = Rows::from_pix(pix, false, fill);
    let wpl = pix.wpl() as usize;
    let range = brick_range(size, acc);

    let mut out = Pix::new(pix.width(), pix.height(), PixelDepth::Bit1)?.into_mut();
    out.copy_resolution_from(pix);

    for y in 0..pix.height() {
        let dst = out.row_data_mut(y);
        for (i, d) in dst.iter_mut().enumerate().take(wpl) {
            let mut word = match acc {
                Accumulate::And => u32::MAX,
                Accumulate::Or => 0,
            };
            for off in range.clone() {
                let w = if horizontal {
                    rows.word(i64::from(y), i, off)
                } else {
                    rows.word(i64::from(y) + i64::from(off), i, 0)
                };
                match acc {
                    Accumulate::And => word &= w,
                    Accumulate::Or => word |= w,
                }
            }
            *d = word;
        }
    }

    clear_padding(&mut out);
    Ok(out.into())
}
