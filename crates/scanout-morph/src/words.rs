//! Word-level row access for 1 bpp images.
//!
//! Rows are copied with their padding bits set to a fill pattern, so a
//! horizontal shift pulls in the same value whether it crosses the image
//! edge inside the last word or beyond it.

use scanout_core::{Pix, PixMut};

/// Packed rows of a 1 bpp image, optionally inverted.
pub(crate) struct Rows {
    wpl: usize,
    height: usize,
    fill: u32,
    data: Vec<u32>,
}

impl Rows {
    /// Copy the rows of `pix`; bits outside the image read as `fill`.
    pub(crate) fn from_pix(pix: &Pix, invert: bool, fill: u32) -> Self {
        let wpl = pix.wpl() as usize;
        let rem = pix.width() % 32;
        let pad_mask = if rem == 0 { 0 } else { u32::MAX >> rem };
        let flip = if invert { u32::MAX } else { 0 };
        let mut data = Vec::with_capacity(wpl * pix.height() as usize);
        for y in 0..pix.height() {
            let row = pix.row_data(y);
            data.extend(row.iter().map(|&w| w ^ flip));
            if pad_mask != 0 {
                let last = data.len() - 1;
                data[last] = (data[last] & !pad_mask) | (fill & pad_mask);
            }
        }
        Rows {
            wpl,
            height: pix.height() as usize,
            fill,
            data,
        }
    }

    /// Word `i` of row `y` shifted so that pixel `x` takes the value of
    /// source pixel `x + dx`.
    #[inline]
    pub(crate) fn word(&self, y: i64, i: usize, dx: i32) -> u32 {
        if y < 0 || y >= self.height as i64 {
            return self.fill;
        }
        let start = y as usize * self.wpl;
        shifted_word(&self.data[start..start + self.wpl], i, dx, self.fill)
    }
}

/// Word `i` of `src` shifted so that pixel `x` takes source pixel
/// `x + dx`; bits from outside the row are `fill`.
#[inline]
pub(crate) fn shifted_word(src: &[u32], i: usize, dx: i32, fill: u32) -> u32 {
    let start = i as i64 * 32 + i64::from(dx);
    let wi = start.div_euclid(32);
    let bi = start.rem_euclid(32) as u32;
    let get = |w: i64| {
        if w < 0 || w >= src.len() as i64 {
            fill
        } else {
            src[w as usize]
        }
    };
    if bi == 0 {
        get(wi)
    } else {
        (get(wi) << bi) | (get(wi + 1) >> (32 - bi))
    }
}

/// Zero the bits beyond the image width in every row.
pub(crate) fn clear_padding(pix: &mut PixMut) {
    let rem = pix.width() % 32;
    if rem == 0 {
        return;
    }
    let keep = !(u32::MAX >> rem);
    let wpl = pix.wpl() as usize;
    for y in 0..pix.height() {
        pix.row_data_mut(y)[wpl - 1] &= keep;
    }
}
