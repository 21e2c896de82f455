//! Grayscale morphological operations
//!
//! Dilation is a max filter and erosion a min filter over an
//! `hsize` x `vsize` brick. Both are separable; each 1D pass uses a
//! monotonic deque, so the cost does not depend on the brick size.
//! Pixels outside the image take the `border` value.

use crate::{MorphError, MorphResult, check_gray};
use scanout_core::{Pix, PixelDepth};
use std::collections::VecDeque;

/// Grayscale dilation (max filter).
///
/// Light regions grow, dark details thinner than the brick vanish.
pub fn dilate_gray(pix: &Pix, hsize: u32, vsize: u32, border: u8) -> MorphResult<Pix> {
    filter(pix, hsize, vsize, border, Extreme::Max)
}

/// Grayscale erosion (min filter).
///
/// Dark regions grow, light details thinner than the brick vanish.
pub fn erode_gray(pix: &Pix, hsize: u32, vsize: u32, border: u8) -> MorphResult<Pix> {
    filter(pix, hsize, vsize, border, Extreme::Min)
}

#[derive(Clone, Copy)]
enum Extreme {
    Min,
    Max,
}

impl Extreme {
    /// True if `a` dominates (or ties) `b` for this extreme.
    #[inline]
    fn dominates(self, a: u8, b: u8) -> bool {
        match self {
            Extreme::Min => a <= b,
            Extreme::Max => a >= b,
        }
    }
}

fn filter(pix: &Pix, hsize: u32, vsize: u32, border: u8, ext: Extreme) -> MorphResult<Pix> {
    check_gray(pix)?;
    if hsize == 0 || vsize == 0 {
        return Err(MorphError::InvalidParameters(format!(
            "brick size must be positive: {}x{}",
            hsize, vsize
        )));
    }
    if hsize == 1 && vsize == 1 {
        return Ok(pix.clone());
    }

    let w = pix.width() as usize;
    let h = pix.height() as usize;
    let mut buf: Vec<u8> = Vec::with_capacity(w * h);
    for y in 0..pix.height() {
        buf.extend((0..pix.width()).map(|x| pix.get_pixel_unchecked(x, y) as u8));
    }

    let mut line_in = Vec::new();
    let mut line_out = Vec::new();
    if hsize > 1 {
        for y in 0..h {
            line_in.clear();
            line_in.extend_from_slice(&buf[y * w..(y + 1) * w]);
            sliding_extreme(&line_in, hsize as usize, border, ext, &mut line_out);
            buf[y * w..(y + 1) * w].copy_from_slice(&line_out);
        }
    }
    if vsize > 1 {
        for x in 0..w {
            line_in.clear();
            line_in.extend((0..h).map(|y| buf[y * w + x]));
            sliding_extreme(&line_in, vsize as usize, border, ext, &mut line_out);
            for (y, &v) in line_out.iter().enumerate() {
                buf[y * w + x] = v;
            }
        }
    }

    let mut out = Pix::new(pix.width(), pix.height(), PixelDepth::Bit8)?.into_mut();
    out.copy_resolution_from(pix);
    for y in 0..h {
        for x in 0..w {
            out.set_pixel_unchecked(x as u32, y as u32, u32::from(buf[y * w + x]));
        }
    }
    Ok(out.into())
}

/// `out[i]` = extreme of `src[i - (size - 1) / 2 ..= i + size / 2]`, with
/// `border` standing in for positions outside `src`.
fn sliding_extreme(src: &[u8], size: usize, border: u8, ext: Extreme, out: &mut Vec<u8>) {
    let before = (size - 1) / 2;
    let after = size / 2;
    let n = src.len();
    let at = |j: usize| -> u8 {
        // j indexes the padded sequence
        if j < before || j >= before + n {
            border
        } else {
            src[j - before]
        }
    };

    out.clear();
    let mut dq: VecDeque<usize> = VecDeque::with_capacity(size);
    let padded = n + before + after;
    for j in 0..padded {
        let v = at(j);
        while let Some(&back) = dq.back() {
            if ext.dominates(v, at(back)) {
                dq.pop_back();
            } else {
                break;
            }
        }
        dq.push_back(j);
        if j + 1 >= size {
            let start = j + 1 - size;
            while let Some(&front) = dq.front() {
                if front < start {
                    dq.pop_front();
                } else {
                    break;
                }
            }
            if let Some(&front) = dq.front() {
                out.push(at(front));
            }
        }
    }
}
