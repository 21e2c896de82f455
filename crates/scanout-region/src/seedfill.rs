//! Grayscale seed fill (morphological reconstruction)
//!
//! Uses the hybrid raster-scan plus FIFO algorithm: one forward and one
//! backward raster pass propagate most values, then a queue finishes the
//! pixels the passes could not reach.
//!
//! Two polarities are provided:
//!
//! - [`seedfill_gray`]: lighter seed values spread, never rising above
//!   the mask (reconstruction by dilation, seed <= mask).
//! - [`seedfill_gray_inv`]: darker seed values spread, never dropping
//!   below the mask (reconstruction by erosion, seed >= mask).

use crate::conncomp::ConnectivityType;
use crate::error::{RegionError, RegionResult};
use scanout_core::{Pix, PixelDepth};
use std::collections::VecDeque;

/// Seed fill where light values of `seed` spread under `mask`.
///
/// # Arguments
///
/// * `seed` - Seed image (8-bit grayscale), clamped to `mask` first
/// * `mask` - Mask image (8-bit grayscale), upper bound of the result
/// * `connectivity` - Connectivity type
pub fn seedfill_gray(seed: &Pix, mask: &Pix, connectivity: ConnectivityType) -> RegionResult<Pix> {
    seedfill(seed, mask, connectivity, false)
}

/// Seed fill where dark values of `seed` spread over `mask`.
///
/// # Arguments
///
/// * `seed` - Seed image (8-bit grayscale), clamped to `mask` first
/// * `mask` - Mask image (8-bit grayscale), lower bound of the result
/// * `connectivity` - Connectivity type
pub fn seedfill_gray_inv(
    seed: &Pix,
    mask: &Pix,
    connectivity: ConnectivityType,
) -> RegionResult<Pix> {
    seedfill(seed, mask, connectivity, true)
}

fn check_gray(pix: &Pix) -> RegionResult<()> {
    if pix.depth() != PixelDepth::Bit8 {
        return Err(RegionError::UnsupportedDepth {
            expected: "8-bit",
            actual: pix.depth().bits(),
        });
    }
    Ok(())
}

fn to_buffer(pix: &Pix, invert: bool) -> Vec<u8> {
    let flip = if invert { 0xff } else { 0 };
    let mut buf = Vec::with_capacity((pix.width() * pix.height()) as usize);
    for y in 0..pix.height() {
        buf.extend((0..pix.width()).map(|x| pix.get_pixel_unchecked(x, y) as u8 ^ flip));
    }
    buf
}

fn seedfill(
    seed: &Pix,
    mask: &Pix,
    connectivity: ConnectivityType,
    invert: bool,
) -> RegionResult<Pix> {
    check_gray(seed)?;
    check_gray(mask)?;
    let width = seed.width();
    let height = seed.height();
    if mask.width() != width || mask.height() != height {
        return Err(RegionError::InvalidParameters(
            "seed and mask must have the same dimensions".to_string(),
        ));
    }

    // The inverse fill is the regular fill on inverted values.
    let m = to_buffer(mask, invert);
    let mut out = to_buffer(seed, invert);
    for (o, &mv) in out.iter_mut().zip(&m) {
        *o = (*o).min(mv);
    }
    reconstruct(&mut out, &m, width as usize, height as usize, connectivity);

    let flip = if invert { 0xff } else { 0 };
    let mut pm = Pix::new(width, height, PixelDepth::Bit8)?.into_mut();
    pm.copy_resolution_from(seed);
    for y in 0..height {
        for x in 0..width {
            let v = out[(y * width + x) as usize] ^ flip;
            pm.set_pixel_unchecked(x, y, u32::from(v));
        }
    }
    Ok(pm.into())
}

/// Neighbors preceding a pixel in raster order, as `(dx, dy)`.
fn causal_neighbors(connectivity: ConnectivityType) -> &'static [(i32, i32)] {
    match connectivity {
        ConnectivityType::FourWay => &[(-1, 0), (0, -1)],
        ConnectivityType::EightWay => &[(-1, 0), (-1, -1), (0, -1), (1, -1)],
    }
}

fn reconstruct(
    out: &mut [u8],
    mask: &[u8],
    w: usize,
    h: usize,
    connectivity: ConnectivityType,
) {
    let fwd = causal_neighbors(connectivity);
    let at = |x: usize, y: usize, dx: i32, dy: i32| -> Option<usize> {
        let nx = x as i64 + i64::from(dx);
        let ny = y as i64 + i64::from(dy);
        (nx >= 0 && ny >= 0 && (nx as usize) < w && (ny as usize) < h)
            .then(|| ny as usize * w + nx as usize)
    };

    for y in 0..h {
        for x in 0..w {
            let p = y * w + x;
            let mut v = out[p];
            for &(dx, dy) in fwd {
                if let Some(q) = at(x, y, dx, dy) {
                    v = v.max(out[q]);
                }
            }
            out[p] = v.min(mask[p]);
        }
    }

    let mut queue = VecDeque::new();
    for y in (0..h).rev() {
        for x in (0..w).rev() {
            let p = y * w + x;
            let mut v = out[p];
            for &(dx, dy) in fwd {
                if let Some(q) = at(x, y, -dx, -dy) {
                    v = v.max(out[q]);
                }
            }
            let v = v.min(mask[p]);
            out[p] = v;
            let needs_queue = fwd.iter().any(|&(dx, dy)| {
                at(x, y, -dx, -dy).is_some_and(|q| out[q] < v && out[q] < mask[q])
            });
            if needs_queue {
                queue.push_back((x, y));
            }
        }
    }

    while let Some((x, y)) = queue.pop_front() {
        let v = out[y * w + x];
        for &(dx, dy) in fwd {
            for (sx, sy) in [(dx, dy), (-dx, -dy)] {
                if let Some(q) = at(x, y, sx, sy) {
                    if out[q] < v && out[q] != mask[q] {
                        out[q] = v.min(mask[q]);
                        queue.push_back((q % w, q / w));
                    }
                }
            }
        }
    }
}
