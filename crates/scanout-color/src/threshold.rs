//! Global thresholding
//!
//! A threshold `t` binarizes by turning every pixel with gray level
//! below `t` black.

use crate::histogram::GrayscaleHistogram;
use crate::ColorResult;
use scanout_core::Pix;

/// Lowest threshold [`adjust_threshold`] returns.
pub const MIN_ADJUSTED_THRESHOLD: i32 = 30;
/// Highest threshold [`adjust_threshold`] returns.
pub const MAX_ADJUSTED_THRESHOLD: i32 = 225;

/// Otsu threshold of a histogram.
///
/// Returns the level that starts the upper class of the split with the
/// largest between-class variance. A histogram with fewer than two
/// populated levels has no split; 128 is returned then.
pub fn otsu_threshold(hist: &GrayscaleHistogram) -> u8 {
    let counts = hist.counts();
    let total = hist.total() as f64;
    if total == 0.0 {
        return 128;
    }
    let sum_all: f64 = counts
        .iter()
        .enumerate()
        .map(|(i, &c)| i as f64 * f64::from(c))
        .sum();

    let mut best: Option<(f64, usize)> = None;
    let mut w0 = 0.0;
    let mut sum0 = 0.0;
    for t in 1..256 {
        w0 += f64::from(counts[t - 1]);
        sum0 += (t - 1) as f64 * f64::from(counts[t - 1]);
        let w1 = total - w0;
        if w0 == 0.0 || w1 == 0.0 {
            continue;
        }
        let m0 = sum0 / w0;
        let m1 = (sum_all - sum0) / w1;
        let between = w0 * w1 * (m0 - m1) * (m0 - m1);
        if best.is_none_or(|(b, _)| between > b) {
            best = Some((between, t));
        }
    }
    best.map_or(128, |(_, t)| t as u8)
}

/// Otsu threshold of a whole image (any depth).
pub fn otsu_threshold_of(pix: &Pix) -> ColorResult<u8> {
    Ok(otsu_threshold(&GrayscaleHistogram::new(pix)?))
}

/// Apply a user bias to a threshold, bounded to `30..=225`.
///
/// The bound keeps binarization usable when, for example, all content
/// went into the picture mask and the histogram is degenerate.
pub fn adjust_threshold(threshold: u8, bias: i32) -> u8 {
    (i32::from(threshold) + bias).clamp(MIN_ADJUSTED_THRESHOLD, MAX_ADJUSTED_THRESHOLD) as u8
}

/// Binarize at a fixed threshold.
pub fn binarize_threshold(pix: &Pix, threshold: u8) -> ColorResult<Pix> {
    Ok(pix.threshold_to_binary(u32::from(threshold))?)
}

/// Binarize at the Otsu threshold shifted by `bias`.
pub fn binarize_otsu(pix: &Pix, bias: i32) -> ColorResult<Pix> {
    let t = adjust_threshold(otsu_threshold_of(pix)?, bias);
    tracing::trace!(threshold = t, bias, "otsu binarization");
    binarize_threshold(pix, t)
}
