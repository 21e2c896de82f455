//! Skew detection
//!
//! Finds the angle of text lines in a binary image. The algorithm uses
//! differential square sum scoring:
//!
//! 1. **Coarse sweep**: the image is sheared vertically for angles in
//!    `±sweep_range` at `sweep_delta` steps; each shear is scored by the
//!    sum of squared differences between the black counts of adjacent
//!    rows. Text lines give the highest score when horizontal.
//! 2. **Binary search**: the best sweep angle is refined by interval
//!    halving until `min_bs_delta` is reached.
//!
//! Angles are in degrees, positive when the content is rotated clockwise
//! on screen. Rotating the image counter-clockwise by the angle deskews
//! it.

use crate::{RecogError, RecogResult};
use scanout_core::{Pix, PixelDepth};

/// Options for skew detection
#[derive(Debug, Clone)]
pub struct SkewDetectOptions {
    /// Half the sweep range in degrees (default: 7.0)
    pub sweep_range: f64,

    /// Angle increment for the sweep phase in degrees (default: 1.0)
    pub sweep_delta: f64,

    /// Minimum angle increment for binary search in degrees (default: 0.01)
    pub min_bs_delta: f64,

    /// Reduction factor for the sweep phase: 1, 2, 4, or 8 (default: 4)
    pub sweep_reduction: u32,

    /// Reduction factor for the binary search phase: 1, 2, 4, or 8 (default: 2)
    pub bs_reduction: u32,
}

impl Default for SkewDetectOptions {
    fn default() -> Self {
        Self {
            sweep_range: 7.0,
            sweep_delta: 1.0,
            min_bs_delta: 0.01,
            sweep_reduction: 4,
            bs_reduction: 2,
        }
    }
}

impl SkewDetectOptions {
    /// Create new options with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sweep_range(mut self, range: f64) -> Self {
        self.sweep_range = range;
        self
    }

    pub fn with_sweep_delta(mut self, delta: f64) -> Self {
        self.sweep_delta = delta;
        self
    }

    pub fn with_min_bs_delta(mut self, delta: f64) -> Self {
        self.min_bs_delta = delta;
        self
    }

    pub fn with_sweep_reduction(mut self, reduction: u32) -> Self {
        self.sweep_reduction = reduction;
        self
    }

    pub fn with_bs_reduction(mut self, reduction: u32) -> Self {
        self.bs_reduction = reduction;
        self
    }

    /// Validate options
    pub fn validate(&self) -> RecogResult<()> {
        if self.sweep_range <= 0.0 {
            return Err(RecogError::InvalidParameter(
                "sweep_range must be positive".to_string(),
            ));
        }
        if self.sweep_delta <= 0.0 {
            return Err(RecogError::InvalidParameter(
                "sweep_delta must be positive".to_string(),
            ));
        }
        if self.min_bs_delta <= 0.0 {
            return Err(RecogError::InvalidParameter(
                "min_bs_delta must be positive".to_string(),
            ));
        }
        if !matches!(self.sweep_reduction, 1 | 2 | 4 | 8) {
            return Err(RecogError::InvalidParameter(
                "sweep_reduction must be 1, 2, 4, or 8".to_string(),
            ));
        }
        if !matches!(self.bs_reduction, 1 | 2 | 4 | 8) {
            return Err(RecogError::InvalidParameter(
                "bs_reduction must be 1, 2, 4, or 8".to_string(),
            ));
        }
        if self.bs_reduction > self.sweep_reduction {
            return Err(RecogError::InvalidParameter(
                "bs_reduction must not exceed sweep_reduction".to_string(),
            ));
        }
        Ok(())
    }
}

/// Result of skew detection
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Skew {
    /// Skew angle in degrees, positive clockwise.
    pub angle: f64,

    /// Ratio of the best to the worst score; zero when the result is
    /// not trustworthy.
    pub confidence: f64,
}

impl Skew {
    /// Confidence from which a detected angle is acted upon.
    pub const GOOD_CONFIDENCE: f64 = 2.0;

    pub fn is_confident(&self) -> bool {
        self.confidence >= Self::GOOD_CONFIDENCE
    }
}

const MIN_VALID_MAX_SCORE: f64 = 10000.0;
const MIN_SCORE_THRESH_FACTOR: f64 = 0.000002;

/// Detect the skew of a binary image.
///
/// An image without black pixels yields a zero angle with zero
/// confidence.
pub fn find_skew(pix: &Pix, options: &SkewDetectOptions) -> RecogResult<Skew> {
    options.validate()?;
    if pix.depth() != PixelDepth::Bit1 {
        return Err(RecogError::UnsupportedDepth {
            expected: "1 bpp",
            actual: pix.depth().bits(),
        });
    }
    if pix.count_black()? == 0 {
        return Ok(Skew::default());
    }

    let sweep_pix = reduce_image(pix, options.sweep_reduction)?;
    let search_pix = if options.bs_reduction == options.sweep_reduction {
        sweep_pix.clone()
    } else {
        reduce_image(pix, options.bs_reduction)?
    };

    let best_angle = sweep_angles(&sweep_pix, options.sweep_range, options.sweep_delta)?;
    let (angle, max_score, min_score) = binary_search_angle(
        &search_pix,
        best_angle,
        options.sweep_delta,
        options.min_bs_delta,
    )?;

    let confidence = calculate_confidence(
        &search_pix,
        max_score,
        min_score,
        angle,
        options.sweep_range,
        options.sweep_delta,
    );
    tracing::debug!(angle, confidence, "skew detected");
    Ok(Skew { angle, confidence })
}

/// OR-reduce a binary image by `factor`; any black pixel makes the
/// reduced pixel black. Factors that would empty the image fall back to
/// no reduction.
fn reduce_image(pix: &Pix, factor: u32) -> RecogResult<Pix> {
    let w = pix.width();
    let h = pix.height();
    let new_w = w / factor;
    let new_h = h / factor;
    if factor == 1 || new_w == 0 || new_h == 0 {
        return Ok(pix.clone());
    }

    let mut reduced = Pix::new(new_w, new_h, PixelDepth::Bit1)?.into_mut();
    for ny in 0..new_h {
        for nx in 0..new_w {
            let has_black = (0..factor).any(|dy| {
                (0..factor).any(|dx| pix.get_pixel_unchecked(nx * factor + dx, ny * factor + dy) != 0)
            });
            if has_black {
                reduced.set_pixel_unchecked(nx, ny, 1);
            }
        }
    }
    Ok(reduced.into())
}

fn score_at(pix: &Pix, angle: f64) -> f64 {
    differential_square_sum(&sheared_row_counts(pix, angle))
}

/// Sweep through angles and return the one with maximum score
fn sweep_angles(pix: &Pix, range: f64, delta: f64) -> RecogResult<f64> {
    let steps = (range / delta).floor() as i64;
    let mut best = (f64::MIN, 0.0);
    for i in -steps..=steps {
        let angle = i as f64 * delta;
        let score = score_at(pix, angle);
        if score > best.0 {
            best = (score, angle);
        }
    }
    Ok(best.1)
}

/// Binary search to refine the angle. Returns the angle and the largest
/// and smallest scores seen.
fn binary_search_angle(
    pix: &Pix,
    center_angle: f64,
    initial_delta: f64,
    min_delta: f64,
) -> RecogResult<(f64, f64, f64)> {
    let mut center = center_angle;
    let mut delta = initial_delta / 2.0;

    let mut scores = [0.0f64; 5];
    scores[0] = score_at(pix, center - initial_delta);
    scores[2] = score_at(pix, center);
    scores[4] = score_at(pix, center + initial_delta);

    let mut max_score = scores[0].max(scores[2]).max(scores[4]);
    let mut min_score = scores[0].min(scores[2]).min(scores[4]);

    while delta >= min_delta {
        scores[1] = score_at(pix, center - delta);
        scores[3] = score_at(pix, center + delta);

        let mut max_idx = 1;
        for i in 2..4 {
            if scores[i] > scores[max_idx] {
                max_idx = i;
            }
        }
        let max_val = scores[max_idx];
        max_score = max_score.max(max_val);
        min_score = min_score.min(scores[1]).min(scores[3]);

        let (left, right) = (scores[max_idx - 1], scores[max_idx + 1]);
        scores[0] = left;
        scores[2] = max_val;
        scores[4] = right;

        center += delta * (max_idx as f64 - 2.0);
        delta *= 0.5;
    }

    Ok((center, max_score, min_score))
}

/// Black pixel counts per row after shearing by `angle`:
/// `y' = y - x * tan(angle)`.
fn sheared_row_counts(pix: &Pix, angle_deg: f64) -> Vec<u32> {
    let w = pix.width();
    let h = pix.height();
    let tan_a = angle_deg.to_radians().tan();
    let max_shear = (f64::from(w) * tan_a.abs()).ceil() as i64;
    let offset = if tan_a > 0.0 { max_shear } else { 0 };
    let mut counts = vec![0u32; (i64::from(h) + max_shear) as usize];
    for y in 0..h {
        for x in 0..w {
            if pix.get_pixel_unchecked(x, y) != 0 {
                let ny = i64::from(y) - (f64::from(x) * tan_a).round() as i64 + offset;
                if let Some(c) = counts.get_mut(ny as usize) {
                    *c += 1;
                }
            }
        }
    }
    counts
}

/// Sum of squared differences of adjacent row counts, skipping a few
/// rows at both ends.
fn differential_square_sum(row_sums: &[u32]) -> f64 {
    let n_skip = (row_sums.len() / 40).max(1);
    if row_sums.len() <= 2 * n_skip {
        return 0.0;
    }
    (n_skip..row_sums.len() - n_skip)
        .map(|i| {
            let diff = f64::from(row_sums[i]) - f64::from(row_sums[i - 1]);
            diff * diff
        })
        .sum()
}

fn calculate_confidence(
    pix: &Pix,
    max_score: f64,
    min_score: f64,
    angle: f64,
    sweep_range: f64,
    sweep_delta: f64,
) -> f64 {
    let w = f64::from(pix.width());
    let h = f64::from(pix.height());
    let min_thresh = MIN_SCORE_THRESH_FACTOR * w * w * h;

    if max_score < MIN_VALID_MAX_SCORE || min_score <= min_thresh {
        return 0.0;
    }
    // Angles at the edge of the sweep are unreliable.
    if angle.abs() > sweep_range - sweep_delta {
        return 0.0;
    }
    max_score / min_score
}
