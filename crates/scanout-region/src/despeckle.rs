//! Speckle removal for binarized pages
//!
//! Black 8-connected components are split into big ones, whose bounding
//! box reaches a DPI-scaled size threshold, and small ones. A small
//! component survives only if a big component lies close enough; the
//! allowed squared distance grows linearly with the component's pixel
//! count, so dots of `i` and punctuation stay while isolated dust goes.

use crate::conncomp::{ConnectivityType, label_components};
use crate::error::{RegionError, RegionResult};
use scanout_core::{BwColor, Dpi, Pix, PixelDepth};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How hard to despeckle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DespeckleLevel {
    Off,
    Cautious,
    #[default]
    Normal,
    Aggressive,
}

impl DespeckleLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            DespeckleLevel::Off => "off",
            DespeckleLevel::Cautious => "cautious",
            DespeckleLevel::Normal => "normal",
            DespeckleLevel::Aggressive => "aggressive",
        }
    }
}

impl fmt::Display for DespeckleLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DespeckleLevel {
    type Err = RegionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" => Ok(DespeckleLevel::Off),
            "cautious" => Ok(DespeckleLevel::Cautious),
            "normal" => Ok(DespeckleLevel::Normal),
            "aggressive" => Ok(DespeckleLevel::Aggressive),
            other => Err(RegionError::InvalidParameters(format!(
                "unknown despeckle level: {other:?}"
            ))),
        }
    }
}

/// Despeckle tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct DespeckleOptions {
    /// Components whose bounding box has a side at least this long (in
    /// pixels) are never removed.
    pub big_object_threshold: u32,
    /// Squared distance allowance per pixel of a small component.
    pub pixels_to_sq_dist: f64,
}

impl Default for DespeckleOptions {
    fn default() -> Self {
        DespeckleOptions {
            big_object_threshold: 12,
            pixels_to_sq_dist: 6.5 * 6.5,
        }
    }
}

impl DespeckleOptions {
    /// Options for `level` at the given resolution; `None` for
    /// [`DespeckleLevel::Off`].
    pub fn for_level(level: DespeckleLevel, dpi: Dpi) -> Option<Self> {
        // Constants are tuned for 300 dpi.
        let (big, sq) = match level {
            DespeckleLevel::Off => return None,
            DespeckleLevel::Cautious => (7.0, 10.0 * 10.0),
            DespeckleLevel::Normal => (12.0, 6.5 * 6.5),
            DespeckleLevel::Aggressive => (17.0, 3.5 * 3.5),
        };
        let min_dpi = dpi.horizontal.min(dpi.vertical).max(1);
        let factor = f64::from(min_dpi) / 300.0;
        Some(DespeckleOptions {
            big_object_threshold: ((big * factor).round() as u32).max(1),
            pixels_to_sq_dist: sq,
        })
    }

    pub fn with_big_object_threshold(mut self, threshold: u32) -> Self {
        self.big_object_threshold = threshold;
        self
    }

    pub fn with_pixels_to_sq_dist(mut self, value: f64) -> Self {
        self.pixels_to_sq_dist = value;
        self
    }

    pub fn validate(&self) -> RegionResult<()> {
        if self.big_object_threshold == 0 {
            return Err(RegionError::InvalidParameters(
                "big_object_threshold must be positive".to_string(),
            ));
        }
        if self.pixels_to_sq_dist.is_nan() || self.pixels_to_sq_dist < 0.0 {
            return Err(RegionError::InvalidParameters(format!(
                "pixels_to_sq_dist must be non-negative, got {}",
                self.pixels_to_sq_dist
            )));
        }
        Ok(())
    }
}

/// Remove speckles from a binary image.
///
/// Returns a copy of `pix` for [`DespeckleLevel::Off`].
pub fn despeckle(pix: &Pix, dpi: Dpi, level: DespeckleLevel) -> RegionResult<Pix> {
    match DespeckleOptions::for_level(level, dpi) {
        Some(opts) => despeckle_with_options(pix, &opts),
        None => {
            if pix.depth() != PixelDepth::Bit1 {
                return Err(RegionError::UnsupportedDepth {
                    expected: "1 bpp",
                    actual: pix.depth().bits(),
                });
            }
            Ok(pix.clone())
        }
    }
}

/// Remove speckles using explicit options.
pub fn despeckle_with_options(pix: &Pix, opts: &DespeckleOptions) -> RegionResult<Pix> {
    opts.validate()?;
    let map = label_components(pix, BwColor::Black, ConnectivityType::EightWay)?;
    let comps = map.components();
    if comps.is_empty() {
        return Ok(pix.clone());
    }

    let is_big: Vec<bool> = comps
        .iter()
        .map(|c| c.bounds.w.max(c.bounds.h) as u32 >= opts.big_object_threshold)
        .collect();
    if is_big.iter().all(|&b| b) {
        return Ok(pix.clone());
    }

    let w = map.width() as usize;
    let h = map.height() as usize;
    let labels = map.labels();
    let any_big = is_big.iter().any(|&b| b);
    let sqdist = if any_big {
        let feature: Vec<bool> = labels
            .iter()
            .map(|&l| l != 0 && is_big[(l - 1) as usize])
            .collect();
        squared_distance_transform(&feature, w, h)
    } else {
        Vec::new()
    };

    // Nearest big-component distance per small component.
    let mut nearest = vec![u64::MAX; comps.len()];
    if any_big {
        for (i, &l) in labels.iter().enumerate() {
            if l != 0 && !is_big[(l - 1) as usize] {
                let n = &mut nearest[(l - 1) as usize];
                *n = (*n).min(sqdist[i]);
            }
        }
    }

    let keep: Vec<bool> = comps
        .iter()
        .zip(&is_big)
        .zip(&nearest)
        .map(|((c, &big), &d)| {
            big || (d != u64::MAX && d as f64 <= f64::from(c.pixel_count) * opts.pixels_to_sq_dist)
        })
        .collect();
    let removed = keep.iter().filter(|&&k| !k).count();
    tracing::debug!(
        components = comps.len(),
        removed,
        threshold = opts.big_object_threshold,
        "despeckle"
    );

    let mut out = map.render(|c| keep[(c.label - 1) as usize])?.into_mut();
    out.copy_resolution_from(pix);
    Ok(out.into())
}

const INF: u64 = u64::MAX / 4;

/// Exact squared Euclidean distance to the nearest `true` cell.
///
/// Separable lower-envelope transform; cells with no feature in the
/// whole image get a very large value.
fn squared_distance_transform(feature: &[bool], w: usize, h: usize) -> Vec<u64> {
    let mut grid: Vec<u64> = feature.iter().map(|&f| if f { 0 } else { INF }).collect();
    let mut f = Vec::new();
    let mut d = Vec::new();

    for x in 0..w {
        f.clear();
        f.extend((0..h).map(|y| grid[y * w + x]));
        distance_1d(&f, &mut d);
        for y in 0..h {
            grid[y * w + x] = d[y];
        }
    }
    for y in 0..h {
        f.clear();
        f.extend_from_slice(&grid[y * w..(y + 1) * w]);
        distance_1d(&f, &mut d);
        grid[y * w..(y + 1) * w].copy_from_slice(&d);
    }
    grid
}

fn distance_1d(f: &[u64], d: &mut Vec<u64>) {
    let n = f.len();
    d.clear();
    d.resize(n, INF);
    // Parabola vertices and the boundaries between them.
    let mut v: Vec<usize> = Vec::with_capacity(n);
    let mut z: Vec<f64> = Vec::with_capacity(n + 1);
    for q in 0..n {
        if f[q] >= INF {
            continue;
        }
        loop {
            match v.last() {
                None => {
                    v.push(q);
                    z.clear();
                    z.push(f64::NEG_INFINITY);
                    break;
                }
                Some(&p) => {
                    let s = intersection(f, p, q);
                    if z.last().is_some_and(|&zl| s <= zl) {
                        v.pop();
                        z.pop();
                    } else {
                        v.push(q);
                        z.push(s);
                        break;
                    }
                }
            }
        }
    }
    if v.is_empty() {
        return;
    }
    z.push(f64::INFINITY);
    let mut k = 0;
    for (q, out) in d.iter_mut().enumerate() {
        while z[k + 1] < q as f64 {
            k += 1;
        }
        let dq = q as i64 - v[k] as i64;
        *out = (dq * dq) as u64 + f[v[k]];
    }
}

fn intersection(f: &[u64], p: usize, q: usize) -> f64 {
    let fp = f[p] as f64 + (p * p) as f64;
    let fq = f[q] as f64 + (q * q) as f64;
    (fq - fp) / (2.0 * (q as f64 - p as f64))
}
