//! Distortion model detection

use super::curve::Curve;
use super::model::DistortionModel;
use crate::error::{RecogError, RecogResult};
use scanout_core::{Pix, PointF, Rect};

/// Finds the curves of a distortion model in a page image.
pub trait CurveTracer {
    /// Trace `gray` within `content_rect`; the model is in the image's
    /// own coordinates.
    fn trace(&self, gray: &Pix, content_rect: Rect) -> RecogResult<DistortionModel>;
}

/// Traces the top and bottom edges of the content.
///
/// The content box is split into vertical bands. In each band the topmost
/// and bottommost black pixels of the Otsu-binarized image give one point
/// of the top and bottom curves. The curves are smoothed with a running
/// median and extended to the left and right edges of the box.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentBoundaryTracer {
    pub bands: u32,
}

impl Default for ContentBoundaryTracer {
    fn default() -> Self {
        ContentBoundaryTracer { bands: 16 }
    }
}

impl ContentBoundaryTracer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bands(mut self, bands: u32) -> Self {
        self.bands = bands;
        self
    }
}

impl CurveTracer for ContentBoundaryTracer {
    fn trace(&self, gray: &Pix, content_rect: Rect) -> RecogResult<DistortionModel> {
        if self.bands < 2 {
            return Err(RecogError::InvalidParameter(format!(
                "at least two bands are needed, got {}",
                self.bands
            )));
        }
        let area = content_rect.intersected(&gray.rect());
        if area.is_empty() {
            return Err(RecogError::NoContent("content box is empty".to_string()));
        }
        let bw = scanout_color::binarize_otsu(gray, 0)?;

        let mut top = Vec::new();
        let mut bottom = Vec::new();
        let bands = self.bands.min(area.w as u32);
        for band in 0..bands {
            let x0 = area.x as u32 + band * area.w as u32 / bands;
            let x1 = area.x as u32 + (band + 1) * area.w as u32 / bands;
            let mut first: Option<u32> = None;
            let mut last: Option<u32> = None;
            for y in area.y as u32..area.bottom() as u32 {
                if (x0..x1).any(|x| bw.get_pixel_unchecked(x, y) == 1) {
                    first.get_or_insert(y);
                    last = Some(y);
                }
            }
            if let (Some(f), Some(l)) = (first, last) {
                let cx = f64::from(x0 + x1) / 2.0;
                top.push(PointF::new(cx, f64::from(f)));
                bottom.push(PointF::new(cx, f64::from(l + 1)));
            }
        }
        if top.len() < 2 {
            return Err(RecogError::NoContent(format!(
                "content found in {} of {bands} bands",
                top.len()
            )));
        }

        let left = f64::from(area.x);
        let right = f64::from(area.right());
        let top = extend_to_edges(median_smoothed(&top), left, right);
        let bottom = extend_to_edges(median_smoothed(&bottom), left, right);
        tracing::debug!(points = top.len(), ?area, "traced content boundary");
        Ok(DistortionModel::new(
            Curve::from_polyline(top),
            Curve::from_polyline(bottom),
        ))
    }
}

/// Running median of three on the y coordinates.
fn median_smoothed(points: &[PointF]) -> Vec<PointF> {
    let n = points.len();
    (0..n)
        .map(|i| {
            if i == 0 || i + 1 == n {
                return points[i];
            }
            let mut ys = [points[i - 1].y, points[i].y, points[i + 1].y];
            ys.sort_by(f64::total_cmp);
            PointF::new(points[i].x, ys[1])
        })
        .collect()
}

fn extend_to_edges(mut points: Vec<PointF>, left: f64, right: f64) -> Vec<PointF> {
    if let Some(&first) = points.first() {
        if first.x > left {
            points.insert(0, PointF::new(left, first.y));
        }
    }
    if let Some(&last) = points.last() {
        if last.x < right {
            points.push(PointF::new(right, last.y));
        }
    }
    points
}
