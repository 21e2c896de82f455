//! Interpolating splines for distortion model curves
//!
//! A Catmull-Rom spline through a list of control points. The curve
//! passes through every control point; end segments use mirrored phantom
//! points so they leave the end points without overshoot.

use scanout_core::PointF;
use serde::{Deserialize, Serialize};

/// Samples per segment when flattening a spline to a polyline.
pub const DEFAULT_SAMPLES_PER_SEGMENT: usize = 16;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Spline {
    control_points: Vec<PointF>,
}

impl Spline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_control_points(points: Vec<PointF>) -> Self {
        Spline {
            control_points: points,
        }
    }

    pub fn append_control_point(&mut self, p: PointF) {
        self.control_points.push(p);
    }

    pub fn control_points(&self) -> &[PointF] {
        &self.control_points
    }

    /// Position of control point `i`, if present.
    pub fn control_point(&self, i: usize) -> Option<PointF> {
        self.control_points.get(i).copied()
    }

    /// Move control point `i`; out of range indices are ignored.
    pub fn move_control_point(&mut self, i: usize, p: PointF) {
        if let Some(cp) = self.control_points.get_mut(i) {
            *cp = p;
        }
    }

    /// Number of segments, one less than the number of control points.
    pub fn num_segments(&self) -> usize {
        self.control_points.len().saturating_sub(1)
    }

    fn phantom(&self, i: isize) -> PointF {
        let n = self.control_points.len() as isize;
        if i < 0 {
            let (a, b) = (self.control_points[0], self.control_points[1]);
            a * 2.0 - b
        } else if i >= n {
            let (a, b) = (
                self.control_points[(n - 1) as usize],
                self.control_points[(n - 2) as usize],
            );
            a * 2.0 - b
        } else {
            self.control_points[i as usize]
        }
    }

    /// Point at parameter `t` in `[0, 1]` over the whole spline; each
    /// segment takes an equal share of the parameter range.
    pub fn point_at(&self, t: f64) -> Option<PointF> {
        match self.control_points.len() {
            0 => None,
            1 => Some(self.control_points[0]),
            _ => {
                let segs = self.num_segments();
                let s = t.clamp(0.0, 1.0) * segs as f64;
                let seg = (s.floor() as usize).min(segs - 1);
                Some(self.segment_point(seg, s - seg as f64))
            }
        }
    }

    fn segment_point(&self, seg: usize, t: f64) -> PointF {
        let i = seg as isize;
        let p0 = self.phantom(i - 1);
        let p1 = self.phantom(i);
        let p2 = self.phantom(i + 1);
        let p3 = self.phantom(i + 2);
        let t2 = t * t;
        let t3 = t2 * t;
        (p1 * 2.0 + (p2 - p0) * t + (p0 * 2.0 - p1 * 5.0 + p2 * 4.0 - p3) * t2
            + (p1 * 3.0 - p0 - p2 * 3.0 + p3) * t3)
            * 0.5
    }

    /// Flatten into a polyline with `samples_per_segment` steps per
    /// segment. Control points are always part of the result.
    pub fn to_polyline(&self, samples_per_segment: usize) -> Vec<PointF> {
        if self.control_points.len() < 2 {
            return self.control_points.clone();
        }
        let steps = samples_per_segment.max(1);
        let mut out = Vec::with_capacity(self.num_segments() * steps + 1);
        for seg in 0..self.num_segments() {
            for k in 0..steps {
                out.push(self.segment_point(seg, k as f64 / steps as f64));
            }
        }
        if let Some(&last) = self.control_points.last() {
            out.push(last);
        }
        out
    }
}
