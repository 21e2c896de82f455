//! Distortion model
//!
//! Two curves in original image coordinates describe a curled page: the
//! top curve follows the top of the text block, the bottom curve its
//! bottom. Both run from the front (left) to the back (right) of the
//! page.

use super::cylindrical::CylindricalSurfaceDewarper;
use super::curve::Curve;
use super::polyline::polylines_cross;
use scanout_core::{PointF, RectF, Transform};
use serde::{Deserialize, Serialize};

/// Smallest allowed sine of the turning angle at each corner of the
/// model's quadrilateral.
const MIN_CORNER_SINE: f64 = 0.01;

/// Samples per curve when measuring the model domain.
const DOMAIN_SAMPLES: usize = 32;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DistortionModel {
    top_curve: Curve,
    bottom_curve: Curve,
}

impl DistortionModel {
    pub fn new(top_curve: Curve, bottom_curve: Curve) -> Self {
        DistortionModel {
            top_curve,
            bottom_curve,
        }
    }

    pub fn top_curve(&self) -> &Curve {
        &self.top_curve
    }

    pub fn bottom_curve(&self) -> &Curve {
        &self.bottom_curve
    }

    pub fn set_top_curve(&mut self, curve: Curve) {
        self.top_curve = curve;
    }

    pub fn set_bottom_curve(&mut self, curve: Curve) {
        self.bottom_curve = curve;
    }

    /// Both curves are valid, they do not cross, and the quadrilateral
    /// `top.front, top.back, bottom.back, bottom.front` is strictly convex
    /// with a clear turn at every corner.
    pub fn is_valid(&self) -> bool {
        if !self.top_curve.is_valid() || !self.bottom_curve.is_valid() {
            return false;
        }
        let (Some(tf), Some(tb), Some(bf), Some(bb)) = (
            self.top_curve.front(),
            self.top_curve.back(),
            self.bottom_curve.front(),
            self.bottom_curve.back(),
        ) else {
            return false;
        };
        if !is_strictly_convex(&[tf, tb, bb, bf]) {
            return false;
        }
        !polylines_cross(self.top_curve.polyline(), self.bottom_curve.polyline())
    }

    /// Both curves match within tolerance.
    pub fn matches(&self, other: &DistortionModel) -> bool {
        self.top_curve.matches(&other.top_curve) && self.bottom_curve.matches(&other.bottom_curve)
    }

    /// The model with both curves mapped through `xform`.
    pub fn transformed(&self, xform: &Transform) -> DistortionModel {
        DistortionModel {
            top_curve: self.top_curve.transformed(xform),
            bottom_curve: self.bottom_curve.transformed(xform),
        }
    }

    /// The rectangle, in the space `to_output` maps into, that the curved
    /// quadrilateral of `dewarper` flattens onto.
    ///
    /// Its width is the mean length of the two curves and its height the
    /// mean length of the page's vertical edges and centre line, all
    /// measured after `to_output`. It is centred on the bounding box of
    /// the mapped curves.
    pub fn model_domain(dewarper: &CylindricalSurfaceDewarper, to_output: &Transform) -> RectF {
        let sample = |v: f64| -> Vec<PointF> {
            (0..=DOMAIN_SAMPLES)
                .map(|i| {
                    let u = i as f64 / DOMAIN_SAMPLES as f64;
                    to_output.map_point(dewarper.map_to_image(u, v))
                })
                .collect()
        };
        let top = sample(0.0);
        let bottom = sample(1.0);
        let length = |pts: &[PointF]| pts.windows(2).map(|w| w[0].distance(w[1])).sum::<f64>();
        let width = (length(&top) + length(&bottom)) / 2.0;
        let height = [0, DOMAIN_SAMPLES / 2, DOMAIN_SAMPLES]
            .iter()
            .map(|&i| top[i].distance(bottom[i]))
            .sum::<f64>()
            / 3.0;

        let (mut min, mut max) = (top[0], top[0]);
        for p in top.iter().chain(&bottom) {
            min = PointF::new(min.x.min(p.x), min.y.min(p.y));
            max = PointF::new(max.x.max(p.x), max.y.max(p.y));
        }
        let center = min.lerp(max, 0.5);
        RectF::new(center.x - width / 2.0, center.y - height / 2.0, width, height)
    }
}

fn is_strictly_convex(quad: &[PointF; 4]) -> bool {
    let mut sign = 0.0f64;
    for i in 0..4 {
        let a = quad[i];
        let b = quad[(i + 1) % 4];
        let c = quad[(i + 2) % 4];
        let e1 = b - a;
        let e2 = c - b;
        let (l1, l2) = (e1.x.hypot(e1.y), e2.x.hypot(e2.y));
        if l1 < 1e-9 || l2 < 1e-9 {
            return false;
        }
        let sine = (e1.x * e2.y - e1.y * e2.x) / (l1 * l2);
        if sine.abs() < MIN_CORNER_SINE {
            return false;
        }
        if sign == 0.0 {
            sign = sine.signum();
        } else if sine.signum() != sign {
            return false;
        }
    }
    true
}
