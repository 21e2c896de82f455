//! Curves of a distortion model

use crate::spline::{DEFAULT_SAMPLES_PER_SEGMENT, Spline};
use scanout_core::{PointF, Transform};
use serde::{Deserialize, Serialize};

/// Coordinate tolerance for [`Curve::matches`].
const MATCH_TOLERANCE: f64 = 1e-4;

/// A page edge or text line curve: a polyline, optionally backed by the
/// spline it was sampled from.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Curve {
    polyline: Vec<PointF>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    spline: Option<Spline>,
}

impl Curve {
    pub fn from_polyline(polyline: Vec<PointF>) -> Self {
        Curve {
            polyline,
            spline: None,
        }
    }

    pub fn from_spline(spline: Spline) -> Self {
        Curve {
            polyline: spline.to_polyline(DEFAULT_SAMPLES_PER_SEGMENT),
            spline: Some(spline),
        }
    }

    pub fn polyline(&self) -> &[PointF] {
        &self.polyline
    }

    pub fn spline(&self) -> Option<&Spline> {
        self.spline.as_ref()
    }

    pub fn front(&self) -> Option<PointF> {
        self.polyline.first().copied()
    }

    pub fn back(&self) -> Option<PointF> {
        self.polyline.last().copied()
    }

    /// At least two points with distinct end points.
    pub fn is_valid(&self) -> bool {
        match (self.front(), self.back()) {
            (Some(a), Some(b)) => self.polyline.len() >= 2 && a.distance(b) > 1e-6,
            _ => false,
        }
    }

    /// Same number of points, each within a small tolerance.
    pub fn matches(&self, other: &Curve) -> bool {
        self.polyline.len() == other.polyline.len()
            && self
                .polyline
                .iter()
                .zip(&other.polyline)
                .all(|(a, b)| a.fuzzy_eq(*b, MATCH_TOLERANCE))
    }

    /// The curve with every point mapped through `xform`.
    pub fn transformed(&self, xform: &Transform) -> Curve {
        Curve {
            polyline: self.polyline.iter().map(|&p| xform.map_point(p)).collect(),
            spline: self.spline.as_ref().map(|s| {
                Spline::from_control_points(
                    s.control_points().iter().map(|&p| xform.map_point(p)).collect(),
                )
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validity() {
        assert!(!Curve::default().is_valid());
        assert!(!Curve::from_polyline(vec![PointF::new(1.0, 1.0), PointF::new(1.0, 1.0)]).is_valid());
        assert!(Curve::from_polyline(vec![PointF::new(0.0, 0.0), PointF::new(5.0, 0.0)]).is_valid());
    }

    #[test]
    fn test_spline_curve_keeps_control_points() {
        let spline = Spline::from_control_points(vec![
            PointF::new(0.0, 0.0),
            PointF::new(50.0, 4.0),
            PointF::new(100.0, 0.0),
        ]);
        let curve = Curve::from_spline(spline.clone());
        assert_eq!(curve.polyline().len(), 2 * DEFAULT_SAMPLES_PER_SEGMENT + 1);
        assert_eq!(curve.spline(), Some(&spline));
        let moved = curve.transformed(&Transform::translation(1.0, 2.0));
        assert_eq!(moved.front(), Some(PointF::new(1.0, 2.0)));
        assert_eq!(moved.spline().unwrap().control_point(1), Some(PointF::new(51.0, 6.0)));
    }

    #[test]
    fn test_matches_tolerance() {
        let a = Curve::from_polyline(vec![PointF::new(0.0, 0.0), PointF::new(5.0, 0.0)]);
        let b = Curve::from_polyline(vec![PointF::new(0.00001, 0.0), PointF::new(5.0, 0.0)]);
        let c = Curve::from_polyline(vec![PointF::new(0.1, 0.0), PointF::new(5.0, 0.0)]);
        assert!(a.matches(&b));
        assert!(!a.matches(&c));
    }
}
