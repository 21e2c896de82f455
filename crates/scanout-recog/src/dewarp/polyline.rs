//! Arc length parameterized polylines.

use scanout_core::PointF;

/// A polyline addressed by normalized arc length. Parameters outside
/// `[0, 1]` extrapolate along the end segments.
#[derive(Debug, Clone)]
pub(crate) struct ArcPolyline {
    points: Vec<PointF>,
    /// Cumulative length at each vertex.
    cum: Vec<f64>,
}

impl ArcPolyline {
    /// Build from `points`, dropping consecutive duplicates. Returns
    /// `None` when fewer than two distinct points remain.
    pub(crate) fn new(points: &[PointF]) -> Option<Self> {
        let mut pts: Vec<PointF> = Vec::with_capacity(points.len());
        for &p in points {
            if pts.last().is_none_or(|q: &PointF| q.distance(p) > 1e-9) {
                pts.push(p);
            }
        }
        if pts.len() < 2 {
            return None;
        }
        let mut cum = Vec::with_capacity(pts.len());
        let mut acc = 0.0;
        cum.push(0.0);
        for w in pts.windows(2) {
            acc += w[0].distance(w[1]);
            cum.push(acc);
        }
        Some(ArcPolyline { points: pts, cum })
    }

    pub(crate) fn length(&self) -> f64 {
        self.cum.last().copied().unwrap_or(0.0)
    }

    /// Point at normalized arc length `t`.
    pub(crate) fn point_at(&self, t: f64) -> PointF {
        let total = self.length();
        let s = t * total;
        let last = self.points.len() - 1;
        let seg = if s <= 0.0 {
            0
        } else if s >= total {
            last - 1
        } else {
            // First vertex beyond s, minus one.
            self.cum.partition_point(|&c| c <= s).saturating_sub(1).min(last - 1)
        };
        let (a, b) = (self.points[seg], self.points[seg + 1]);
        let len = self.cum[seg + 1] - self.cum[seg];
        a.lerp(b, (s - self.cum[seg]) / len)
    }
}

/// Whether segments `p1-p2` and `q1-q2` properly cross.
pub(crate) fn segments_cross(p1: PointF, p2: PointF, q1: PointF, q2: PointF) -> bool {
    let orient = |a: PointF, b: PointF, c: PointF| (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x);
    let d1 = orient(q1, q2, p1);
    let d2 = orient(q1, q2, p2);
    let d3 = orient(p1, p2, q1);
    let d4 = orient(p1, p2, q2);
    d1 * d2 < 0.0 && d3 * d4 < 0.0
}

/// Whether two polylines cross each other anywhere.
pub(crate) fn polylines_cross(a: &[PointF], b: &[PointF]) -> bool {
    a.windows(2).any(|s| {
        b.windows(2)
            .any(|t| segments_cross(s[0], s[1], t[0], t[1]))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arc_length_lookup() {
        let poly = ArcPolyline::new(&[
            PointF::new(0.0, 0.0),
            PointF::new(0.0, 0.0),
            PointF::new(10.0, 0.0),
            PointF::new(10.0, 10.0),
        ])
        .unwrap();
        assert_eq!(poly.points.len(), 3);
        assert!((poly.length() - 20.0).abs() < 1e-12);
        assert!(poly.point_at(0.25).fuzzy_eq(PointF::new(5.0, 0.0), 1e-9));
        assert!(poly.point_at(0.75).fuzzy_eq(PointF::new(10.0, 5.0), 1e-9));
        // Extrapolation along the end segments.
        assert!(poly.point_at(-0.1).fuzzy_eq(PointF::new(-2.0, 0.0), 1e-9));
        assert!(poly.point_at(1.1).fuzzy_eq(PointF::new(10.0, 12.0), 1e-9));
        assert!(ArcPolyline::new(&[PointF::new(1.0, 1.0)]).is_none());
    }

    #[test]
    fn test_crossing() {
        let a = [PointF::new(0.0, 0.0), PointF::new(10.0, 10.0)];
        let b = [PointF::new(0.0, 10.0), PointF::new(10.0, 0.0)];
        let c = [PointF::new(0.0, 20.0), PointF::new(10.0, 20.0)];
        assert!(polylines_cross(&a, &b));
        assert!(!polylines_cross(&a, &c));
    }
}
