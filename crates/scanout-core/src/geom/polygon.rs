//! Closed polygons
//!
//! The last point connects back to the first. Containment uses the
//! non-zero winding rule.

use super::{PointF, Rect, RectF};
use serde::{Deserialize, Serialize};

/// Closed polygon
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Polygon {
    points: Vec<PointF>,
}

impl Polygon {
    pub fn new(points: Vec<PointF>) -> Self {
        Polygon { points }
    }

    /// Quadrilateral covering a rectangle.
    pub fn from_rect(rect: &RectF) -> Self {
        Polygon::new(rect.corners().to_vec())
    }

    pub fn points(&self) -> &[PointF] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// A polygon with fewer than three points has no area.
    pub fn is_empty(&self) -> bool {
        self.points.len() < 3
    }

    /// Same vertices in the same order, each within `eps` on both axes.
    pub fn fuzzy_eq(&self, other: &Polygon, eps: f64) -> bool {
        self.points.len() == other.points.len()
            && self
                .points
                .iter()
                .zip(&other.points)
                .all(|(a, b)| a.fuzzy_eq(*b, eps))
    }

    /// Closed edges `(p[i], p[i + 1])`, wrapping around.
    pub fn edges(&self) -> impl Iterator<Item = (PointF, PointF)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }

    /// Smallest axis-aligned rectangle containing every vertex.
    pub fn bounding_rect(&self) -> RectF {
        let Some(first) = self.points.first() else {
            return RectF::default();
        };
        let (mut l, mut t, mut r, mut b) = (first.x, first.y, first.x, first.y);
        for p in &self.points[1..] {
            l = l.min(p.x);
            t = t.min(p.y);
            r = r.max(p.x);
            b = b.max(p.y);
        }
        RectF::new(l, t, r - l, b - t)
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Polygon {
        Polygon::new(
            self.points
                .iter()
                .map(|p| PointF::new(p.x + dx, p.y + dy))
                .collect(),
        )
    }

    /// Apply an arbitrary point mapping to every vertex.
    pub fn mapped(&self, f: impl Fn(PointF) -> PointF) -> Polygon {
        Polygon::new(self.points.iter().map(|&p| f(p)).collect())
    }

    /// Winding number of the polygon around `p`.
    pub fn winding_number(&self, p: PointF) -> i32 {
        let mut wn = 0;
        for (a, b) in self.edges() {
            if a.y <= p.y {
                if b.y > p.y && cross(a, b, p) > 0.0 {
                    wn += 1;
                }
            } else if b.y <= p.y && cross(a, b, p) < 0.0 {
                wn -= 1;
            }
        }
        wn
    }

    /// Non-zero winding containment test.
    pub fn contains_point(&self, p: PointF) -> bool {
        !self.is_empty() && self.winding_number(p) != 0
    }

    /// Check whether the whole pixel rectangle lies inside.
    ///
    /// Every corner must be inside and no vertex may fall strictly
    /// within the rectangle.
    pub fn contains_rect(&self, rect: &Rect) -> bool {
        if self.is_empty() || rect.is_empty() {
            return false;
        }
        let rf = rect.to_rect_f();
        if !rf.corners().iter().all(|&c| self.contains_point_inclusive(c)) {
            return false;
        }
        !self.points.iter().any(|p| {
            p.x > rf.x && p.x < rf.right() && p.y > rf.y && p.y < rf.bottom()
        })
    }

    /// Containment test that counts points on an edge as inside.
    fn contains_point_inclusive(&self, p: PointF) -> bool {
        const EPS: f64 = 1e-9;
        let on_edge = self.edges().any(|(a, b)| {
            cross(a, b, p).abs() <= EPS * a.distance(b).max(1.0)
                && p.x >= a.x.min(b.x) - EPS
                && p.x <= a.x.max(b.x) + EPS
                && p.y >= a.y.min(b.y) - EPS
                && p.y <= a.y.max(b.y) + EPS
        });
        on_edge || self.contains_point(p)
    }

    /// Clip against a convex polygon (Sutherland–Hodgman).
    ///
    /// `clip` must be convex; its orientation may be either way.
    pub fn intersected(&self, clip: &Polygon) -> Polygon {
        if self.is_empty() || clip.is_empty() {
            return Polygon::default();
        }
        let orientation = clip.signed_area().signum();
        let mut output = self.points.clone();
        for (a, b) in clip.edges() {
            if output.is_empty() {
                break;
            }
            let input = std::mem::take(&mut output);
            let inside = |p: PointF| cross(a, b, p) * orientation >= 0.0;
            let n = input.len();
            for i in 0..n {
                let cur = input[i];
                let prev = input[(i + n - 1) % n];
                match (inside(prev), inside(cur)) {
                    (true, true) => output.push(cur),
                    (true, false) => output.push(line_intersection(prev, cur, a, b)),
                    (false, true) => {
                        output.push(line_intersection(prev, cur, a, b));
                        output.push(cur);
                    }
                    (false, false) => {}
                }
            }
        }
        Polygon::new(output)
    }

    /// Signed area; positive for clockwise order in y-down coordinates.
    pub fn signed_area(&self) -> f64 {
        self.edges().map(|(a, b)| a.x * b.y - b.x * a.y).sum::<f64>() / 2.0
    }
}

/// Cross product of `(b - a)` and `(p - a)`.
#[inline]
fn cross(a: PointF, b: PointF, p: PointF) -> f64 {
    (b.x - a.x) * (p.y - a.y) - (p.x - a.x) * (b.y - a.y)
}

fn line_intersection(p1: PointF, p2: PointF, a: PointF, b: PointF) -> PointF {
    let d1 = p2 - p1;
    let d2 = b - a;
    let denom = d1.x * d2.y - d1.y * d2.x;
    if denom.abs() < f64::EPSILON {
        return p2;
    }
    let t = ((a.x - p1.x) * d2.y - (a.y - p1.y) * d2.x) / denom;
    p1 + d1 * t
}
