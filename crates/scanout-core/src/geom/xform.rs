//! 2D affine transforms
//!
//! A point `(x, y)` maps to
//!
//! ```text
//! x' = m11 * x + m21 * y + dx
//! y' = m12 * x + m22 * y + dy
//! ```
//!
//! Composition reads left to right: `a.then(&b)` applies `a` first.

use super::{PointF, Polygon, RectF};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Determinants smaller than this are treated as singular.
const SINGULAR_EPS: f64 = 1e-12;

/// Affine transform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub m11: f64,
    pub m12: f64,
    pub m21: f64,
    pub m22: f64,
    pub dx: f64,
    pub dy: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    /// Create a transform from its six coefficients.
    pub const fn new(m11: f64, m12: f64, m21: f64, m22: f64, dx: f64, dy: f64) -> Self {
        Transform {
            m11,
            m12,
            m21,
            m22,
            dx,
            dy,
        }
    }

    pub const fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    pub const fn translation(dx: f64, dy: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, dx, dy)
    }

    pub const fn scaling(sx: f64, sy: f64) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Rotation by `degrees` (clockwise on screen, y pointing down).
    pub fn rotation(degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self::new(cos, sin, -sin, cos, 0.0, 0.0)
    }

    /// Rotation by `degrees` around `center`.
    pub fn rotation_about(center: PointF, degrees: f64) -> Self {
        Self::translation(-center.x, -center.y)
            .then(&Self::rotation(degrees))
            .then(&Self::translation(center.x, center.y))
    }

    /// Apply `self` first, then `next`.
    pub fn then(&self, next: &Transform) -> Transform {
        Transform::new(
            self.m11 * next.m11 + self.m12 * next.m21,
            self.m11 * next.m12 + self.m12 * next.m22,
            self.m21 * next.m11 + self.m22 * next.m21,
            self.m21 * next.m12 + self.m22 * next.m22,
            self.dx * next.m11 + self.dy * next.m21 + next.dx,
            self.dx * next.m12 + self.dy * next.m22 + next.dy,
        )
    }

    /// Append a translation.
    pub fn translated(&self, dx: f64, dy: f64) -> Transform {
        self.then(&Transform::translation(dx, dy))
    }

    pub fn determinant(&self) -> f64 {
        self.m11 * self.m22 - self.m12 * self.m21
    }

    /// Inverse transform.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SingularTransform`] if the linear part is not
    /// invertible.
    pub fn inverted(&self) -> Result<Transform> {
        let det = self.determinant();
        if det.abs() < SINGULAR_EPS {
            return Err(Error::SingularTransform);
        }
        let m11 = self.m22 / det;
        let m12 = -self.m12 / det;
        let m21 = -self.m21 / det;
        let m22 = self.m11 / det;
        let dx = -(self.dx * m11 + self.dy * m21);
        let dy = -(self.dx * m12 + self.dy * m22);
        Ok(Transform::new(m11, m12, m21, m22, dx, dy))
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    /// Linear part only (translation dropped).
    pub fn linear(&self) -> Transform {
        Transform::new(self.m11, self.m12, self.m21, self.m22, 0.0, 0.0)
    }

    #[inline]
    pub fn map_point(&self, p: PointF) -> PointF {
        PointF::new(
            self.m11 * p.x + self.m21 * p.y + self.dx,
            self.m12 * p.x + self.m22 * p.y + self.dy,
        )
    }

    pub fn map_polygon(&self, poly: &Polygon) -> Polygon {
        Polygon::new(poly.points().iter().map(|&p| self.map_point(p)).collect())
    }

    /// Map a rectangle; the result is the mapped quadrilateral.
    pub fn map_rect(&self, rect: &RectF) -> Polygon {
        Polygon::new(rect.corners().iter().map(|&p| self.map_point(p)).collect())
    }

    /// Coefficient-wise comparison with an absolute tolerance.
    pub fn fuzzy_eq(&self, other: &Transform, eps: f64) -> bool {
        (self.m11 - other.m11).abs() < eps
            && (self.m12 - other.m12).abs() < eps
            && (self.m21 - other.m21).abs() < eps
            && (self.m22 - other.m22).abs() < eps
            && (self.dx - other.dx).abs() < eps
            && (self.dy - other.dy).abs() < eps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: PointF, b: PointF) -> bool {
        a.fuzzy_eq(b, 1e-9)
    }

    #[test]
    fn test_then_order() {
        let t = Transform::scaling(2.0, 2.0).then(&Transform::translation(1.0, 0.0));
        assert!(close(t.map_point(PointF::new(1.0, 1.0)), PointF::new(3.0, 2.0)));
    }

    #[test]
    fn test_rotation_90() {
        let t = Transform::rotation(90.0);
        assert!(close(t.map_point(PointF::new(1.0, 0.0)), PointF::new(0.0, 1.0)));
    }

    #[test]
    fn test_rotation_about_center_keeps_center() {
        let c = PointF::new(5.0, 7.0);
        let t = Transform::rotation_about(c, 33.0);
        assert!(close(t.map_point(c), c));
    }

    #[test]
    fn test_inverse() {
        let t = Transform::rotation(17.0)
            .then(&Transform::scaling(1.5, 0.5))
            .translated(3.0, -4.0);
        let inv = t.inverted().unwrap();
        let p = PointF::new(12.0, -3.5);
        assert!(close(inv.map_point(t.map_point(p)), p));
        assert!(t.then(&inv).fuzzy_eq(&Transform::identity(), 1e-9));
    }

    #[test]
    fn test_singular() {
        assert!(Transform::scaling(0.0, 1.0).inverted().is_err());
    }
}
