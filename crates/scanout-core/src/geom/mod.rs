//! Geometry primitives
//!
//! - [`PointF`] - floating point 2D point
//! - [`Size`] - unsigned raster dimensions
//! - [`Rect`] - integer rectangle (pixel grid), half-open on the right and bottom
//! - [`RectF`] - floating point rectangle
//! - [`Polygon`] - closed polygon with winding-rule containment
//! - [`Transform`] - 2D affine transform

mod polygon;
mod xform;

pub use polygon::Polygon;
pub use xform::Transform;

use serde::{Deserialize, Serialize};

/// Floating point 2D point
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointF {
    pub x: f64,
    pub y: f64,
}

impl PointF {
    /// Create a new point.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        PointF { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: PointF) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Linear interpolation: `self + (other - self) * t`.
    pub fn lerp(&self, other: PointF, t: f64) -> PointF {
        PointF::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    /// Check if two points coincide within `eps` on both axes.
    pub fn fuzzy_eq(&self, other: PointF, eps: f64) -> bool {
        (self.x - other.x).abs() < eps && (self.y - other.y).abs() < eps
    }
}

impl std::ops::Add for PointF {
    type Output = PointF;
    fn add(self, rhs: PointF) -> PointF {
        PointF::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for PointF {
    type Output = PointF;
    fn sub(self, rhs: PointF) -> PointF {
        PointF::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Mul<f64> for PointF {
    type Output = PointF;
    fn mul(self, rhs: f64) -> PointF {
        PointF::new(self.x * rhs, self.y * rhs)
    }
}

/// Raster dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    /// Create a new size.
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Size { width, height }
    }

    /// True if either dimension is zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Grow each dimension to at least 1.
    pub fn expanded_to_one(&self) -> Size {
        Size::new(self.width.max(1), self.height.max(1))
    }
}

/// Integer rectangle on the pixel grid.
///
/// Covers columns `x..x + w` and rows `y..y + h`. A rectangle with a
/// non-positive width or height is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Rect { x, y, w, h }
    }

    /// Rectangle at the origin with the given size.
    pub fn from_size(size: Size) -> Self {
        Rect::new(0, 0, size.width as i32, size.height as i32)
    }

    /// Left edge (inclusive).
    #[inline]
    pub fn left(&self) -> i32 {
        self.x
    }

    /// Top edge (inclusive).
    #[inline]
    pub fn top(&self) -> i32 {
        self.y
    }

    /// Right edge (exclusive).
    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// Dimensions, clamped to zero for empty rectangles.
    pub fn size(&self) -> Size {
        Size::new(self.w.max(0) as u32, self.h.max(0) as u32)
    }

    /// Geometric centre.
    pub fn center(&self) -> PointF {
        PointF::new(
            f64::from(self.x) + f64::from(self.w) / 2.0,
            f64::from(self.y) + f64::from(self.h) / 2.0,
        )
    }

    /// Intersection; empty (default) when the rectangles do not overlap.
    pub fn intersected(&self, other: &Rect) -> Rect {
        if self.is_empty() || other.is_empty() {
            return Rect::default();
        }
        let l = self.left().max(other.left());
        let t = self.top().max(other.top());
        let r = self.right().min(other.right());
        let b = self.bottom().min(other.bottom());
        if r <= l || b <= t {
            return Rect::default();
        }
        Rect::new(l, t, r - l, b - t)
    }

    /// Bounding rectangle of both; an empty side is ignored.
    pub fn united(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let l = self.left().min(other.left());
        let t = self.top().min(other.top());
        let r = self.right().max(other.right());
        let b = self.bottom().max(other.bottom());
        Rect::new(l, t, r - l, b - t)
    }

    /// Move each edge by the given deltas.
    pub fn adjusted(&self, dl: i32, dt: i32, dr: i32, db: i32) -> Rect {
        Rect::new(self.x + dl, self.y + dt, self.w - dl + dr, self.h - dt + db)
    }

    /// Grow by `margin` on every side.
    pub fn grown(&self, margin: i32) -> Rect {
        self.adjusted(-margin, -margin, margin, margin)
    }

    pub fn translated(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.w, self.h)
    }

    /// Check whether pixel `(x, y)` lies inside.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left() && x < self.right() && y >= self.top() && y < self.bottom()
    }

    /// Check whether `other` lies fully inside.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        !other.is_empty()
            && other.left() >= self.left()
            && other.top() >= self.top()
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Floating point copy.
    pub fn to_rect_f(&self) -> RectF {
        RectF::new(
            f64::from(self.x),
            f64::from(self.y),
            f64::from(self.w),
            f64::from(self.h),
        )
    }
}

/// Floating point rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RectF {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl RectF {
    #[inline]
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        RectF { x, y, w, h }
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    pub fn is_empty(&self) -> bool {
        self.w <= 0.0 || self.h <= 0.0
    }

    pub fn top_left(&self) -> PointF {
        PointF::new(self.x, self.y)
    }

    pub fn center(&self) -> PointF {
        PointF::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Round to the pixel grid.
    ///
    /// Both corners are rounded independently, so a rectangle spanning
    /// `[0.4, 9.6)` becomes `0..10`.
    pub fn to_rect(&self) -> Rect {
        let l = self.x.round() as i32;
        let t = self.y.round() as i32;
        let r = self.right().round() as i32;
        let b = self.bottom().round() as i32;
        Rect::new(l, t, r - l, b - t)
    }

    /// Corners in clockwise order starting from the top-left.
    pub fn corners(&self) -> [PointF; 4] {
        [
            PointF::new(self.x, self.y),
            PointF::new(self.right(), self.y),
            PointF::new(self.right(), self.bottom()),
            PointF::new(self.x, self.bottom()),
        ]
    }
}
