//! Page geometry from the original scan to the output image
//!
//! Coordinates pass through these stages:
//!
//! 1. original image pixels;
//! 2. pre-rotated: an orthogonal rotation, top-left kept at the origin;
//! 3. post-rotated: a free rotation about the centre of the pre-crop
//!    area, followed by scaling to the output resolution;
//! 4. output: translated so the crop area's bounding box starts at the
//!    origin.
//!
//! The pre-crop area is given in pre-rotated coordinates. The post-crop
//! area is given in output coordinates and re-anchors the output when
//! set. Changing anything upstream of the post-crop area drops it.

use crate::rotate::OrthogonalRotation;
use scanout_core::{Dpi, PointF, Polygon, Rect, RectF, Size, Transform};

/// Original-to-output geometry of one page.
#[derive(Debug, Clone)]
pub struct ImageTransformation {
    orig_size: Size,
    orig_dpi: Dpi,
    output_dpi: Dpi,
    pre_rotation: OrthogonalRotation,
    pre_crop_area: Polygon,
    post_rotation: f64,
    /// In unanchored post-rotated coordinates.
    post_crop_area: Polygon,

    transform: Transform,
    inverse: Transform,
    /// Translation applied by the anchoring step.
    anchor: PointF,
    resulting_rect: RectF,
}

impl ImageTransformation {
    /// Identity geometry for an image of `orig_size` scanned at `orig_dpi`.
    pub fn new(orig_size: Size, orig_dpi: Dpi) -> Self {
        let mut xform = ImageTransformation {
            orig_size,
            orig_dpi,
            output_dpi: orig_dpi,
            pre_rotation: OrthogonalRotation::default(),
            pre_crop_area: Polygon::default(),
            post_rotation: 0.0,
            post_crop_area: Polygon::default(),
            transform: Transform::identity(),
            inverse: Transform::identity(),
            anchor: PointF::default(),
            resulting_rect: RectF::default(),
        };
        xform.update();
        xform
    }

    pub fn orig_rect(&self) -> Rect {
        Rect::from_size(self.orig_size)
    }

    pub fn orig_dpi(&self) -> Dpi {
        self.orig_dpi
    }

    pub fn output_dpi(&self) -> Dpi {
        self.output_dpi
    }

    pub fn pre_rotation(&self) -> OrthogonalRotation {
        self.pre_rotation
    }

    pub fn post_rotation(&self) -> f64 {
        self.post_rotation
    }

    pub fn set_pre_rotation(&mut self, rotation: OrthogonalRotation) {
        self.pre_rotation = rotation;
        self.pre_crop_area = Polygon::default();
        self.post_crop_area = Polygon::default();
        self.update();
    }

    /// Set the pre-crop area, in pre-rotated coordinates. An empty polygon
    /// means the whole image.
    pub fn set_pre_crop_area(&mut self, area: Polygon) {
        self.pre_crop_area = area;
        self.post_crop_area = Polygon::default();
        self.update();
    }

    /// Rotate by `degrees` (clockwise on screen) about the centre of the
    /// pre-crop area.
    pub fn set_post_rotation(&mut self, degrees: f64) {
        self.post_rotation = degrees;
        self.post_crop_area = Polygon::default();
        self.update();
    }

    /// Scale the output to `dpi`. A null resolution on either side keeps
    /// the scale at 1.
    pub fn set_output_dpi(&mut self, dpi: Dpi) {
        self.output_dpi = dpi;
        self.post_crop_area = Polygon::default();
        self.update();
    }

    /// Set the post-crop area, in current output coordinates.
    pub fn set_post_crop_area(&mut self, area: Polygon) {
        self.post_crop_area = area.translated(-self.anchor.x, -self.anchor.y);
        self.update();
    }

    pub fn clear_post_crop_area(&mut self) {
        self.post_crop_area = Polygon::default();
        self.update();
    }

    /// Original to output coordinates.
    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Output to original coordinates.
    pub fn transform_back(&self) -> Transform {
        self.inverse
    }

    /// Bounding box of the crop area in output coordinates; its top-left
    /// corner is always the origin.
    pub fn resulting_rect(&self) -> RectF {
        self.resulting_rect
    }

    /// The pre-crop area in output coordinates.
    pub fn resulting_pre_crop_area(&self) -> Polygon {
        self.post_stage()
            .translated(self.anchor.x, self.anchor.y)
            .map_polygon(&self.effective_pre_crop_area())
    }

    /// The post-crop area in output coordinates, empty when none is set.
    pub fn resulting_post_crop_area(&self) -> Polygon {
        self.post_crop_area.translated(self.anchor.x, self.anchor.y)
    }

    fn pre_rotated_size(&self) -> Size {
        self.pre_rotation.rotate_size(self.orig_size)
    }

    fn effective_pre_crop_area(&self) -> Polygon {
        if self.pre_crop_area.is_empty() {
            Polygon::from_rect(&Rect::from_size(self.pre_rotated_size()).to_rect_f())
        } else {
            self.pre_crop_area.clone()
        }
    }

    fn scale_factors(&self) -> (f64, f64) {
        if self.orig_dpi.is_null() || self.output_dpi.is_null() {
            return (1.0, 1.0);
        }
        (
            f64::from(self.output_dpi.horizontal) / f64::from(self.orig_dpi.horizontal),
            f64::from(self.output_dpi.vertical) / f64::from(self.orig_dpi.vertical),
        )
    }

    fn rotation_center(&self) -> PointF {
        self.effective_pre_crop_area().bounding_rect().center()
    }

    /// Pre-rotated to unanchored output coordinates.
    fn post_stage(&self) -> Transform {
        let (sx, sy) = self.scale_factors();
        Transform::rotation_about(self.rotation_center(), self.post_rotation)
            .then(&Transform::scaling(sx, sy))
    }

    fn update(&mut self) {
        let pre = self.pre_rotation.transform(self.orig_size);
        let post = self.post_stage();
        let crop = if self.post_crop_area.is_empty() {
            post.map_polygon(&self.effective_pre_crop_area())
        } else {
            self.post_crop_area.clone()
        };
        let bounds = crop.bounding_rect();
        self.anchor = PointF::new(-bounds.x, -bounds.y);
        self.transform = pre.then(&post).translated(self.anchor.x, self.anchor.y);
        self.resulting_rect = RectF::new(0.0, 0.0, bounds.w, bounds.h);

        let (sx, sy) = self.scale_factors();
        self.inverse = Transform::translation(-self.anchor.x, -self.anchor.y)
            .then(&Transform::scaling(1.0 / sx, 1.0 / sy))
            .then(&Transform::rotation_about(
                self.rotation_center(),
                -self.post_rotation,
            ))
            .then(&self.pre_rotation.transform_back(self.orig_size));
    }
}
