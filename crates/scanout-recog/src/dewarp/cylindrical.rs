//! Cylindrical surface model of a curled page
//!
//! A point `(u, v)` of the flattened page, both in `[0, 1]`, lies on the
//! generatrix joining the top curve at arc length `u` with the bottom
//! curve at the same arc length. Along the generatrix `v` is warped by a
//! homographic term derived from the length ratio of the two curves, so
//! the half of the page nearer the camera gets more room.

use super::model::DistortionModel;
use super::polyline::ArcPolyline;
use crate::error::{RecogError, RecogResult};
use scanout_core::PointF;

/// Accepted depth perception range.
pub const MIN_DEPTH_PERCEPTION: f64 = 1.0;
pub const MAX_DEPTH_PERCEPTION: f64 = 3.0;

const MAX_NEWTON_ITERATIONS: usize = 40;
const NEWTON_TOLERANCE: f64 = 1e-4;

#[derive(Debug, Clone)]
pub struct CylindricalSurfaceDewarper {
    top: ArcPolyline,
    bottom: ArcPolyline,
    /// Homographic factor along each generatrix.
    k: f64,
}

impl CylindricalSurfaceDewarper {
    /// Build a dewarper for `model`.
    ///
    /// # Errors
    ///
    /// [`RecogError::InvalidModel`] if the model does not pass
    /// [`DistortionModel::is_valid`], [`RecogError::InvalidParameter`] if
    /// `depth_perception` is outside `1.0..=3.0`.
    pub fn new(model: &DistortionModel, depth_perception: f64) -> RecogResult<Self> {
        if !(MIN_DEPTH_PERCEPTION..=MAX_DEPTH_PERCEPTION).contains(&depth_perception) {
            return Err(RecogError::InvalidParameter(format!(
                "depth perception must be in {MIN_DEPTH_PERCEPTION}..={MAX_DEPTH_PERCEPTION}, got {depth_perception}"
            )));
        }
        if !model.is_valid() {
            return Err(RecogError::InvalidModel(
                "curves are degenerate or cross each other".to_string(),
            ));
        }
        let (Some(top), Some(bottom)) = (
            ArcPolyline::new(model.top_curve().polyline()),
            ArcPolyline::new(model.bottom_curve().polyline()),
        ) else {
            return Err(RecogError::InvalidModel("curve has no length".to_string()));
        };
        let ratio = top.length() / bottom.length();
        let k = ratio.powf(depth_perception / 2.0).clamp(0.5, 2.0);
        tracing::trace!(k, depth_perception, "cylindrical dewarper");
        Ok(CylindricalSurfaceDewarper { top, bottom, k })
    }

    /// Generatrix end points at `u`.
    pub fn generatrix(&self, u: f64) -> (PointF, PointF) {
        (self.top.point_at(u), self.bottom.point_at(u))
    }

    /// Position along a generatrix for the flattened coordinate `v`.
    pub fn warp_v(&self, v: f64) -> f64 {
        let denom = 1.0 + v * (self.k - 1.0);
        v * self.k / denom.max(0.05)
    }

    /// Flattened `(u, v)` to image coordinates.
    pub fn map_to_image(&self, u: f64, v: f64) -> PointF {
        let (t, b) = self.generatrix(u);
        t.lerp(b, self.warp_v(v))
    }

    /// Image coordinates to flattened `(u, v)`, or `None` if the iteration
    /// does not converge.
    pub fn map_to_dewarped(&self, p: PointF) -> Option<(f64, f64)> {
        const H: f64 = 1e-5;
        let (mut u, mut v) = (0.5, 0.5);
        for _ in 0..MAX_NEWTON_ITERATIONS {
            let f = self.map_to_image(u, v) - p;
            if f.x.hypot(f.y) < NEWTON_TOLERANCE {
                return Some((u, v));
            }
            let du = (self.map_to_image(u + H, v) - self.map_to_image(u - H, v)) * (0.5 / H);
            let dv = (self.map_to_image(u, v + H) - self.map_to_image(u, v - H)) * (0.5 / H);
            let det = du.x * dv.y - dv.x * du.y;
            if det.abs() < 1e-12 {
                return None;
            }
            let step_u = (f.x * dv.y - dv.x * f.y) / det;
            let step_v = (du.x * f.y - f.x * du.y) / det;
            u -= step_u.clamp(-0.5, 0.5);
            v -= step_v.clamp(-0.5, 0.5);
        }
        let f = self.map_to_image(u, v) - p;
        (f.x.hypot(f.y) < NEWTON_TOLERANCE * 10.0).then_some((u, v))
    }
}
