//! Point mapping between original and dewarped output coordinates

use super::cylindrical::CylindricalSurfaceDewarper;
use super::model::DistortionModel;
use crate::error::RecogResult;
use scanout_core::{PointF, RectF, Transform};

/// Maps points between the original image and the dewarped output,
/// matching what [`super::RasterDewarper`] renders for the same model.
#[derive(Debug, Clone)]
pub struct DewarpingPointMapper {
    dewarper: CylindricalSurfaceDewarper,
    domain: RectF,
    orig_to_output: Transform,
}

impl DewarpingPointMapper {
    /// `model` is in original image coordinates; `orig_to_output` is the
    /// page transform the output was rendered with.
    pub fn new(
        model: &DistortionModel,
        depth_perception: f64,
        orig_to_output: Transform,
    ) -> RecogResult<Self> {
        let dewarper = CylindricalSurfaceDewarper::new(model, depth_perception)?;
        let domain = DistortionModel::model_domain(&dewarper, &orig_to_output)
            .to_rect()
            .to_rect_f();
        Ok(DewarpingPointMapper {
            dewarper,
            domain,
            orig_to_output,
        })
    }

    pub fn domain(&self) -> RectF {
        self.domain
    }

    /// Original to dewarped output coordinates. Points the dewarper cannot
    /// invert go through the plain page transform.
    pub fn map_to_dewarped_space(&self, p: PointF) -> PointF {
        match self.dewarper.map_to_dewarped(p) {
            Some((u, v)) => PointF::new(
                self.domain.x + u * self.domain.w,
                self.domain.y + v * self.domain.h,
            ),
            None => self.orig_to_output.map_point(p),
        }
    }

    /// Dewarped output to original coordinates.
    pub fn map_to_warped_space(&self, p: PointF) -> PointF {
        let u = (p.x - self.domain.x) / self.domain.w;
        let v = (p.y - self.domain.y) / self.domain.h;
        self.dewarper.map_to_image(u, v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dewarp::Curve;

    #[test]
    fn test_round_trip() {
        let top: Vec<PointF> = (0..=10)
            .map(|i| PointF::new(i as f64 * 20.0, 10.0 + (i as f64 - 5.0).powi(2) * 0.4))
            .collect();
        let model = DistortionModel::new(
            Curve::from_polyline(top),
            Curve::from_polyline(vec![PointF::new(0.0, 150.0), PointF::new(200.0, 150.0)]),
        );
        let mapper =
            DewarpingPointMapper::new(&model, 2.0, Transform::scaling(2.0, 2.0)).unwrap();
        let p = PointF::new(90.0, 80.0);
        let out = mapper.map_to_dewarped_space(p);
        assert!(mapper.map_to_warped_space(out).fuzzy_eq(p, 1e-2));
        // Output lives in the scaled space.
        assert!(out.x > 120.0 && out.y > 100.0);
    }

    #[test]
    fn test_flat_model_follows_transform() {
        let model = DistortionModel::new(
            Curve::from_polyline(vec![PointF::new(0.0, 0.0), PointF::new(100.0, 0.0)]),
            Curve::from_polyline(vec![PointF::new(0.0, 50.0), PointF::new(100.0, 50.0)]),
        );
        let xform = Transform::translation(7.0, 3.0);
        let mapper = DewarpingPointMapper::new(&model, 2.0, xform).unwrap();
        let p = PointF::new(25.0, 40.0);
        assert!(mapper.map_to_dewarped_space(p).fuzzy_eq(xform.map_point(p), 1e-3));
    }
}
