//! Parameters an output image was generated with
//!
//! Stored next to a generated page so a later run can tell whether the
//! page must be regenerated. [`OutputImageParams::matches`] ignores the
//! options that the page's color mode does not use.

use crate::params::{
    ColorMode, ColorParams, DepthPerception, DewarpingMode, DewarpingOptions,
    OutputProcessingParams, PictureShapeOptions, SplittingOptions,
};
use scanout_core::{Dpi, Polygon, Rect, Size, Transform};
use scanout_recog::DistortionModel;
use scanout_region::DespeckleLevel;
use scanout_transform::ImageTransformation;
use serde::{Deserialize, Serialize};

/// Coefficients and crop area coordinates closer than this are
/// considered equal.
const XFORM_TOLERANCE: f64 = 1e-4;

/// Linear part of the original-to-output transform, without the post-crop
/// area.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PartialXform {
    pub m11: f64,
    pub m12: f64,
    pub m21: f64,
    pub m22: f64,
}

impl PartialXform {
    pub fn from_transform(xform: &Transform) -> Self {
        PartialXform {
            m11: xform.m11,
            m12: xform.m12,
            m21: xform.m21,
            m22: xform.m22,
        }
    }

    pub fn from_image_transformation(xform: &ImageTransformation) -> Self {
        let mut xform = xform.clone();
        xform.clear_post_crop_area();
        Self::from_transform(&xform.transform())
    }

    pub fn matches(&self, other: &PartialXform) -> bool {
        [
            (self.m11, other.m11),
            (self.m12, other.m12),
            (self.m21, other.m21),
            (self.m22, other.m22),
        ]
        .iter()
        .all(|(a, b)| (a - b).abs() < XFORM_TOLERANCE)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputImageParams {
    pub size: Size,
    pub content_rect: Rect,
    /// Pre-crop area in output coordinates.
    pub crop_area: Polygon,
    pub partial_xform: PartialXform,
    pub dpi: Dpi,
    pub color_params: ColorParams,
    pub splitting_options: SplittingOptions,
    pub picture_shape_options: PictureShapeOptions,
    pub dewarping_options: DewarpingOptions,
    pub distortion_model: DistortionModel,
    pub depth_perception: DepthPerception,
    pub despeckle_level: DespeckleLevel,
    pub output_processing_params: OutputProcessingParams,
}

impl OutputImageParams {
    /// True when an image generated with `other` can stand in for one
    /// generated with `self`.
    pub fn matches(&self, other: &OutputImageParams) -> bool {
        if self.size != other.size
            || self.content_rect != other.content_rect
            || !self.crop_area.fuzzy_eq(&other.crop_area, XFORM_TOLERANCE)
            || !self.partial_xform.matches(&other.partial_xform)
            || self.dpi != other.dpi
        {
            return false;
        }
        if !self.color_params_match(other) {
            return false;
        }
        if self.picture_shape_options != other.picture_shape_options {
            return false;
        }
        if self.dewarping_options != other.dewarping_options {
            return false;
        }
        if self.dewarping_options.mode != DewarpingMode::Off {
            if !self.distortion_model.matches(&other.distortion_model) {
                return false;
            }
            if self.depth_perception.value() != other.depth_perception.value() {
                return false;
            }
        }
        self.output_processing_params == other.output_processing_params
    }

    fn color_params_match(&self, other: &OutputImageParams) -> bool {
        let (a, b) = (&self.color_params, &other.color_params);
        if a.color_mode != b.color_mode {
            return false;
        }
        let splitting_ok = self.splitting_options == other.splitting_options;
        let bw_ok = a.black_white_options == b.black_white_options
            && self.despeckle_level == other.despeckle_level;
        let common_ok = a.color_common_options == b.color_common_options;
        match a.color_mode {
            ColorMode::Mixed => splitting_ok && bw_ok && common_ok,
            ColorMode::BlackAndWhite => bw_ok && common_ok,
            ColorMode::ColorGrayscale => common_ok,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{BlackWhiteOptions, ForegroundType};
    use scanout_core::{PointF, RectF};
    use scanout_recog::Curve;

    fn params(mode: ColorMode) -> OutputImageParams {
        OutputImageParams {
            size: Size::new(100, 80),
            content_rect: Rect::new(5, 5, 90, 70),
            crop_area: Polygon::from_rect(&RectF::new(0.0, 0.0, 100.0, 80.0)),
            partial_xform: PartialXform::from_transform(&Transform::identity()),
            dpi: Dpi::square(300),
            color_params: ColorParams::new(mode),
            splitting_options: SplittingOptions::default(),
            picture_shape_options: PictureShapeOptions::default(),
            dewarping_options: DewarpingOptions::default(),
            distortion_model: DistortionModel::default(),
            depth_perception: DepthPerception::default(),
            despeckle_level: DespeckleLevel::Normal,
            output_processing_params: OutputProcessingParams::default(),
        }
    }

    #[test]
    fn test_matches_is_reflexive_and_tolerant() {
        let a = params(ColorMode::BlackAndWhite);
        assert!(a.matches(&a.clone()));
        let mut b = a.clone();
        b.partial_xform.m11 += 5e-5;
        assert!(a.matches(&b));
        b.partial_xform.m11 += 1e-3;
        assert!(!a.matches(&b));
    }

    #[test]
    fn test_crop_area_jitter_is_tolerated() {
        let xf = ImageTransformation::new(Size::new(100, 80), Dpi::square(300));
        let a = OutputImageParams {
            crop_area: xf.resulting_pre_crop_area(),
            ..params(ColorMode::BlackAndWhite)
        };
        let mut b = a.clone();
        b.crop_area = Transform::translation(3e-5, -2e-5)
            .then(&Transform::scaling(1.0 + 1e-7, 1.0))
            .map_polygon(&a.crop_area);
        assert!(b.crop_area != a.crop_area);
        assert!(a.matches(&b));

        b.crop_area = a.crop_area.translated(0.5, 0.0);
        assert!(!a.matches(&b));
    }

    #[test]
    fn test_unused_options_are_ignored() {
        let a = params(ColorMode::ColorGrayscale);
        let mut b = a.clone();
        b.color_params.black_white_options = BlackWhiteOptions::default().with_threshold_adjustment(30);
        b.despeckle_level = DespeckleLevel::Off;
        b.splitting_options.split_output = true;
        assert!(a.matches(&b));

        let a = params(ColorMode::BlackAndWhite);
        let mut b = a.clone();
        b.splitting_options.foreground_type = ForegroundType::Color;
        assert!(a.matches(&b));
        b.despeckle_level = DespeckleLevel::Aggressive;
        assert!(!a.matches(&b));

        let a = params(ColorMode::Mixed);
        let mut b = a.clone();
        b.splitting_options.split_output = true;
        assert!(!a.matches(&b));
    }

    #[test]
    fn test_distortion_model_only_compared_when_dewarping() {
        let a = params(ColorMode::BlackAndWhite);
        let mut b = a.clone();
        b.distortion_model.set_top_curve(Curve::from_polyline(vec![
            PointF::new(0.0, 0.0),
            PointF::new(10.0, 0.0),
        ]));
        b.depth_perception = DepthPerception::new(2.5);
        assert!(a.matches(&b));

        let mut a = a;
        a.dewarping_options.mode = DewarpingMode::Manual;
        b.dewarping_options.mode = DewarpingMode::Manual;
        assert!(!a.matches(&b));
    }

    #[test]
    fn test_serde_round_trip_matches() {
        let a = params(ColorMode::Mixed);
        let json = serde_json::to_string(&a).unwrap();
        let back: OutputImageParams = serde_json::from_str(&json).unwrap();
        assert!(a.matches(&back));
    }

    #[test]
    fn test_partial_xform_drops_post_crop() {
        let mut xf = ImageTransformation::new(Size::new(200, 100), Dpi::square(300));
        xf.set_post_rotation(2.0);
        let before = PartialXform::from_image_transformation(&xf);
        xf.set_post_crop_area(Polygon::from_rect(&RectF::new(10.0, 10.0, 50.0, 50.0)));
        assert!(before.matches(&PartialXform::from_image_transformation(&xf)));
    }
}
