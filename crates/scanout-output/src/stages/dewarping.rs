//! Distortion models and dewarped rendering
//!
//! Models are kept in original image coordinates. The generator picks a
//! model by dewarping mode, renders through [`dewarp_with_fallback`] and
//! optionally straightens the result with [`maybe_deskew`].

use crate::error::{OutputError, OutputResult};
use crate::params::{DepthPerception, DewarpingMode, DewarpingOptions};
use crate::settings::SubPage;
use scanout_core::{Pix, PixelDepth, PointF, Polygon, Rect, RectF, Size, Transform};
use scanout_recog::{
    Curve, CurveTracer, CylindricalSurfaceDewarper, DistortionModel, RasterDewarper,
    SkewDetectOptions, Spline, find_skew,
};
use scanout_transform::{ImageTransformation, OutsidePixels, rotate_about_center};

/// Vertical page borders leaning more than this (degrees) get corrected.
const MAX_VERTICAL_SKEW: f64 = 2.75;

/// Control points added along the top line for marginal dewarping.
const MARGINAL_POINTS: usize = 5;

/// Rows of white that mark a margin.
const MARGIN_RUN: i64 = 16;

/// A model that leaves the page as is: the corners of `content_rect`
/// (output coordinates) taken back to the original image.
pub fn trivial_distortion_model(content_rect: Rect, xform: &ImageTransformation) -> DistortionModel {
    let corners = if content_rect.is_empty() {
        let c = PointF::new(f64::from(content_rect.x), f64::from(content_rect.y));
        RectF::new(c.x - 0.5, c.y - 0.5, 1.0, 1.0).corners()
    } else {
        content_rect.to_rect_f().corners()
    };
    let back = xform.transform_back();
    let [tl, tr, br, bl] = corners.map(|p| back.map_point(p));
    DistortionModel::new(
        Curve::from_polyline(vec![tl, tr]),
        Curve::from_polyline(vec![bl, br]),
    )
}

fn vertical_skew_degrees(top: PointF, bottom: PointF) -> f64 {
    ((bottom.x - top.x) / (bottom.y - top.y)).atan().to_degrees().abs()
}

/// Trace a model over the warped gray output and bring it to original
/// coordinates.
///
/// `content_rect` is in `warped_gray` coordinates and `to_original` maps
/// them to the original image. Falls back to `trivial` when tracing fails
/// or yields an invalid model.
pub fn trace_auto_model(
    tracer: &dyn CurveTracer,
    warped_gray: &Pix,
    content_rect: Rect,
    to_original: &Transform,
    trivial: &DistortionModel,
) -> DistortionModel {
    match tracer.trace(warped_gray, content_rect) {
        Ok(model) => {
            let model = model.transformed(to_original);
            if model.is_valid() {
                model
            } else {
                tracing::debug!("traced model is invalid, using trivial model");
                trivial.clone()
            }
        }
        Err(err) => {
            tracing::debug!(%err, "curve tracing failed, using trivial model");
            trivial.clone()
        }
    }
}

/// Straighten a leaning outer page border.
///
/// The border on the outer side (left for single and left pages, right
/// for right pages) is measured in pre-rotated coordinates. When it leans
/// more than [`MAX_VERTICAL_SKEW`], a point is added that makes it
/// vertical, and the extended curve replaces the bottom curve.
pub fn correct_vertical_border(
    model: &mut DistortionModel,
    pre_rotation: &Transform,
    sub_page: SubPage,
) -> OutputResult<()> {
    let inv = pre_rotation.inverted()?;
    let top: Vec<PointF> = model
        .top_curve()
        .polyline()
        .iter()
        .map(|&p| pre_rotation.map_point(p))
        .collect();
    let bottom: Vec<PointF> = model
        .bottom_curve()
        .polyline()
        .iter()
        .map(|&p| pre_rotation.map_point(p))
        .collect();
    let front = sub_page != SubPage::Right;
    let edge = |pts: &[PointF]| if front { pts.first().copied() } else { pts.last().copied() };
    let (Some(t), Some(b)) = (edge(&top), edge(&bottom)) else {
        return Ok(());
    };

    let angle = vertical_skew_degrees(t, b);
    if angle <= MAX_VERTICAL_SKEW {
        return Ok(());
    }
    tracing::debug!(angle, ?sub_page, "correcting vertical page border");

    // Extend the curve whose end lies further inward.
    let top_inward = if front { t.x < b.x } else { t.x > b.x };
    let (pt, curve) = if top_inward {
        (PointF::new(t.x, b.y), &bottom)
    } else {
        (PointF::new(b.x, t.y), &top)
    };
    let mut polyline: Vec<PointF> = curve.iter().map(|&p| inv.map_point(p)).collect();
    let pt = inv.map_point(pt);
    if front {
        polyline.insert(0, pt);
    } else {
        polyline.push(pt);
    }
    model.set_bottom_curve(Curve::from_polyline(polyline));
    Ok(())
}

fn is_white(bw: &Pix, x: i64, y: i64) -> bool {
    if x < 0 || y < 0 {
        return false;
    }
    bw.get_pixel(x as u32, y as u32) == Some(0)
}

/// First row from the top where a run of white starts.
fn move_to_top_margin(bw: &Pix, pos: PointF) -> PointF {
    let x = pos.x as i64;
    let mut j = 0i64;
    while (j as f64) < pos.y {
        if (j..j + MARGIN_RUN).all(|jj| is_white(bw, x, jj)) {
            return PointF::new(pos.x, j as f64);
        }
        j += 1;
    }
    pos
}

/// First row from the bottom where an upward run of white starts.
fn move_to_bottom_margin(bw: &Pix, pos: PointF) -> PointF {
    let x = pos.x as i64;
    let mut j = i64::from(bw.height()) - 1;
    while (j as f64) > pos.y {
        if (j - MARGIN_RUN + 1..=j).all(|jj| is_white(bw, x, jj)) {
            return PointF::new(pos.x, j as f64);
        }
        j -= 1;
    }
    pos
}

/// Model whose curves follow the top and bottom page margins.
///
/// `gray` is the original grayscale page. Control points are placed on
/// the outer part of the top line and snapped to the margins of the
/// pre-rotated page. Returns `trivial` if the result is not usable.
pub fn build_marginal_model(
    gray: &Pix,
    xform: &ImageTransformation,
    trivial: &DistortionModel,
    sub_page: SubPage,
) -> OutputResult<DistortionModel> {
    let rotation = xform.pre_rotation();
    let to_rotated = rotation.transform(gray.size());
    let from_rotated = to_rotated.inverted()?;
    let bw = rotation.rotate(&gray.threshold_to_binary(64)?)?;

    let (Some(top_front), Some(top_back), Some(bottom_front), Some(bottom_back)) = (
        trivial.top_curve().front(),
        trivial.top_curve().back(),
        trivial.bottom_curve().front(),
        trivial.bottom_curve().back(),
    ) else {
        return Ok(trivial.clone());
    };
    let (p1, p2) = (to_rotated.map_point(top_front), to_rotated.map_point(top_back));
    let steps: Vec<usize> = if sub_page == SubPage::Right {
        (1..=MARGINAL_POINTS).collect()
    } else {
        (29 - MARGINAL_POINTS..29).collect()
    };
    let inner: Vec<PointF> = steps.iter().map(|&i| p1.lerp(p2, i as f64 / 29.0)).collect();

    let spline = |first: PointF, last: PointF, snap: fn(&Pix, PointF) -> PointF| {
        let points = std::iter::once(first)
            .chain(inner.iter().copied())
            .chain(std::iter::once(last))
            .map(|p| from_rotated.map_point(snap(&bw, p)))
            .collect();
        Curve::from_spline(Spline::from_control_points(points))
    };
    let top = spline(p1, p2, move_to_top_margin);
    let bottom = spline(
        to_rotated.map_point(bottom_front),
        to_rotated.map_point(bottom_back),
        move_to_bottom_margin,
    );

    let model = DistortionModel::new(top, bottom);
    if model.is_valid() {
        Ok(model)
    } else {
        tracing::debug!("marginal model is invalid, using trivial model");
        Ok(trivial.clone())
    }
}

/// Render `src` flattened according to `model`.
///
/// `model` is in original coordinates; `orig_to_src` maps it onto `src`
/// and `src_to_output` maps `src` to the output page. An empty model
/// domain gives a white page.
pub fn dewarp(
    orig_to_src: &Transform,
    src: &Pix,
    src_to_output: &Transform,
    model: &DistortionModel,
    depth: DepthPerception,
    out_size: Size,
    background: u32,
) -> OutputResult<Pix> {
    let dewarper = CylindricalSurfaceDewarper::new(&model.transformed(orig_to_src), depth.value())?;
    let domain = DistortionModel::model_domain(&dewarper, src_to_output).to_rect();
    if domain.is_empty() {
        tracing::debug!(?domain, "empty model domain");
        return Ok(Pix::new_white(out_size.expanded_to_one(), PixelDepth::Bit8)?);
    }
    Ok(RasterDewarper::dewarp(src, out_size.expanded_to_one(), &dewarper, domain, background)?)
}

/// [`dewarp`], retrying once with `trivial` when the model is unusable.
///
/// On retry `model` is replaced by `trivial`.
#[allow(clippy::too_many_arguments)]
pub fn dewarp_with_fallback(
    orig_to_src: &Transform,
    src: &Pix,
    src_to_output: &Transform,
    model: &mut DistortionModel,
    trivial: &DistortionModel,
    depth: DepthPerception,
    out_size: Size,
    background: u32,
) -> OutputResult<Pix> {
    match dewarp(orig_to_src, src, src_to_output, model, depth, out_size, background) {
        Err(OutputError::Recog(err)) => {
            tracing::warn!(%err, "dewarping failed, falling back to trivial model");
            *model = trivial.clone();
            dewarp(orig_to_src, src, src_to_output, model, depth, out_size, background)
        }
        other => other,
    }
}

/// Rotate `image` by `angle` degrees about its centre.
pub fn deskew(image: &Pix, angle: f64, outside: OutsidePixels) -> OutputResult<Pix> {
    Ok(rotate_about_center(image, angle, outside)?)
}

/// Detect and remove residual skew after dewarping.
///
/// Only for marginal and manual dewarping with post-deskew enabled.
/// Returns the applied angle, zero when nothing was done.
pub fn maybe_deskew(image: &mut Pix, options: &DewarpingOptions, background: u32) -> OutputResult<f64> {
    if !options.post_deskew
        || !matches!(options.mode, DewarpingMode::Marginal | DewarpingMode::Manual)
    {
        return Ok(0.0);
    }
    let bw = image.threshold_to_binary(128)?;
    let skew = find_skew(&bw, &SkewDetectOptions::default())?;
    tracing::debug!(angle = skew.angle, confidence = skew.confidence, "post-dewarp skew");
    if skew.angle != 0.0 && skew.is_confident() {
        *image = deskew(image, skew.angle, OutsidePixels::WeakColor(background))?;
        return Ok(skew.angle);
    }
    Ok(0.0)
}

/// Transform matching [`deskew`] on an image of `size`.
pub fn post_deskew_transform(size: Size, angle: f64) -> Transform {
    if angle == 0.0 {
        return Transform::identity();
    }
    let center = PointF::new(f64::from(size.width / 2), f64::from(size.height / 2));
    Transform::rotation_about(center, -angle)
}

/// The crop polygon in original coordinates, clipped to the content box
/// when margins are cut.
pub fn content_area_in_original(
    xform: &ImageTransformation,
    content_rect: Rect,
    cut_margins: bool,
) -> Polygon {
    let back = xform.transform_back();
    let area = back.map_polygon(&xform.resulting_pre_crop_area());
    if cut_margins {
        area.intersected(&back.map_rect(&content_rect.to_rect_f()))
    } else {
        area
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanout_core::Dpi;
    use scanout_recog::ContentBoundaryTracer;

    fn xform(w: u32, h: u32) -> ImageTransformation {
        ImageTransformation::new(Size::new(w, h), Dpi::square(300))
    }

    #[test]
    fn test_trivial_model_matches_content_rect() {
        let model = trivial_distortion_model(Rect::new(10, 20, 100, 50), &xform(200, 100));
        assert!(model.is_valid());
        assert_eq!(model.top_curve().polyline(), &[PointF::new(10.0, 20.0), PointF::new(110.0, 20.0)]);
        assert_eq!(model.bottom_curve().polyline(), &[PointF::new(10.0, 70.0), PointF::new(110.0, 70.0)]);

        let tiny = trivial_distortion_model(Rect::new(5, 5, 0, 0), &xform(200, 100));
        assert_eq!(tiny.top_curve().front(), Some(PointF::new(4.5, 4.5)));
    }

    #[test]
    fn test_trivial_model_dewarps_to_identity() {
        let mut pm = Pix::new_filled(60, 40, PixelDepth::Bit8, 200).unwrap().into_mut();
        pm.fill_rect(Rect::new(20, 10, 20, 20), 30);
        let src: Pix = pm.into();
        let xf = xform(60, 40);
        let model = trivial_distortion_model(Rect::new(0, 0, 60, 40), &xf);
        let out = dewarp(
            &Transform::identity(),
            &src,
            &xf.transform(),
            &model,
            DepthPerception::default(),
            Size::new(60, 40),
            scanout_core::color::WHITE,
        )
        .unwrap();
        assert_eq!(out.size(), Size::new(60, 40));
        assert!(out.get_pixel(30, 20).unwrap() < 60);
        assert!(out.get_pixel(5, 5).unwrap() > 180);
    }

    #[test]
    fn test_invalid_model_falls_back_once() {
        let src = Pix::new_filled(40, 40, PixelDepth::Bit8, 200).unwrap();
        let xf = xform(40, 40);
        let trivial = trivial_distortion_model(Rect::new(0, 0, 40, 40), &xf);
        // Curves crossing each other.
        let mut model = DistortionModel::new(
            Curve::from_polyline(vec![PointF::new(0.0, 0.0), PointF::new(40.0, 40.0)]),
            Curve::from_polyline(vec![PointF::new(0.0, 40.0), PointF::new(40.0, 0.0)]),
        );
        let out = dewarp_with_fallback(
            &Transform::identity(),
            &src,
            &xf.transform(),
            &mut model,
            &trivial,
            DepthPerception::default(),
            Size::new(40, 40),
            scanout_core::color::WHITE,
        )
        .unwrap();
        assert_eq!(out.size(), Size::new(40, 40));
        assert!(model.matches(&trivial));
    }

    #[test]
    fn test_second_failure_propagates() {
        let src = Pix::new_filled(40, 40, PixelDepth::Bit8, 200).unwrap();
        let xf = xform(40, 40);
        let point = Curve::from_polyline(vec![PointF::new(5.0, 5.0), PointF::new(5.0, 5.0)]);
        let degenerate = DistortionModel::new(point.clone(), point);
        let err = dewarp_with_fallback(
            &Transform::identity(),
            &src,
            &xf.transform(),
            &mut degenerate.clone(),
            &degenerate,
            DepthPerception::default(),
            Size::new(40, 40),
            scanout_core::color::WHITE,
        )
        .unwrap_err();
        assert!(matches!(err, OutputError::Recog(_)));
    }

    #[test]
    fn test_vertical_border_correction() {
        let mut model = DistortionModel::new(
            Curve::from_polyline(vec![PointF::new(10.0, 10.0), PointF::new(90.0, 10.0)]),
            Curve::from_polyline(vec![PointF::new(20.0, 90.0), PointF::new(90.0, 90.0)]),
        );
        correct_vertical_border(&mut model, &Transform::identity(), SubPage::Single).unwrap();
        // atan(10 / 80) is about 7 degrees; the bottom curve gains a
        // point under the top-left corner.
        assert_eq!(model.bottom_curve().front(), Some(PointF::new(10.0, 90.0)));
        assert_eq!(model.bottom_curve().polyline().len(), 3);

        let mut upright = DistortionModel::new(
            Curve::from_polyline(vec![PointF::new(10.0, 10.0), PointF::new(90.0, 10.0)]),
            Curve::from_polyline(vec![PointF::new(11.0, 90.0), PointF::new(90.0, 90.0)]),
        );
        let before = upright.clone();
        correct_vertical_border(&mut upright, &Transform::identity(), SubPage::Single).unwrap();
        assert!(upright.matches(&before));
    }

    #[test]
    fn test_margin_snapping() {
        // Black frame of 10 rows at the top and bottom.
        let mut pm = Pix::new(50, 100, PixelDepth::Bit1).unwrap().into_mut();
        pm.fill_rect(Rect::new(0, 0, 50, 10), 1);
        pm.fill_rect(Rect::new(0, 90, 50, 10), 1);
        let bw: Pix = pm.into();
        assert_eq!(move_to_top_margin(&bw, PointF::new(25.0, 40.0)), PointF::new(25.0, 10.0));
        assert_eq!(move_to_bottom_margin(&bw, PointF::new(25.0, 60.0)), PointF::new(25.0, 89.0));
        // Nothing to find above the point.
        assert_eq!(move_to_top_margin(&bw, PointF::new(25.0, 5.0)), PointF::new(25.0, 5.0));
    }

    #[test]
    fn test_marginal_model_is_valid() {
        let mut pm = Pix::new_filled(200, 150, PixelDepth::Bit8, 240).unwrap().into_mut();
        pm.fill_rect(Rect::new(0, 0, 200, 8), 10);
        pm.fill_rect(Rect::new(0, 142, 200, 8), 10);
        let gray: Pix = pm.into();
        let xf = xform(200, 150);
        let trivial = trivial_distortion_model(Rect::new(20, 30, 160, 90), &xf);
        let model = build_marginal_model(&gray, &xf, &trivial, SubPage::Single).unwrap();
        assert!(model.is_valid());
    }

    #[test]
    fn test_auto_model_uses_tracer() {
        let page = scanout_test::synth::gray_text_page(200, 160, 12, 3);
        let trivial = trivial_distortion_model(Rect::new(0, 0, 200, 160), &xform(200, 160));
        let model = trace_auto_model(
            &ContentBoundaryTracer::new(),
            &page,
            Rect::new(10, 10, 180, 140),
            &Transform::translation(5.0, 5.0),
            &trivial,
        );
        assert!(model.is_valid());
        // Empty content box gives the trivial model back.
        let model = trace_auto_model(
            &ContentBoundaryTracer::new(),
            &page,
            Rect::new(0, 0, 0, 0),
            &Transform::identity(),
            &trivial,
        );
        assert!(model.matches(&trivial));
    }

    #[test]
    fn test_deskew_is_skipped_outside_marginal_and_manual() {
        let mut img = Pix::new_filled(40, 40, PixelDepth::Bit8, 255).unwrap();
        let opts = DewarpingOptions::new(DewarpingMode::Auto);
        assert_eq!(maybe_deskew(&mut img, &opts, scanout_core::color::WHITE).unwrap(), 0.0);
        assert!(post_deskew_transform(Size::new(40, 40), 0.0).is_identity());
    }
}
