//! Rendering with dewarping
//!
//! The distortion model lives in original image coordinates. Everything
//! that has to follow the page curvature (content, picture mask, content
//! area) is dewarped straight from the original into the output size,
//! then optionally deskewed.

use super::{FilterData, Geometry, OutputGenerator, OutputImage, bw_to_rgba};
use crate::context::PipelineContext;
use crate::error::{OutputError, OutputResult};
use crate::params::{DepthPerception, DewarpingMode, FillingColor};
use crate::render::RenderParams;
use crate::split::SplitImage;
use crate::stages::dewarping::{
    build_marginal_model, content_area_in_original, correct_vertical_border, deskew, dewarp,
    dewarp_with_fallback, maybe_deskew, post_deskew_transform, trace_auto_model,
    trivial_distortion_model,
};
use crate::stages::{
    apply_fill_zones, apply_fill_zones_to_mask, combine_mixed, fill_margins,
    fill_margins_with_mask, maybe_despeckle_in_place, morphological_smooth_in_place,
    normalize_illumination_gray,
};
use crate::zone::ZoneSet;
use scanout_core::{Pix, PixelDepth, PointF, Polygon, Rect, Transform, color};
use scanout_filter::{
    adjust_brightness_grayscale, calc_dominant_background_color,
    calc_dominant_background_color_bw, raise_above_background, smooth_to_grayscale,
};
use scanout_recog::{DewarpingPointMapper, DistortionModel};
use scanout_transform::{OutsidePixels, transform, transform_to_gray};

impl OutputGenerator {
    /// The original page in the colors it will be dewarped in.
    fn dewarping_source(&self, input: &FilterData) -> OutputResult<Pix> {
        Ok(if input.is_color() {
            input.orig().convert_to_rgb()?
        } else {
            input.gray().clone()
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub(super) fn process_with_dewarping(
        &self,
        ctx: &mut PipelineContext<'_>,
        input: &FilterData,
        rp: &RenderParams,
        geometry: &Geometry,
        picture_zones: &mut ZoneSet,
        fill_zones: &ZoneSet,
        distortion_model: &mut DistortionModel,
        depth_perception: DepthPerception,
    ) -> OutputResult<OutputImage> {
        let small = geometry.small_margins_rect;
        let content = geometry.content_rect;
        let xform = self.xform.transform();
        let out_size = self.target_size();
        let norm_illum_to_original =
            Transform::translation(f64::from(small.x), f64::from(small.y))
                .then(&self.xform.transform_back());

        // Illumination is normalized in output space, then taken back to
        // the original so the dewarper sees an evenly lit page.
        let (normalized_original, warped_gray) = if rp.need_normalize_illumination() {
            let result = normalize_illumination_gray(
                ctx,
                input.gray(),
                &geometry.orig_crop_area,
                &xform,
                small,
                true,
            )?;
            let background = result.background.ok_or_else(|| {
                OutputError::InvalidParameters("illumination background was not rendered".into())
            })?;
            ctx.checkpoint()?;

            let orig_background = transform_to_gray(
                &background,
                &norm_illum_to_original,
                input.gray().rect(),
                OutsidePixels::WeakColor(color::BLACK),
            )?;
            drop(background);
            ctx.debug(&orig_background, "orig_background");
            ctx.checkpoint()?;

            let normalized_gray = raise_above_background(input.gray(), &orig_background)?;
            drop(orig_background);
            ctx.debug(&normalized_gray, "norm_illum_gray");
            ctx.checkpoint()?;

            let normalized_original = if !input.is_color() || rp.binary_output() {
                normalized_gray
            } else {
                let rgb = input.orig().convert_to_rgb()?;
                let adjusted = adjust_brightness_grayscale(&rgb, &normalized_gray)?;
                ctx.debug(&adjusted, "norm_illum_color");
                adjusted
            };
            (normalized_original, result.normalized)
        } else {
            let warped_gray = transform_to_gray(
                input.gray(),
                &xform,
                small,
                OutsidePixels::WeakColor(color::WHITE),
            )?;
            (self.dewarping_source(input)?, warped_gray)
        };
        ctx.checkpoint()?;

        let binarizer = self.binarizer(ctx);
        let mut bw_mask = None;
        if rp.binary_output() {
            let threshold =
                binarizer.calc_binarization_threshold(&warped_gray, &geometry.small_crop_area, None)?;
            tracing::debug!(threshold, "binarization threshold of the warped page");
        } else if rp.mixed_output() {
            let mask = self.build_picture_mask(ctx, &warped_gray, geometry, picture_zones)?;
            let threshold = binarizer.calc_binarization_threshold(
                &warped_gray,
                &geometry.small_crop_area,
                Some(&mask),
            )?;
            tracing::debug!(threshold, "binarization threshold of the warped text");
            bw_mask = Some(mask);
        }
        ctx.checkpoint()?;

        let trivial = trivial_distortion_model(self.content_rect, &self.xform);
        match self.options.dewarping_options.mode {
            DewarpingMode::Auto => {
                *distortion_model = trace_auto_model(
                    self.tracer.as_ref(),
                    &warped_gray,
                    content.translated(-small.x, -small.y),
                    &norm_illum_to_original,
                    &trivial,
                );
                let pre_rotation = self.xform.pre_rotation().transform(input.gray().size());
                correct_vertical_border(distortion_model, &pre_rotation, ctx.page_id().sub_page)?;
            }
            DewarpingMode::Marginal => {
                *distortion_model = build_marginal_model(
                    input.gray(),
                    &self.xform,
                    &trivial,
                    ctx.page_id().sub_page,
                )?;
            }
            DewarpingMode::Manual | DewarpingMode::Off => {}
        }
        drop(warped_gray);
        ctx.checkpoint()?;

        let cropped = transform(&normalized_original, &xform, content, OutsidePixels::white())?;
        let bg_color = calc_dominant_background_color(&cropped, &Polygon::default())?;
        let bg_bw = if rp.need_binarization() {
            let bw = calc_dominant_background_color_bw(&cropped, &Polygon::default())?;
            self.detect_white_on_black(ctx, bw);
            Some(bw)
        } else {
            None
        };
        drop(cropped);
        tracing::debug!(bg_color, ?bg_bw, "page background");
        ctx.checkpoint()?;

        let identity = Transform::identity();
        let mut dewarped = dewarp_with_fallback(
            &identity,
            &normalized_original,
            &xform,
            distortion_model,
            &trivial,
            depth_perception,
            out_size,
            bg_color,
        )?;
        drop(normalized_original);
        if self.options.dewarping_options.mode != DewarpingMode::Manual {
            ctx.store_distortion_model(distortion_model);
        }
        ctx.debug(&dewarped, "dewarped");
        ctx.checkpoint()?;

        let mapper = DewarpingPointMapper::new(distortion_model, depth_perception.value(), xform)?;
        let orig_to_output = |p: PointF| mapper.map_to_dewarped_space(p);

        let deskew_angle = maybe_deskew(&mut dewarped, &self.options.dewarping_options, bg_color)?;
        let post = post_deskew_transform(out_size, deskew_angle);
        ctx.set_post_transform(post);
        ctx.checkpoint()?;

        // Black where the page content may appear.
        let area_mask = {
            let mut pm = Pix::new_black(input.gray().size(), PixelDepth::Bit1)?.into_mut();
            let area = content_area_in_original(&self.xform, content, rp.cut_margins());
            fill_margins(&mut pm, &area, color::WHITE);
            let warped: Pix = pm.into();
            let flat = dewarp(
                &identity,
                &warped,
                &xform,
                distortion_model,
                depth_perception,
                out_size,
                color::WHITE,
            )?;
            deskew(&flat, deskew_angle, OutsidePixels::WeakColor(color::WHITE))?
                .threshold_to_binary(128)?
        };
        ctx.debug(&area_mask, "content_area_mask");
        ctx.checkpoint()?;

        let mut pm = dewarped.into_mut();
        fill_margins_with_mask(&mut pm, &area_mask, bg_color)?;
        dewarped = pm.into();

        let binarizer = self.binarizer(ctx);
        let filling = self.options.color_params.color_common_options.fill_margins_color;

        if rp.binary_output() {
            let smoothed = if rp.need_savitzky_golay_smoothing() {
                let s = smooth_to_grayscale(&dewarped, self.dpi)?;
                ctx.debug(&s, "smoothed");
                ctx.checkpoint()?;
                s
            } else {
                dewarped
            };
            let mut dewarped_bw = binarizer.binarize_masked(&smoothed, &area_mask)?;
            drop(smoothed);
            if let (FillingColor::Background, Some(bw)) = (filling, bg_bw) {
                let mut pm = dewarped_bw.into_mut();
                fill_margins_with_mask(&mut pm, &area_mask, bw_to_rgba(bw))?;
                dewarped_bw = pm.into();
            }
            ctx.debug(&dewarped_bw, "dewarped_binarized");
            ctx.checkpoint()?;

            if rp.need_morphological_smoothing() {
                morphological_smooth_in_place(ctx, &mut dewarped_bw)?;
                ctx.debug(&dewarped_bw, "edges_smoothed");
            }

            maybe_despeckle_in_place(
                ctx,
                &mut dewarped_bw,
                self.out_rect,
                self.out_rect,
                self.options.despeckle_level,
                out_size,
                self.dpi,
            )?;
            ctx.checkpoint()?;

            let mut pm = dewarped_bw.into_mut();
            apply_fill_zones(&mut pm, fill_zones, &orig_to_output, &post);
            return Ok(OutputImage::Single(pm.into()));
        }

        let mut split = SplitImage::new();
        if let Some(bw_mask) = bw_mask {
            let orig_to_small = xform.translated(-f64::from(small.x), -f64::from(small.y));
            let small_to_output = Transform::translation(f64::from(small.x), f64::from(small.y));
            let flat_mask = dewarp(
                &orig_to_small,
                &bw_mask,
                &small_to_output,
                distortion_model,
                depth_perception,
                out_size,
                color::BLACK,
            )?
            .threshold_to_binary(128)?;
            drop(bw_mask);
            let dewarped_mask = deskew(&flat_mask, deskew_angle, OutsidePixels::WeakColor(color::BLACK))?
                .threshold_to_binary(128)?;
            drop(flat_mask);
            ctx.debug(&dewarped_mask, "dewarped_bw_mask");
            ctx.checkpoint()?;

            if rp.split_output() {
                let mut mask = dewarped_mask.to_mut();
                apply_fill_zones_to_mask(&mut mask, fill_zones, &orig_to_output, &post);
                split.set_mask(mask.into(), rp.need_binarization());
            }

            if rp.need_binarization() {
                let smoothed = if rp.need_savitzky_golay_smoothing() {
                    let s = smooth_to_grayscale(&dewarped, self.dpi)?;
                    ctx.debug(&s, "smoothed");
                    ctx.checkpoint()?;
                    s
                } else {
                    dewarped.clone()
                };

                let mut pm = dewarped_mask.into_mut();
                fill_margins_with_mask(&mut pm, &area_mask, color::WHITE)?;
                let mask_filled: Pix = pm.into();

                let mut dewarped_bw = binarizer.binarize_masked(&smoothed, &mask_filled)?;
                drop(smoothed);
                ctx.debug(&dewarped_bw, "dewarped_binarized_and_masked");
                ctx.checkpoint()?;

                if rp.need_morphological_smoothing() {
                    morphological_smooth_in_place(ctx, &mut dewarped_bw)?;
                    ctx.debug(&dewarped_bw, "edges_smoothed");
                }

                maybe_despeckle_in_place(
                    ctx,
                    &mut dewarped_bw,
                    Rect::from_size(out_size),
                    content,
                    self.options.despeckle_level,
                    out_size,
                    self.dpi,
                )?;
                ctx.checkpoint()?;

                if rp.need_normalize_illumination() && !rp.normalize_illumination_color() {
                    let source = self.dewarping_source(input)?;
                    let plain = dewarp_with_fallback(
                        &identity,
                        &source,
                        &xform,
                        distortion_model,
                        &trivial,
                        depth_perception,
                        out_size,
                        bg_color,
                    )?;
                    drop(source);
                    dewarped = deskew(&plain, deskew_angle, OutsidePixels::WeakColor(bg_color))?;
                    ctx.checkpoint()?;
                }

                let mut pm = dewarped.into_mut();
                combine_mixed(&mut pm, &dewarped_bw, &mask_filled, !rp.split_output())?;
                dewarped = pm.into();
                ctx.checkpoint()?;
            }
        }

        let fill = self.fill_color(rp, bg_bw, bg_color);
        let mut pm = dewarped.into_mut();
        fill_margins_with_mask(&mut pm, &area_mask, fill)?;
        apply_fill_zones(&mut pm, fill_zones, &orig_to_output, &post);
        let dst: Pix = pm.into();

        if rp.split_output() {
            split.set_background(dst);
            return Ok(OutputImage::Split(split));
        }
        Ok(OutputImage::Single(dst))
    }
}
