//! Rendering without dewarping

use super::{FilterData, Geometry, OutputGenerator, OutputImage, bw_to_rgba, place_on_canvas};
use crate::context::PipelineContext;
use crate::error::OutputResult;
use crate::params::FillingColor;
use crate::render::RenderParams;
use crate::split::SplitImage;
use crate::stages::{
    apply_fill_zones, apply_fill_zones_to_mask, combine_mixed, fill_margins,
    maybe_despeckle_in_place, morphological_smooth_in_place, normalize_illumination_gray,
};
use crate::zone::ZoneSet;
use scanout_core::{Pix, PixelDepth, PointF, Polygon, Rect, RopOp, Transform, color};
use scanout_filter::{
    adjust_brightness_grayscale, calc_dominant_background_color,
    calc_dominant_background_color_bw, smooth_to_grayscale,
};
use scanout_transform::{OutsidePixels, transform, transform_to_gray};

impl OutputGenerator {
    /// Page in output coordinates over `small_margins_rect`, with the
    /// original colors kept when the page has any.
    fn resample(
        &self,
        input: &FilterData,
        target: Rect,
        outside: OutsidePixels,
    ) -> OutputResult<Pix> {
        let xform = self.xform.transform();
        Ok(if input.is_color() {
            transform(input.orig(), &xform, target, outside)?
        } else {
            transform_to_gray(input.gray(), &xform, target, outside)?
        })
    }

    pub(super) fn process_without_dewarping(
        &self,
        ctx: &mut PipelineContext<'_>,
        input: &FilterData,
        rp: &RenderParams,
        geometry: &Geometry,
        picture_zones: &mut ZoneSet,
        fill_zones: &ZoneSet,
    ) -> OutputResult<OutputImage> {
        let small = geometry.small_margins_rect;
        let content = geometry.content_rect;
        let xform = self.xform.transform();
        let orig_to_output = |p: PointF| xform.map_point(p);
        let identity = Transform::identity();

        let mut maybe_normalized = if rp.need_normalize_illumination() {
            let normalized = normalize_illumination_gray(
                ctx,
                input.gray(),
                &geometry.orig_crop_area,
                &xform,
                small,
                false,
            )?
            .normalized;
            if input.is_color() {
                let rgb = self.resample(input, small, OutsidePixels::white())?;
                ctx.checkpoint()?;
                let adjusted = adjust_brightness_grayscale(&rgb, &normalized)?;
                ctx.debug(&adjusted, "norm_illum_color");
                adjusted
            } else {
                normalized
            }
        } else {
            self.resample(input, small, OutsidePixels::white())?
        };
        ctx.checkpoint()?;

        let bg_color = calc_dominant_background_color(&maybe_normalized, &Polygon::default())?;
        let bg_bw = if rp.need_binarization() {
            let bw = calc_dominant_background_color_bw(&maybe_normalized, &Polygon::default())?;
            self.detect_white_on_black(ctx, bw);
            Some(bw)
        } else {
            None
        };
        tracing::debug!(bg_color, ?bg_bw, "page background");

        let mut pm = maybe_normalized.into_mut();
        fill_margins(&mut pm, &geometry.small_crop_area, bg_color);
        maybe_normalized = pm.into();
        ctx.checkpoint()?;

        let binarizer = self.binarizer(ctx);
        let filling = self.options.color_params.color_common_options.fill_margins_color;

        if rp.binary_output() {
            let fill_bw = match (filling, bg_bw) {
                (FillingColor::Background, Some(bw)) => bw_to_rgba(bw),
                _ => color::WHITE,
            };
            let smoothed = if rp.need_savitzky_golay_smoothing() {
                let s = smooth_to_grayscale(&maybe_normalized, self.dpi)?;
                ctx.debug(&s, "smoothed");
                ctx.checkpoint()?;
                s
            } else {
                maybe_normalized
            };
            let bw_content =
                binarizer.binarize_with_crop(&smoothed, &geometry.small_crop_area, None)?;
            drop(smoothed);
            let mut pm = bw_content.into_mut();
            fill_margins(&mut pm, &geometry.small_crop_area, fill_bw);
            let mut bw_content: Pix = pm.into();
            ctx.debug(&bw_content, "binarized_and_cropped");
            ctx.checkpoint()?;

            if rp.need_morphological_smoothing() {
                morphological_smooth_in_place(ctx, &mut bw_content)?;
                ctx.debug(&bw_content, "edges_smoothed");
            }

            let mut dst = place_on_canvas(
                self.target_size(),
                fill_bw,
                content,
                &bw_content,
                content.x - small.x,
                content.y - small.y,
            )?;
            drop(bw_content);
            ctx.checkpoint()?;

            maybe_despeckle_in_place(
                ctx,
                &mut dst,
                self.out_rect,
                self.out_rect,
                self.options.despeckle_level,
                self.target_size(),
                self.dpi,
            )?;
            ctx.checkpoint()?;

            let mut pm = dst.into_mut();
            apply_fill_zones(&mut pm, fill_zones, &orig_to_output, &identity);
            return Ok(OutputImage::Single(pm.into()));
        }

        let mut split = SplitImage::new();
        if rp.mixed_output() {
            let bw_mask = self.build_picture_mask(ctx, &maybe_normalized, geometry, picture_zones)?;

            if rp.split_output() {
                let mut mask = Pix::new_black(self.target_size(), PixelDepth::Bit1)?.into_mut();
                mask.rop_rect(content, &bw_mask, content.x - small.x, content.y - small.y, RopOp::Src)?;
                apply_fill_zones_to_mask(&mut mask, fill_zones, &orig_to_output, &identity);
                split.set_mask(mask.into(), rp.need_binarization());
            }

            if rp.need_binarization() {
                let smoothed = if rp.need_savitzky_golay_smoothing() {
                    let s = smooth_to_grayscale(&maybe_normalized, self.dpi)?;
                    ctx.debug(&s, "smoothed");
                    ctx.checkpoint()?;
                    s
                } else {
                    maybe_normalized.clone()
                };

                let mut pm = bw_mask.to_mut();
                fill_margins(&mut pm, &geometry.small_crop_area, color::WHITE);
                let bw_mask_filled: Pix = pm.into();

                let mut bw_content = binarizer.binarize_masked(&smoothed, &bw_mask_filled)?;
                drop(smoothed);
                ctx.debug(&bw_content, "binarized_and_masked");
                ctx.checkpoint()?;

                if rp.need_morphological_smoothing() {
                    morphological_smooth_in_place(ctx, &mut bw_content)?;
                    ctx.debug(&bw_content, "edges_smoothed");
                }

                maybe_despeckle_in_place(
                    ctx,
                    &mut bw_content,
                    small,
                    content,
                    self.options.despeckle_level,
                    self.target_size(),
                    self.dpi,
                )?;
                ctx.checkpoint()?;

                if rp.need_normalize_illumination() && !rp.normalize_illumination_color() {
                    maybe_normalized = self.resample(input, small, OutsidePixels::Color(bg_color))?;
                    ctx.checkpoint()?;
                }

                let mut pm = maybe_normalized.into_mut();
                combine_mixed(&mut pm, &bw_content, &bw_mask_filled, !rp.split_output())?;
                maybe_normalized = pm.into();
                ctx.checkpoint()?;
            }
        }

        let fill = self.fill_color(rp, bg_bw, bg_color);
        let mut pm = maybe_normalized.into_mut();
        fill_margins(&mut pm, &geometry.small_crop_area, fill);
        let maybe_normalized: Pix = pm.into();

        let dst = place_on_canvas(
            self.target_size(),
            fill,
            content,
            &maybe_normalized,
            content.x - small.x,
            content.y - small.y,
        )?;
        drop(maybe_normalized);
        ctx.checkpoint()?;

        let mut pm = dst.into_mut();
        apply_fill_zones(&mut pm, fill_zones, &orig_to_output, &identity);
        let dst: Pix = pm.into();

        if rp.split_output() {
            split.set_background(dst);
            return Ok(OutputImage::Split(split));
        }
        Ok(OutputImage::Single(dst))
    }
}
