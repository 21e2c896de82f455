//! Illumination normalization
//!
//! The page is resampled into the target rectangle, a smooth polynomial
//! surface is fitted to its background, and every pixel is lifted against
//! that surface so the paper comes out uniformly white.

use crate::context::PipelineContext;
use crate::error::OutputResult;
use scanout_core::{Pix, Polygon, Rect, Transform};
use scanout_filter::{BackgroundEstimationOptions, estimate_background, raise_above_background};
use scanout_transform::{OutsidePixels, transform_to_gray};

/// Normalized gray image, plus the rendered background when asked for.
#[derive(Debug)]
pub struct NormalizedIllumination {
    pub normalized: Pix,
    pub background: Option<Pix>,
}

/// Normalize the illumination of `input`.
///
/// `area_to_consider` (original coordinates) restricts the background
/// fit; an empty polygon means the whole image. `xform` maps original to
/// output coordinates and `target_rect` selects the output area to
/// produce.
pub fn normalize_illumination_gray(
    ctx: &mut PipelineContext<'_>,
    input: &Pix,
    area_to_consider: &Polygon,
    xform: &Transform,
    target_rect: Rect,
    want_background: bool,
) -> OutputResult<NormalizedIllumination> {
    let to_be_normalized = transform_to_gray(input, xform, target_rect, OutsidePixels::WeakNearest)?;
    ctx.debug(&to_be_normalized, "to_be_normalized");
    ctx.checkpoint()?;

    let area = xform
        .map_polygon(area_to_consider)
        .translated(-f64::from(target_rect.x), -f64::from(target_rect.y));
    let surface = {
        let ctx = &*ctx;
        estimate_background(
            &to_be_normalized,
            &area,
            || ctx.checkpoint(),
            &BackgroundEstimationOptions::default(),
        )?
    };
    ctx.checkpoint()?;

    let background = surface.render(to_be_normalized.size())?;
    ctx.debug(&background, "background");
    ctx.checkpoint()?;

    let normalized = raise_above_background(&to_be_normalized, &background)?;
    ctx.debug(&normalized, "normalized_illumination");
    tracing::debug!(
        width = normalized.width(),
        height = normalized.height(),
        "normalized illumination"
    );
    Ok(NormalizedIllumination {
        normalized,
        background: want_background.then_some(background),
    })
}
