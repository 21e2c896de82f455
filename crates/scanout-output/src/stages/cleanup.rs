//! Binary cleanup: edge smoothing and despeckling

use crate::context::PipelineContext;
use crate::error::OutputResult;
use scanout_core::{Dpi, Pix, PixelDepth, Rect, RopOp, Size};
use scanout_morph::smooth_edges;
use scanout_region::{DespeckleLevel, despeckle};

/// Smooth glyph edges of a binarized page, checking for cancellation
/// between patterns.
pub fn morphological_smooth_in_place(ctx: &PipelineContext<'_>, bin_img: &mut Pix) -> OutputResult<()> {
    *bin_img = smooth_edges(bin_img, || ctx.checkpoint())?;
    Ok(())
}

/// Remove speckles from `image` and, when requested, record them.
///
/// `image` covers `image_rect` of the output. Only the part inside
/// `mask_rect` (same coordinates) ends up in the speckles image, which
/// is always of `out_size` and holds exactly the black pixels the
/// despeckling removed.
#[allow(clippy::too_many_arguments)]
pub fn maybe_despeckle_in_place(
    ctx: &mut PipelineContext<'_>,
    image: &mut Pix,
    image_rect: Rect,
    mask_rect: Rect,
    level: DespeckleLevel,
    out_size: Size,
    dpi: Dpi,
) -> OutputResult<()> {
    let src_x = mask_rect.x - image_rect.x;
    let src_y = mask_rect.y - image_rect.y;

    let mut speckles = if ctx.wants_speckles() {
        let mut pm = Pix::new_white(out_size.expanded_to_one(), PixelDepth::Bit1)?.into_mut();
        if !mask_rect.is_empty() {
            pm.rop_rect(mask_rect, image, src_x, src_y, RopOp::Src)?;
        }
        Some(pm)
    } else {
        None
    };

    if level != DespeckleLevel::Off {
        *image = despeckle(image, dpi, level)?;
        ctx.debug(image, "despeckled");
        tracing::debug!(level = level.as_str(), "despeckled");
    }

    if let Some(mut pm) = speckles.take() {
        if !mask_rect.is_empty() {
            pm.rop_rect(mask_rect, image, src_x, src_y, RopOp::Subtract)?;
        }
        ctx.set_speckles(pm.into());
    }
    Ok(())
}
