//! Output page generation
//!
//! [`OutputGenerator`] turns one page of the input into its final output
//! form: binary, color/grayscale or mixed, optionally dewarped and
//! optionally split into foreground and background layers.
//!
//! # Flow
//!
//! 1. Resample the page into the output coordinates, normalizing the
//!    illumination when the render parameters call for it.
//! 2. Detect the background color and, once per page, white-on-black.
//! 3. For mixed output, find picture regions and apply picture zones.
//! 4. Dewarp (when enabled), binarize, smooth and despeckle.
//! 5. Composite, paint the margins and the fill zones.
//!
//! The flat and dewarping flows live in `flat` and `warped`.

mod flat;
mod warped;

use crate::context::PipelineContext;
use crate::error::{OutputError, OutputResult};
use crate::image_params::{OutputImageParams, PartialXform};
use crate::params::{
    ColorParams, DepthPerception, DewarpingMode, DewarpingOptions, OutputProcessingParams,
    PictureShape, PictureShapeOptions, SplittingOptions,
};
use crate::render::RenderParams;
use crate::split::SplitImage;
use crate::stages::pictures::{estimate_binarization_mask, modify_binarization_mask};
use crate::stages::Binarizer;
use crate::zone::{Zone, ZoneCategory, ZoneSet};
use scanout_core::{BwColor, Dpi, Pix, PixelDepth, Polygon, Rect, RopOp, Size, color};
use scanout_recog::{ContentBoundaryTracer, CurveTracer, DistortionModel};
use scanout_region::{DespeckleLevel, rectangularize_areas};
use scanout_transform::ImageTransformation;
use serde::{Deserialize, Serialize};

/// Margin kept around the content box, in pixels at 300 dpi.
const CONTENT_MARGIN_300DPI: u32 = 20;

/// Input page as the previous pipeline stage hands it over.
#[derive(Debug, Clone)]
pub struct FilterData {
    orig: Pix,
    gray: Pix,
}

impl FilterData {
    /// Derive the grayscale version from `orig`.
    pub fn new(orig: Pix) -> OutputResult<Self> {
        let gray = orig.convert_to_gray()?;
        Ok(FilterData { orig, gray })
    }

    /// Use a precomputed grayscale version of `orig`.
    pub fn with_gray(orig: Pix, gray: Pix) -> OutputResult<Self> {
        if !orig.same_dimensions(&gray) {
            return Err(OutputError::InvalidParameters(format!(
                "gray image {:?} does not match original {:?}",
                gray.size(),
                orig.size()
            )));
        }
        let gray = gray.convert_to_gray()?;
        Ok(FilterData { orig, gray })
    }

    pub fn orig(&self) -> &Pix {
        &self.orig
    }

    /// Always 8 bpp.
    pub fn gray(&self) -> &Pix {
        &self.gray
    }

    fn is_color(&self) -> bool {
        !self.orig.is_all_gray()
    }
}

/// What [`OutputGenerator::process`] produces.
#[derive(Debug, Clone)]
pub enum OutputImage {
    Single(Pix),
    Split(SplitImage),
}

impl OutputImage {
    pub fn single(&self) -> Option<&Pix> {
        match self {
            OutputImage::Single(pix) => Some(pix),
            OutputImage::Split(_) => None,
        }
    }

    pub fn into_single(self) -> Option<Pix> {
        match self {
            OutputImage::Single(pix) => Some(pix),
            OutputImage::Split(_) => None,
        }
    }

    pub fn split(&self) -> Option<&SplitImage> {
        match self {
            OutputImage::Single(_) => None,
            OutputImage::Split(split) => Some(split),
        }
    }

    fn with_dpi(self, dpi: Dpi) -> Self {
        match self {
            OutputImage::Single(pix) => {
                let mut pm = pix.into_mut();
                pm.set_dpi(dpi);
                OutputImage::Single(pm.into())
            }
            OutputImage::Split(mut split) => {
                split.apply_dpi(dpi);
                OutputImage::Split(split)
            }
        }
    }
}

/// User options the generator renders with.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputOptions {
    pub color_params: ColorParams,
    pub splitting_options: SplittingOptions,
    pub picture_shape_options: PictureShapeOptions,
    pub dewarping_options: DewarpingOptions,
    pub despeckle_level: DespeckleLevel,
}

impl OutputOptions {
    pub fn new(color_params: ColorParams) -> Self {
        OutputOptions {
            color_params,
            ..Default::default()
        }
    }

    pub fn with_splitting_options(mut self, options: SplittingOptions) -> Self {
        self.splitting_options = options;
        self
    }

    pub fn with_picture_shape_options(mut self, options: PictureShapeOptions) -> Self {
        self.picture_shape_options = options;
        self
    }

    pub fn with_dewarping_options(mut self, options: DewarpingOptions) -> Self {
        self.dewarping_options = options;
        self
    }

    pub fn with_despeckle_level(mut self, level: DespeckleLevel) -> Self {
        self.despeckle_level = level;
        self
    }

    pub fn validate(&self) -> OutputResult<()> {
        self.color_params.validate()?;
        self.picture_shape_options.validate()
    }
}

/// Areas shared by both flows, in output coordinates.
#[derive(Debug, Clone)]
struct Geometry {
    /// Content box clipped to the pre-crop area.
    content_rect: Rect,
    /// Content box plus a small margin; the working area of most stages.
    small_margins_rect: Rect,
    /// Pre-crop area in original coordinates.
    orig_crop_area: Polygon,
    /// Pre-crop area relative to `small_margins_rect`.
    small_crop_area: Polygon,
}

/// Renders pages for one set of options and one page transform.
pub struct OutputGenerator {
    dpi: Dpi,
    options: OutputOptions,
    xform: ImageTransformation,
    out_rect: Rect,
    content_rect: Rect,
    tracer: Box<dyn CurveTracer>,
}

impl OutputGenerator {
    /// `content_poly` is the content box in original image coordinates.
    pub fn new(xform: ImageTransformation, content_poly: &Polygon, options: OutputOptions) -> Self {
        let out_rect = xform.resulting_rect().to_rect();
        let content_rect = xform
            .transform()
            .map_polygon(content_poly)
            .bounding_rect()
            .to_rect()
            .intersected(&out_rect);
        tracing::debug!(?out_rect, ?content_rect, "output generator");
        OutputGenerator {
            dpi: xform.output_dpi(),
            options,
            xform,
            out_rect,
            content_rect,
            tracer: Box::new(ContentBoundaryTracer::new()),
        }
    }

    /// Use `tracer` for automatic dewarping instead of the built-in
    /// content boundary tracer.
    pub fn with_tracer(mut self, tracer: Box<dyn CurveTracer>) -> Self {
        self.tracer = tracer;
        self
    }

    pub fn options(&self) -> &OutputOptions {
        &self.options
    }

    pub fn output_image_size(&self) -> Size {
        self.out_rect.size()
    }

    /// Content box in output coordinates.
    pub fn output_content_rect(&self) -> Rect {
        self.content_rect
    }

    /// Parameters to store next to a page rendered by this generator.
    pub fn image_params(
        &self,
        distortion_model: &DistortionModel,
        depth_perception: DepthPerception,
        processing: OutputProcessingParams,
    ) -> OutputImageParams {
        OutputImageParams {
            size: self.output_image_size(),
            content_rect: self.content_rect,
            crop_area: self.xform.resulting_pre_crop_area(),
            partial_xform: PartialXform::from_image_transformation(&self.xform),
            dpi: self.dpi,
            color_params: self.options.color_params,
            splitting_options: self.options.splitting_options,
            picture_shape_options: self.options.picture_shape_options,
            dewarping_options: self.options.dewarping_options,
            distortion_model: distortion_model.clone(),
            depth_perception,
            despeckle_level: self.options.despeckle_level,
            output_processing_params: processing,
        }
    }

    /// Render one page.
    ///
    /// `picture_zones` may gain automatically detected zones, and
    /// `distortion_model` is replaced by the model actually used when
    /// dewarping is automatic, marginal or falls back. Detected zones and
    /// automatic or marginal models are also written to the settings
    /// through `ctx`.
    pub fn process(
        &self,
        ctx: &mut PipelineContext<'_>,
        input: &FilterData,
        picture_zones: &mut ZoneSet,
        fill_zones: &ZoneSet,
        distortion_model: &mut DistortionModel,
        depth_perception: DepthPerception,
    ) -> OutputResult<OutputImage> {
        ctx.checkpoint()?;
        let stored = ctx.stored_processing_params();
        ctx.set_processing_params(stored);

        let rp = RenderParams::new(&self.options.color_params, &self.options.splitting_options);
        let dewarping = &self.options.dewarping_options;
        let dewarp = match dewarping.mode {
            DewarpingMode::Auto | DewarpingMode::Marginal => true,
            DewarpingMode::Manual => distortion_model.is_valid(),
            DewarpingMode::Off => false,
        };
        tracing::debug!(
            page = %ctx.page_id(),
            mode = self.options.color_params.color_mode.as_str(),
            dewarping = dewarping.mode.as_str(),
            dewarp,
            "generating output"
        );

        let out = match self.geometry(&rp) {
            None => self.empty_output(&rp)?,
            Some(geometry) if dewarp => self.process_with_dewarping(
                ctx,
                input,
                &rp,
                &geometry,
                picture_zones,
                fill_zones,
                distortion_model,
                depth_perception,
            )?,
            Some(geometry) => {
                self.process_without_dewarping(ctx, input, &rp, &geometry, picture_zones, fill_zones)?
            }
        };
        Ok(out.with_dpi(self.dpi))
    }

    fn target_size(&self) -> Size {
        self.out_rect.size().expanded_to_one()
    }

    /// `None` when there is no content to render.
    fn geometry(&self, rp: &RenderParams) -> Option<Geometry> {
        if self.content_rect.is_empty() {
            return None;
        }
        let pre_crop = self.xform.resulting_pre_crop_area();
        let big_margins = pre_crop.bounding_rect().to_rect();
        let content_rect = if rp.cut_margins() {
            big_margins.intersected(&self.content_rect)
        } else {
            big_margins.intersected(&self.out_rect)
        };
        let margin = (self.dpi.vertical * CONTENT_MARGIN_300DPI / 300) as i32;
        let small_margins_rect = content_rect.grown(margin).intersected(&big_margins);
        if content_rect.is_empty() || small_margins_rect.is_empty() {
            return None;
        }
        Some(Geometry {
            content_rect,
            small_margins_rect,
            orig_crop_area: self.xform.transform_back().map_polygon(&pre_crop),
            small_crop_area: pre_crop.translated(
                -f64::from(small_margins_rect.x),
                -f64::from(small_margins_rect.y),
            ),
        })
    }

    fn empty_output(&self, rp: &RenderParams) -> OutputResult<OutputImage> {
        tracing::debug!("no content, emitting a blank page");
        let size = self.target_size();
        if !(rp.binary_output() || rp.mixed_output()) {
            return Ok(OutputImage::Single(Pix::new_white(size, PixelDepth::Bit8)?));
        }
        let blank = Pix::new_white(size, PixelDepth::Bit1)?;
        if rp.split_output() {
            let background = blank.convert_to_gray()?;
            return Ok(OutputImage::Split(SplitImage::from_layers(blank, background)));
        }
        Ok(OutputImage::Single(blank))
    }

    fn binarizer(&self, ctx: &PipelineContext<'_>) -> Binarizer {
        Binarizer::new(
            self.options.color_params.black_white_options,
            ctx.processing_params().white_on_black_mode,
            self.dpi,
        )
    }

    /// Record white-on-black the first time a page is binarized.
    fn detect_white_on_black(&self, ctx: &mut PipelineContext<'_>, background: BwColor) {
        let mut params = ctx.processing_params();
        if params.white_on_black_auto_detected {
            return;
        }
        params.white_on_black_mode = background == BwColor::Black;
        params.white_on_black_auto_detected = true;
        tracing::debug!(white_on_black = params.white_on_black_mode, "detected page polarity");
        ctx.store_processing_params(params);
    }

    /// Color margins get when filled with the background.
    fn fill_color(&self, rp: &RenderParams, bg_bw: Option<BwColor>, bg_color: u32) -> u32 {
        if rp.fill_margins_white() {
            return color::WHITE;
        }
        match bg_bw {
            Some(bw) if rp.need_binarization() => bw_to_rgba(bw),
            _ => bg_color,
        }
    }

    /// Mixed mode picture mask over `small_margins_rect`: black where the
    /// page gets binarized.
    ///
    /// With rectangular picture shapes the detected areas become picture
    /// zones once per page; afterwards only the zones shape the mask.
    fn build_picture_mask(
        &self,
        ctx: &mut PipelineContext<'_>,
        gray: &Pix,
        geometry: &Geometry,
        picture_zones: &mut ZoneSet,
    ) -> OutputResult<Pix> {
        let small = geometry.small_margins_rect;
        let shape = &self.options.picture_shape_options;
        let rectangular = shape.shape == PictureShape::Rectangular;
        let mut params = ctx.processing_params();

        let mut bw_mask = Pix::new_black(small.size(), PixelDepth::Bit1)?;
        if !rectangular || !params.auto_zones_found {
            bw_mask = estimate_binarization_mask(ctx, gray, small, small, self.dpi)?;
            ctx.debug(&bw_mask, "bw_mask_estimated");

            let removed = picture_zones
                .remove_where(|z| z.properties().zone_category() == ZoneCategory::RectangularOutline);
            tracing::trace!(removed, "dropped automatic picture zones");
            ctx.store_picture_zones(picture_zones);
            params.auto_zones_found = false;
            ctx.store_processing_params(params);
        }
        if rectangular && !params.auto_zones_found {
            let (_, areas) = rectangularize_areas(&bw_mask, BwColor::White, shape.sensitivity)?;
            let to_orig = self
                .xform
                .transform()
                .translated(-f64::from(small.x), -f64::from(small.y))
                .inverted()?;
            tracing::debug!(areas = areas.len(), "rectangular picture zones");
            for area in areas {
                picture_zones.add(Zone::auto_picture(to_orig.map_rect(&area.to_rect_f())));
            }
            ctx.store_picture_zones(picture_zones);
            params.auto_zones_found = true;
            ctx.store_processing_params(params);
            // The zones now carry the pictures.
            bw_mask = Pix::new_black(small.size(), PixelDepth::Bit1)?;
        }
        ctx.debug(&bw_mask, "bw_mask");
        ctx.checkpoint()?;

        if ctx.wants_auto_picture_mask() {
            let content = geometry.content_rect;
            let mut apm = Pix::new_black(self.target_size(), PixelDepth::Bit1)?.into_mut();
            apm.rop_rect(content, &bw_mask, content.x - small.x, content.y - small.y, RopOp::Src)?;
            ctx.set_auto_picture_mask(apm.into());
        }

        let mut bw_mask = bw_mask.into_mut();
        modify_binarization_mask(&mut bw_mask, small, picture_zones, &self.xform.transform());
        let bw_mask: Pix = bw_mask.into();
        ctx.debug(&bw_mask, "bw_mask_with_zones");
        Ok(bw_mask)
    }
}

fn bw_to_rgba(bw: BwColor) -> u32 {
    match bw {
        BwColor::White => color::WHITE,
        BwColor::Black => color::BLACK,
    }
}

/// Stamp `src` onto a `size` canvas filled with `rgba`, at `dst_rect`,
/// reading from `(src_x, src_y)`.
fn place_on_canvas(
    size: Size,
    rgba: u32,
    dst_rect: Rect,
    src: &Pix,
    src_x: i32,
    src_y: i32,
) -> OutputResult<Pix> {
    let depth = src.depth();
    let fill = crate::stages::pixel_for_depth(rgba, depth);
    let mut canvas = Pix::new_filled(size.width, size.height, depth, fill)?.into_mut();
    canvas.rop_rect(dst_rect, src, src_x, src_y, RopOp::Src)?;
    Ok(canvas.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{ColorMode, DewarpingMode};
    use crate::settings::{InMemorySettings, PageId, SubPage};
    use crate::status::TaskStatus;
    use scanout_core::RectF;
    use scanout_test::synth::gray_text_page;

    fn page_xform(w: u32, h: u32) -> ImageTransformation {
        ImageTransformation::new(Size::new(w, h), Dpi::square(300))
    }

    fn full_poly(w: u32, h: u32) -> Polygon {
        Polygon::from_rect(&RectF::new(0.0, 0.0, f64::from(w), f64::from(h)))
    }

    #[test]
    fn test_output_size_for_all_modes() {
        for mode in [ColorMode::BlackAndWhite, ColorMode::ColorGrayscale, ColorMode::Mixed] {
            let r#gen = OutputGenerator::new(
                page_xform(200, 150),
                &full_poly(200, 150),
                OutputOptions::new(ColorParams::new(mode)),
            );
            assert_eq!(r#gen.output_image_size(), Size::new(200, 150), "{mode:?}");
            assert_eq!(r#gen.output_content_rect(), Rect::new(0, 0, 200, 150));
        }
    }

    #[test]
    fn test_geometry_keeps_margin_inside_page() {
        let r#gen = OutputGenerator::new(
            page_xform(200, 150),
            &Polygon::from_rect(&RectF::new(50.0, 40.0, 100.0, 60.0)),
            OutputOptions::new(ColorParams::new(ColorMode::BlackAndWhite)),
        );
        let rp = RenderParams::new(&r#gen.options.color_params, &r#gen.options.splitting_options);
        let g = r#gen.geometry(&rp).unwrap();
        assert_eq!(g.content_rect, Rect::new(50, 40, 100, 60));
        assert_eq!(g.small_margins_rect, Rect::new(30, 20, 140, 100));
    }

    #[test]
    fn test_empty_content_is_blank() {
        let status = TaskStatus::new();
        let settings = InMemorySettings::new();
        let mut ctx = PipelineContext::new(&status, PageId::new("p", SubPage::Single), &settings);
        let r#gen = OutputGenerator::new(
            page_xform(120, 100),
            &Polygon::default(),
            OutputOptions::new(ColorParams::new(ColorMode::ColorGrayscale)),
        );
        let input = FilterData::new(gray_text_page(120, 100, 10, 3)).unwrap();
        let mut model = DistortionModel::default();
        let out = r#gen
            .process(
                &mut ctx,
                &input,
                &mut ZoneSet::new(),
                &ZoneSet::new(),
                &mut model,
                DepthPerception::default(),
            )
            .unwrap()
            .into_single()
            .unwrap();
        assert_eq!(out.depth(), PixelDepth::Bit8);
        assert_eq!(out.size(), Size::new(120, 100));
        assert!((0..100).all(|y| (0..120).all(|x| out.get_pixel(x, y) == Some(255))));
        assert_eq!(out.dpi(), Dpi::square(300));
    }

    #[test]
    fn test_image_params_describe_generator() {
        let opts = OutputOptions::new(ColorParams::new(ColorMode::BlackAndWhite))
            .with_dewarping_options(DewarpingOptions::new(DewarpingMode::Manual));
        let r#gen = OutputGenerator::new(page_xform(100, 80), &full_poly(100, 80), opts);
        let params = r#gen.image_params(
            &DistortionModel::default(),
            DepthPerception::default(),
            OutputProcessingParams::default(),
        );
        assert!(params.matches(&params.clone()));
        assert_eq!(params.size, Size::new(100, 80));
    }
}
