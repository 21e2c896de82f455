//! Output generation regression test
//!
//! Renders synthetic pages through every color mode, with and without
//! dewarping, and checks the shape of the results: output sizes, margins,
//! picture zone handling, layer splitting, speckle bookkeeping,
//! distortion model bookkeeping and cancellation.
//!
//! Run with:
//! ```
//! cargo test -p scanout-output --test output_reg
//! ```

use scanout_core::{Dpi, Pix, PixelDepth, PointF, Polygon, Rect, RectF, Size, color};
use scanout_output::stages::dewarping::trivial_distortion_model;
use scanout_output::{
    BlackWhiteOptions, ColorCommonOptions, ColorMode, ColorParams, DepthPerception, DewarpingMode, DewarpingOptions,
    FilterData, ForegroundType, InMemorySettings, OutputError, OutputGenerator, OutputImage,
    OutputOptions, PageId, PictureLayer, PictureShape, PictureShapeOptions, PipelineContext,
    PropertySet, Settings, SplittingOptions, SubPage, TaskStatus, Zone, ZoneCategory,
    ZoneProperty, ZoneSet,
};
use scanout_recog::{Curve, CurveTracer, DistortionModel, RecogResult};
use scanout_region::DespeckleLevel;
use scanout_test::RegParams;
use scanout_test::synth::{color_page_with_picture, gray_text_page};
use scanout_transform::ImageTransformation;

fn rect_poly(x: f64, y: f64, w: f64, h: f64) -> Polygon {
    Polygon::from_rect(&RectF::new(x, y, w, h))
}

fn page_id() -> PageId {
    PageId::new("page-001.png", SubPage::Single)
}

/// B/W options without illumination normalization or smoothing, so
/// thresholds depend on the page alone.
fn plain_bw() -> BlackWhiteOptions {
    BlackWhiteOptions::default()
        .with_normalize_illumination(false)
        .with_savitzky_golay_smoothing(false)
}

fn generator(page: &Pix, content: &Polygon, options: OutputOptions) -> OutputGenerator {
    let xform = ImageTransformation::new(page.size(), Dpi::square(300));
    OutputGenerator::new(xform, content, options)
}

fn run(
    r#gen: &OutputGenerator,
    ctx: &mut PipelineContext<'_>,
    page: &Pix,
    picture_zones: &mut ZoneSet,
    fill_zones: &ZoneSet,
    model: &mut DistortionModel,
) -> Result<OutputImage, OutputError> {
    let input = FilterData::new(page.clone())?;
    r#gen.process(ctx, &input, picture_zones, fill_zones, model, DepthPerception::default())
}

/// Top and bottom curves that cross in the middle of a `w` x `h` page.
fn crossing_model(w: f64, h: f64) -> DistortionModel {
    DistortionModel::new(
        Curve::from_polyline(vec![PointF::new(0.0, 0.0), PointF::new(w, h)]),
        Curve::from_polyline(vec![PointF::new(0.0, h), PointF::new(w, 0.0)]),
    )
}

/// Tracer that always finds crossing curves.
struct CrossingTracer;

impl CurveTracer for CrossingTracer {
    fn trace(&self, gray: &Pix, _content_rect: Rect) -> RecogResult<DistortionModel> {
        Ok(crossing_model(f64::from(gray.width()), f64::from(gray.height())))
    }
}

fn all_pixels(pix: &Pix, rect: Rect, pred: impl Fn(u32) -> bool) -> bool {
    (rect.top()..rect.bottom()).all(|y| {
        (rect.left()..rect.right()).all(|x| pred(pix.get_pixel_unchecked(x as u32, y as u32)))
    })
}

#[test]
fn output_bw_reg() {
    scanout_test::init_logging();
    let mut rp = RegParams::new("output_bw");

    let page = gray_text_page(240, 200, 12, 3);
    let options = OutputOptions::new(ColorParams::new(ColorMode::BlackAndWhite).with_black_white_options(plain_bw()));
    let r#gen = generator(&page, &rect_poly(10.0, 10.0, 220.0, 180.0), options);
    rp.check(r#gen.output_image_size() == Size::new(240, 200), "output size");

    let status = TaskStatus::new();
    let settings = InMemorySettings::new();
    let mut ctx = PipelineContext::new(&status, page_id(), &settings);
    let out = run(&r#gen, &mut ctx, &page, &mut ZoneSet::new(), &ZoneSet::new(), &mut DistortionModel::default())
        .unwrap()
        .into_single()
        .unwrap();
    rp.check(out.depth() == PixelDepth::Bit1, "binary output");
    rp.check(out.size() == Size::new(240, 200), "sized to the out rect");
    rp.check(out.dpi() == Dpi::square(300), "dpi stamped");
    // First bar: rows 20..23, columns 24..216.
    rp.check(out.get_pixel(120, 21) == Some(1), "text stays black");
    rp.check(out.get_pixel(120, 26) == Some(0), "paper is white");
    rp.check(
        all_pixels(&out, scanout_core::Rect::new(0, 0, 240, 10), |v| v == 0),
        "top margin in the fill color",
    );

    let stored = settings.output_processing_params(&page_id());
    rp.check(stored.white_on_black_auto_detected, "polarity detected");
    rp.check(!stored.white_on_black_mode, "dark text on light paper");

    // Default options normalize the illumination and still produce text.
    let r#gen = generator(
        &page,
        &rect_poly(10.0, 10.0, 220.0, 180.0),
        OutputOptions::new(ColorParams::new(ColorMode::BlackAndWhite)),
    );
    let mut ctx = PipelineContext::new(&status, page_id(), &settings);
    let out = run(&r#gen, &mut ctx, &page, &mut ZoneSet::new(), &ZoneSet::new(), &mut DistortionModel::default())
        .unwrap()
        .into_single()
        .unwrap();
    rp.check(out.size() == Size::new(240, 200), "normalized output size");
    rp.check(out.count_black().unwrap() > 0, "normalized output has text");

    // Fill zones are painted last.
    let fill_zones: ZoneSet = [Zone::new(
        rect_poly(100.0, 15.0, 40.0, 30.0),
        PropertySet::new().with(ZoneProperty::FillColor(scanout_output::Rgb::new(255, 255, 255))),
    )]
    .into_iter()
    .collect();
    let r#gen = generator(&page, &rect_poly(10.0, 10.0, 220.0, 180.0), options);
    let mut ctx = PipelineContext::new(&status, page_id(), &settings);
    let out = run(&r#gen, &mut ctx, &page, &mut ZoneSet::new(), &fill_zones, &mut DistortionModel::default())
        .unwrap()
        .into_single()
        .unwrap();
    rp.check(out.get_pixel(120, 21) == Some(0), "fill zone whitens text");
    rp.check(out.get_pixel(60, 21) == Some(1), "text outside the zone kept");

    assert!(rp.cleanup(), "output_bw regression test failed");
}

#[test]
fn output_modes_reg() {
    scanout_test::init_logging();
    let mut rp = RegParams::new("output_modes");

    let (page, _) = color_page_with_picture(240, 180);
    let full = rect_poly(0.0, 0.0, 240.0, 180.0);
    for mode in [ColorMode::BlackAndWhite, ColorMode::ColorGrayscale, ColorMode::Mixed] {
        let r#gen = generator(&page, &full, OutputOptions::new(ColorParams::new(mode)));
        rp.check(r#gen.output_image_size() == Size::new(240, 180), mode.as_str());
    }

    // Empty content gives a blank page.
    let status = TaskStatus::new();
    let settings = InMemorySettings::new();
    for mode in [ColorMode::BlackAndWhite, ColorMode::Mixed] {
        let r#gen = generator(&page, &Polygon::default(), OutputOptions::new(ColorParams::new(mode)));
        let mut ctx = PipelineContext::new(&status, page_id(), &settings);
        let out = run(&r#gen, &mut ctx, &page, &mut ZoneSet::new(), &ZoneSet::new(), &mut DistortionModel::default())
            .unwrap()
            .into_single()
            .unwrap();
        rp.check(out.depth() == PixelDepth::Bit1, "blank page is binary");
        rp.check(out.count_black().unwrap() == 0, "blank page is white");
    }

    // Color mode keeps the picture untouched.
    let r#gen = generator(&page, &full, OutputOptions::new(ColorParams::new(ColorMode::ColorGrayscale)));
    let mut ctx = PipelineContext::new(&status, page_id(), &settings);
    let out = run(&r#gen, &mut ctx, &page, &mut ZoneSet::new(), &ZoneSet::new(), &mut DistortionModel::default())
        .unwrap()
        .into_single()
        .unwrap();
    rp.check(out.depth() == PixelDepth::Bit32, "color output stays rgb");
    rp.check(out.get_pixel(150, 80) == page.get_pixel(150, 80), "picture pixel preserved");

    // Cancellation before any work.
    let cancelled = TaskStatus::new();
    cancelled.cancel();
    let mut ctx = PipelineContext::new(&cancelled, page_id(), &settings);
    let err = run(&r#gen, &mut ctx, &page, &mut ZoneSet::new(), &ZoneSet::new(), &mut DistortionModel::default())
        .unwrap_err();
    rp.check(matches!(err, OutputError::Cancelled), "cancelled");

    assert!(rp.cleanup(), "output_modes regression test failed");
}

#[test]
fn output_mixed_reg() {
    scanout_test::init_logging();
    let mut rp = RegParams::new("output_mixed");

    let (page, pic) = color_page_with_picture(240, 180);
    let full = rect_poly(0.0, 0.0, 240.0, 180.0);
    let options = OutputOptions::new(ColorParams::new(ColorMode::Mixed).with_black_white_options(plain_bw()))
        .with_picture_shape_options(PictureShapeOptions::new(PictureShape::Rectangular));
    let r#gen = generator(&page, &full, options);
    let inside = scanout_core::Rect::new(pic.x + 4, pic.y + 4, pic.w - 8, pic.h - 8);
    let status = TaskStatus::new();

    // Pictures are detected, stored as zones and keep their colors.
    let settings = InMemorySettings::new();
    let mut zones = ZoneSet::new();
    let mut ctx = PipelineContext::new(&status, page_id(), &settings).with_auto_picture_mask();
    let out = run(&r#gen, &mut ctx, &page, &mut zones, &ZoneSet::new(), &mut DistortionModel::default())
        .unwrap()
        .into_single()
        .unwrap();
    rp.check(out.depth() == PixelDepth::Bit32, "mixed output is rgb");
    rp.check(
        zones
            .iter()
            .any(|z| z.properties().zone_category() == ZoneCategory::RectangularOutline),
        "automatic picture zone",
    );
    rp.check(settings.output_processing_params(&page_id()).auto_zones_found, "zones remembered");
    rp.check(settings.picture_zones(&page_id()).len() == zones.len(), "zones persisted");
    let c = pic.center();
    let v = out.get_pixel(c.x as u32, c.y as u32).unwrap();
    rp.check(v != color::BLACK && v != color::WHITE, "picture keeps its colors");
    // Once zones carry the pictures the detected mask is all black.
    let apm = ctx.take_auto_picture_mask().unwrap();
    rp.check(apm.size() == out.size(), "auto picture mask at output size");
    rp.check(apm.count_black().unwrap() == 240 * 180, "rectangular shapes leave no free mask");
    // First bar: rows 18..21.
    rp.check(out.get_pixel(60, 19) == Some(color::BLACK), "text binarized");

    // Free shapes keep the detected mask.
    let settings = InMemorySettings::new();
    let free = OutputOptions::new(ColorParams::new(ColorMode::Mixed).with_black_white_options(plain_bw()));
    let mut ctx = PipelineContext::new(&status, page_id(), &settings).with_auto_picture_mask();
    run(&generator(&page, &full, free), &mut ctx, &page, &mut ZoneSet::new(), &ZoneSet::new(), &mut DistortionModel::default())
        .unwrap();
    let apm = ctx.take_auto_picture_mask().unwrap();
    rp.check(apm.get_pixel(c.x as u32, c.y as u32) == Some(0), "picture area is white in the mask");
    rp.check(apm.get_pixel(60, 19) == Some(1), "text area is black in the mask");

    // An eraser over the picture forces the area back to black and white.
    let settings = InMemorySettings::new();
    let mut zones: ZoneSet = [Zone::new(
        rect_poly(f64::from(pic.x), f64::from(pic.y), f64::from(pic.w), f64::from(pic.h)),
        PropertySet::new().with(ZoneProperty::PictureLayer(PictureLayer::Eraser3)),
    )]
    .into_iter()
    .collect();
    let mut ctx = PipelineContext::new(&status, page_id(), &settings);
    let out = run(&r#gen, &mut ctx, &page, &mut zones, &ZoneSet::new(), &mut DistortionModel::default())
        .unwrap()
        .into_single()
        .unwrap();
    rp.check(
        all_pixels(&out, inside, |v| v == color::BLACK || v == color::WHITE),
        "erased picture is binarized",
    );
    rp.check(zones.len() >= 2, "eraser kept next to automatic zones");

    // Split output: foreground is binary text, background the rest.
    let settings = InMemorySettings::new();
    let split_opts = options.with_splitting_options(SplittingOptions::new(true, ForegroundType::BlackAndWhite));
    let r#gen = generator(&page, &full, split_opts);
    let mut ctx = PipelineContext::new(&status, page_id(), &settings);
    let out = run(&r#gen, &mut ctx, &page, &mut ZoneSet::new(), &ZoneSet::new(), &mut DistortionModel::default())
        .unwrap();
    let split = out.split().unwrap();
    let fg = split.foreground().unwrap().unwrap();
    let bg = split.background().unwrap().unwrap();
    rp.check(fg.depth() == PixelDepth::Bit1, "binary foreground");
    rp.check(fg.size() == Size::new(240, 180), "foreground size");
    rp.check(bg.size() == Size::new(240, 180), "background size");
    rp.check(fg.get_pixel(60, 19) == Some(1), "text on the foreground");
    rp.check(bg.get_pixel(60, 19) == Some(color::WHITE), "text removed from the background");
    rp.check(split.mask().unwrap().dpi() == Dpi::square(300), "layer dpi");

    assert!(rp.cleanup(), "output_mixed regression test failed");
}

#[test]
fn output_despeckle_reg() {
    scanout_test::init_logging();
    let mut rp = RegParams::new("output_despeckle");

    let mut pm = gray_text_page(240, 200, 12, 3).into_mut();
    for (x, y) in [(6u32, 190u32), (232, 8), (230, 192)] {
        pm.fill_rect(scanout_core::Rect::new(x as i32, y as i32, 2, 2), 10);
    }
    let page: Pix = pm.into();
    let full = rect_poly(0.0, 0.0, 240.0, 200.0);
    let status = TaskStatus::new();
    let settings = InMemorySettings::new();

    let render = |level: DespeckleLevel| {
        let options = OutputOptions::new(
            ColorParams::new(ColorMode::BlackAndWhite).with_black_white_options(plain_bw()),
        )
        .with_despeckle_level(level);
        let r#gen = generator(&page, &full, options);
        let mut ctx = PipelineContext::new(&status, page_id(), &settings).with_speckles();
        let out = run(&r#gen, &mut ctx, &page, &mut ZoneSet::new(), &ZoneSet::new(), &mut DistortionModel::default())
            .unwrap()
            .into_single()
            .unwrap();
        (out, ctx.take_speckles().unwrap())
    };

    let (kept, no_speckles) = render(DespeckleLevel::Off);
    rp.check(no_speckles.count_black().unwrap() == 0, "off removes nothing");
    let (cleaned, speckles) = render(DespeckleLevel::Aggressive);
    rp.check(speckles.size() == cleaned.size(), "speckles at output size");
    rp.compare_pix(&kept, &cleaned.or(&speckles).unwrap());
    rp.check(
        cleaned.count_black().unwrap() <= kept.count_black().unwrap(),
        "despeckling only removes",
    );

    assert!(rp.cleanup(), "output_despeckle regression test failed");
}

#[test]
fn output_dewarp_reg() {
    scanout_test::init_logging();
    let mut rp = RegParams::new("output_dewarp");

    let page = gray_text_page(240, 200, 12, 3);
    let full = rect_poly(0.0, 0.0, 240.0, 200.0);
    let status = TaskStatus::new();
    let settings = InMemorySettings::new();

    // Manual mode with crossing curves renders without dewarping.
    let crossing = crossing_model(240.0, 200.0);
    for mode in [DewarpingMode::Manual, DewarpingMode::Auto, DewarpingMode::Marginal] {
        let options = OutputOptions::new(
            ColorParams::new(ColorMode::BlackAndWhite).with_black_white_options(plain_bw()),
        )
        .with_dewarping_options(DewarpingOptions::new(mode));
        let r#gen = generator(&page, &full, options);
        let mut ctx = PipelineContext::new(&status, page_id(), &settings);
        let mut model = crossing.clone();
        let out = run(&r#gen, &mut ctx, &page, &mut ZoneSet::new(), &ZoneSet::new(), &mut model);
        let ok = matches!(&out, Ok(OutputImage::Single(p)) if p.size() == Size::new(240, 200));
        rp.check(ok, mode.as_str());
        if mode != DewarpingMode::Manual {
            rp.check(model.is_valid(), "model replaced by a usable one");
        }
    }

    // Mixed output follows the same dewarped geometry.
    let options = OutputOptions::new(ColorParams::new(ColorMode::Mixed))
        .with_dewarping_options(DewarpingOptions::new(DewarpingMode::Auto));
    let r#gen = generator(&page, &full, options);
    let mut ctx = PipelineContext::new(&status, page_id(), &settings);
    let out = run(&r#gen, &mut ctx, &page, &mut ZoneSet::new(), &ZoneSet::new(), &mut DistortionModel::default())
        .unwrap()
        .into_single()
        .unwrap();
    rp.check(out.size() == Size::new(240, 200), "mixed dewarped size");

    assert!(rp.cleanup(), "output_dewarp regression test failed");
}

#[test]
fn output_all_modes_reg() {
    scanout_test::init_logging();
    let mut rp = RegParams::new("output_all_modes");

    let (page, _) = color_page_with_picture(240, 200);
    let full = rect_poly(0.0, 0.0, 240.0, 200.0);
    let status = TaskStatus::new();

    for dewarping in [DewarpingMode::Off, DewarpingMode::Auto, DewarpingMode::Marginal] {
        for mode in [ColorMode::BlackAndWhite, ColorMode::ColorGrayscale, ColorMode::Mixed] {
            for normalize in [false, true] {
                let color_params = ColorParams::new(mode)
                    .with_black_white_options(
                        BlackWhiteOptions::default().with_normalize_illumination(normalize),
                    )
                    .with_color_common_options(
                        ColorCommonOptions::default().with_normalize_illumination(normalize),
                    );
                let options = OutputOptions::new(color_params)
                    .with_dewarping_options(DewarpingOptions::new(dewarping));
                let r#gen = generator(&page, &full, options);
                let settings = InMemorySettings::new();
                let mut ctx = PipelineContext::new(&status, page_id(), &settings);
                let what = format!("{dewarping} {mode} normalize={normalize}");

                let out = run(&r#gen, &mut ctx, &page, &mut ZoneSet::new(), &ZoneSet::new(), &mut DistortionModel::default());
                let out = match out {
                    Ok(OutputImage::Single(pix)) => pix,
                    other => {
                        rp.check(false, &format!("{what}: {other:?}"));
                        continue;
                    }
                };
                rp.check(out.size() == Size::new(240, 200), &what);
                rp.check(out.dpi() == Dpi::square(300), &what);
                let expected = if mode == ColorMode::BlackAndWhite {
                    PixelDepth::Bit1
                } else {
                    PixelDepth::Bit32
                };
                rp.check(out.depth() == expected, &what);
            }
        }
    }

    assert!(rp.cleanup(), "output_all_modes regression test failed");
}

#[test]
fn output_distortion_model_reg() {
    scanout_test::init_logging();
    let mut rp = RegParams::new("output_distortion_model");

    let page = gray_text_page(240, 200, 12, 3);
    let full = rect_poly(0.0, 0.0, 240.0, 200.0);
    let status = TaskStatus::new();
    let options = |mode| {
        OutputOptions::new(ColorParams::new(ColorMode::BlackAndWhite).with_black_white_options(plain_bw()))
            .with_dewarping_options(DewarpingOptions::new(mode).with_post_deskew(false))
    };

    // Automatic and marginal models are kept for the next run.
    for mode in [DewarpingMode::Auto, DewarpingMode::Marginal] {
        let settings = InMemorySettings::new();
        let r#gen = generator(&page, &full, options(mode));
        let mut ctx = PipelineContext::new(&status, page_id(), &settings);
        let mut model = DistortionModel::default();
        let out = run(&r#gen, &mut ctx, &page, &mut ZoneSet::new(), &ZoneSet::new(), &mut model);
        rp.check(out.is_ok(), mode.as_str());
        rp.check(model.is_valid(), "usable model");
        rp.check(settings.distortion_model(&page_id()) == Some(model), "model stored");
    }

    // A manual model belongs to the user and is not written back.
    let settings = InMemorySettings::new();
    let r#gen = generator(&page, &full, options(DewarpingMode::Manual));
    let mut ctx = PipelineContext::new(&status, page_id(), &settings);
    let mut model = trivial_distortion_model(
        Rect::new(0, 0, 240, 200),
        &ImageTransformation::new(page.size(), Dpi::square(300)),
    );
    rp.check(
        run(&r#gen, &mut ctx, &page, &mut ZoneSet::new(), &ZoneSet::new(), &mut model).is_ok(),
        "manual dewarping",
    );
    rp.check(settings.distortion_model(&page_id()).is_none(), "manual model untouched");

    // Traced curves that cross fall back to the trivial model, which
    // leaves the page geometry as the flat flow renders it.
    let flat_gen = generator(&page, &full, options(DewarpingMode::Off));
    let mut ctx = PipelineContext::new(&status, page_id(), &settings);
    let flat = run(&flat_gen, &mut ctx, &page, &mut ZoneSet::new(), &ZoneSet::new(), &mut DistortionModel::default())
        .unwrap()
        .into_single()
        .unwrap();

    let settings = InMemorySettings::new();
    let r#gen = generator(&page, &full, options(DewarpingMode::Auto)).with_tracer(Box::new(CrossingTracer));
    let mut ctx = PipelineContext::new(&status, page_id(), &settings);
    let mut model = DistortionModel::default();
    let out = run(&r#gen, &mut ctx, &page, &mut ZoneSet::new(), &ZoneSet::new(), &mut model)
        .unwrap()
        .into_single()
        .unwrap();
    let trivial = trivial_distortion_model(
        r#gen.output_content_rect(),
        &ImageTransformation::new(page.size(), Dpi::square(300)),
    );
    rp.check(model == trivial, "crossing curves replaced by the trivial model");
    rp.check(settings.distortion_model(&page_id()) == Some(trivial), "fallback model stored");
    rp.check(out.size() == flat.size(), "fallback output size");
    for (x, y) in [(120, 21), (120, 26), (60, 45), (60, 50)] {
        rp.compare_values(
            f64::from(flat.get_pixel(x, y).unwrap_or(2)),
            f64::from(out.get_pixel(x, y).unwrap_or(3)),
            0.0,
        );
    }

    assert!(rp.cleanup(), "output_distortion_model regression test failed");
}
