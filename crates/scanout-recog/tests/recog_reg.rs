//! Skew and dewarping regression test
//!
//! A synthetic text page is rotated and the skew finder must recover the
//! angle. A page with bowed text lines is traced, and dewarping with the
//! traced model must straighten the first line.
//!
//! Run with:
//! ```
//! cargo test -p scanout-recog --test recog_reg
//! ```

use scanout_color::binarize_otsu;
use scanout_core::{Pix, PixelDepth, Rect, Transform, color};
use scanout_recog::{
    ContentBoundaryTracer, CurveTracer, CylindricalSurfaceDewarper, DistortionModel,
    RasterDewarper, SkewDetectOptions, find_skew,
};
use scanout_test::RegParams;
use scanout_test::synth::gray_text_page;
use scanout_transform::{OutsidePixels, rotate_about_center};

/// Page with six text lines bowing downwards in the middle.
fn bowed_page() -> Pix {
    let mut pm = Pix::new(300, 200, PixelDepth::Bit8).unwrap().to_mut();
    pm.fill(240);
    for k in 0..6 {
        let base = 40 + k * 25;
        for x in 30..270u32 {
            let t = (f64::from(x) - 150.0) / 120.0;
            let offset = (12.0 * (1.0 - t * t)).round() as u32;
            for y in base + offset..base + offset + 4 {
                pm.set_pixel_unchecked(x, y, 20);
            }
        }
    }
    pm.into()
}

/// First dark row in column `x`.
fn first_dark_row(pix: &Pix, x: u32) -> Option<u32> {
    (0..pix.height()).find(|&y| pix.get_pixel_unchecked(x, y) < 128)
}

#[test]
fn recog_reg() {
    scanout_test::init_logging();
    let mut rp = RegParams::new("recog");

    // Skew.
    let page = gray_text_page(400, 300, 16, 3);
    let skewed = rotate_about_center(&page, -2.0, OutsidePixels::white()).unwrap();
    let opts = SkewDetectOptions::default();
    let skew = find_skew(&binarize_otsu(&skewed, 0).unwrap(), &opts).unwrap();
    rp.compare_values(2.0, skew.angle, 0.3);
    rp.check(skew.is_confident(), "skew confidence");

    let deskewed = rotate_about_center(&skewed, skew.angle, OutsidePixels::white()).unwrap();
    let residual = find_skew(&binarize_otsu(&deskewed, 0).unwrap(), &opts).unwrap();
    rp.compare_values(0.0, residual.angle, 0.3);

    // Dewarping.
    let page = bowed_page();
    let model = ContentBoundaryTracer::new()
        .trace(&page, Rect::new(30, 40, 240, 142))
        .unwrap();
    rp.check(model.is_valid(), "traced model is valid");

    let dewarper = CylindricalSurfaceDewarper::new(&model, 2.0).unwrap();
    let domain = DistortionModel::model_domain(&dewarper, &Transform::identity()).to_rect();
    let flat = RasterDewarper::dewarp(&page, page.size(), &dewarper, domain, color::WHITE).unwrap();
    rp.check(flat.size() == page.size(), "output size");

    let src_edge = first_dark_row(&page, 54).unwrap();
    let src_mid = first_dark_row(&page, 150).unwrap();
    rp.check(src_mid - src_edge > 5, "source line is bowed");

    let x_edge = (domain.x + domain.w / 10) as u32;
    let x_mid = (domain.x + domain.w / 2) as u32;
    let edge = first_dark_row(&flat, x_edge).unwrap();
    let mid = first_dark_row(&flat, x_mid).unwrap();
    rp.compare_values(f64::from(edge), f64::from(mid), 3.0);

    assert!(rp.cleanup(), "recog regression test failed");
}
