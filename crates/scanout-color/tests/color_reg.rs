//! Binarization regression test
//!
//! A synthetic text page must binarize to exactly its text bars with
//! each of the global and local methods, and a masked histogram must
//! ignore pixels outside the mask.
//!
//! Run with:
//! ```
//! cargo test -p scanout-color --test color_reg
//! ```

use scanout_color::{
    GrayscaleHistogram, adjust_threshold, binarize_otsu, binarize_sauvola, binarize_wolf,
    calc_local_window_size, otsu_threshold, otsu_threshold_of,
};
use scanout_core::{Dpi, Pix, PixelDepth, Rect, Size};
use scanout_test::RegParams;
use scanout_test::synth::gray_text_page;

#[test]
fn color_reg() {
    scanout_test::init_logging();
    let mut rp = RegParams::new("color");

    let page = gray_text_page(200, 150, 12, 3);
    // Ten bars, three rows each, 160 pixels wide.
    let expected_black = 10.0 * 3.0 * 160.0;

    let otsu = binarize_otsu(&page, 0).unwrap();
    rp.compare_values(expected_black, otsu.count_black().unwrap() as f64, 0.0);

    let window = Size::new(31, 31);
    let sauvola = binarize_sauvola(&page, window, 0.34).unwrap();
    rp.compare_pix(&otsu, &sauvola);

    let wolf = binarize_wolf(&page, window, 1, 254, 0.3).unwrap();
    rp.compare_pix(&otsu, &wolf);

    // Otsu lands between the two levels.
    let t = otsu_threshold_of(&page).unwrap();
    rp.check(t > 20 && t <= 240, "otsu threshold between ink and paper");

    // Bias saturates at the bounds.
    rp.compare_values(30.0, f64::from(adjust_threshold(t, -255)), 0.0);
    rp.compare_values(225.0, f64::from(adjust_threshold(t, 255)), 0.0);

    // A mask covering only paper yields a single populated level.
    let mut mask = Pix::new(200, 150, PixelDepth::Bit1).unwrap().into_mut();
    mask.fill_rect(Rect::new(0, 0, 200, 10), 1);
    let hist = GrayscaleHistogram::with_mask(&page, &mask.into()).unwrap();
    rp.compare_values(2000.0, f64::from(hist.get(240)), 0.0);
    rp.compare_values(2000.0, hist.total() as f64, 0.0);
    rp.compare_values(128.0, f64::from(otsu_threshold(&hist)), 0.0);

    let win = calc_local_window_size(Dpi::square(600));
    rp.check(win.height > win.width, "window is taller than wide");

    assert!(rp.cleanup(), "color regression test failed");
}
