//! Morphology regression test
//!
//! Checks erosion/dilation duality for both depths, the border policy,
//! and that edge smoothing only touches one-pixel edge defects.
//!
//! Run with:
//! ```
//! cargo test -p scanout-morph --test morph_reg
//! ```

use scanout_core::{BwColor, Pix, PixelDepth, Rect};
use scanout_morph::{dilate_brick, dilate_gray, erode_brick, erode_gray, smooth_edges};
use scanout_test::RegParams;
use scanout_test::synth::{binary_from_rows, gray_text_page};

fn blobs() -> Pix {
    let mut pm = Pix::new(70, 45, PixelDepth::Bit1).unwrap().to_mut();
    pm.fill_rect(Rect::new(5, 5, 20, 12), 1);
    pm.fill_rect(Rect::new(30, 8, 3, 30), 1);
    pm.fill_rect(Rect::new(40, 20, 25, 25), 1);
    pm.set_pixel(2, 40, 1).unwrap();
    pm.into()
}

#[test]
fn morph_reg() {
    let mut rp = RegParams::new("morph");

    // Erosion is dual to dilation of the complement with the opposite
    // surroundings.
    let pix = blobs();
    let eroded = erode_brick(&pix, 3, 5, BwColor::White).unwrap();
    let dual = dilate_brick(&pix.invert(), 3, 5, BwColor::Black)
        .unwrap()
        .invert();
    rp.compare_pix(&eroded, &dual);

    // Blob touching the bottom edge keeps its border row only with black
    // surroundings.
    let white = erode_brick(&pix, 3, 3, BwColor::White).unwrap();
    let black = erode_brick(&pix, 3, 3, BwColor::Black).unwrap();
    rp.compare_values(0.0, f64::from(white.get_pixel(50, 44).unwrap_or(9)), 0.0);
    rp.compare_values(1.0, f64::from(black.get_pixel(50, 44).unwrap_or(9)), 0.0);

    // Closing restores rectangles away from the border.
    let closed = erode_brick(
        &dilate_brick(&pix, 5, 5, BwColor::White).unwrap(),
        5,
        5,
        BwColor::White,
    )
    .unwrap();
    let r = Rect::new(5, 5, 20, 12);
    let mut same = true;
    for y in r.top()..r.bottom() {
        for x in r.left()..r.right() {
            same &= closed.get_pixel(x as u32, y as u32) == Some(1);
        }
    }
    rp.check(same, "closing keeps the first block");

    // Gray min/max filters are dual under inversion.
    let gray = gray_text_page(90, 60, 9, 2);
    let min = erode_gray(&gray, 5, 3, 255).unwrap();
    let max_dual = dilate_gray(&gray.invert(), 5, 3, 0).unwrap().invert();
    rp.compare_pix(&min, &max_dual);

    // Min filter thickens the dark bars: the row above a bar turns dark.
    rp.compare_values(240.0, f64::from(gray.get_pixel(45, 8).unwrap()), 0.0);
    rp.compare_values(20.0, f64::from(min.get_pixel(45, 5).unwrap()), 0.0);

    // Smoothing removes a bump and fills a notch but keeps straight edges.
    let rough = binary_from_rows(&[
        "..................",
        "..................",
        "........X.........",
        "..XXXXXXXXXXXXX...",
        "..XXXXXXXXXXXXX...",
        "..XXXXXXXXXXXXX...",
        "..XXXXXXXXXXXXX...",
        "..XXXXXX.XXXXXX...",
        "..................",
    ]);
    let smooth = smooth_edges::<scanout_morph::MorphError, _>(&rough, || Ok(())).unwrap();
    rp.compare_values(0.0, f64::from(smooth.get_pixel(8, 2).unwrap()), 0.0);
    rp.compare_values(1.0, f64::from(smooth.get_pixel(8, 7).unwrap()), 0.0);
    rp.compare_values(13.0 * 5.0, smooth.count_black().unwrap() as f64, 0.0);

    assert!(rp.cleanup());
}
