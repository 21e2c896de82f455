//! PNG I/O regression test
//!
//! Writes synthetic pages of every pipeline depth to disk and reads them
//! back: pixels, depth and resolution must survive.
//!
//! Run with:
//! ```
//! cargo test -p scanout-io --test png_reg
//! ```

use scanout_core::{Dpi, Pix, PixelDepth};
use scanout_io::{read_image, write_image};
use scanout_test::RegParams;
use scanout_test::synth::{binary_from_rows, color_page_with_picture, gray_text_page};
use std::fs;

fn with_dpi(pix: Pix, dpi: Dpi) -> Pix {
    let mut pm = pix.into_mut();
    pm.set_dpi(dpi);
    pm.into()
}

#[test]
fn png_reg() {
    scanout_test::init_logging();
    let mut rp = RegParams::new("png");
    let dir = tempfile::tempdir().unwrap();

    let binary = binary_from_rows(&["X...X.....X", ".X.X..XXX..", "..X........"]);
    let gray = with_dpi(gray_text_page(90, 70, 10, 2), Dpi::square(300));
    let (color, _) = color_page_with_picture(90, 60);
    let color = with_dpi(color, Dpi::new(600, 300));

    for (name, pix) in [("binary", &binary), ("gray", &gray), ("color", &color)] {
        let path = dir.path().join(format!("{name}.png"));
        write_image(pix, &path).unwrap();
        let back = read_image(&path).unwrap();
        rp.check(back.depth() == pix.depth(), name);
        rp.compare_pix(pix, &back);
        rp.check(back.dpi() == pix.dpi(), "resolution kept");
    }
    rp.check(
        read_image(dir.path().join("binary.png")).unwrap().depth() == PixelDepth::Bit1,
        "1 bpp stays binary",
    );

    // Not a PNG.
    let bogus = dir.path().join("bogus.png");
    fs::write(&bogus, b"definitely not a png").unwrap();
    rp.check(read_image(&bogus).is_err(), "garbage is rejected");
    rp.check(read_image(dir.path().join("missing.png")).is_err(), "missing file");

    assert!(rp.cleanup(), "png regression test failed");
}
