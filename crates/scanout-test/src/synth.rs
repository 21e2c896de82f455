//! Synthetic test images
//!
//! Deterministic page-like rasters used in place of scanned inputs.

use scanout_core::{Pix, PixelDepth, Rect, color};

/// Build a binary image from text rows: `X` or `#` is black, anything
/// else is white.
///
/// # Panics
///
/// Panics if `rows` is empty or the first row is empty.
pub fn binary_from_rows(rows: &[&str]) -> Pix {
    let h = rows.len() as u32;
    let w = rows.first().map(|r| r.len()).unwrap_or(0) as u32;
    let mut pm = Pix::new(w, h, PixelDepth::Bit1).unwrap().into_mut();
    for (y, row) in rows.iter().enumerate() {
        for (x, c) in row.chars().enumerate() {
            if c == 'X' || c == '#' {
                pm.set_pixel(x as u32, y as u32, 1).unwrap();
            }
        }
    }
    pm.into()
}

/// Render a binary image back into text rows (`X` black, `.` white).
pub fn binary_to_rows(pix: &Pix) -> Vec<String> {
    (0..pix.height())
        .map(|y| {
            (0..pix.width())
                .map(|x| if pix.get_pixel(x, y) == Some(1) { 'X' } else { '.' })
                .collect()
        })
        .collect()
}

/// Uniform gray image.
pub fn gray_page(w: u32, h: u32, level: u8) -> Pix {
    Pix::new_filled(w, h, PixelDepth::Bit8, u32::from(level)).unwrap()
}

/// White gray page with dark horizontal bars imitating text lines.
///
/// Bars are `thickness` rows tall, start every `spacing` rows and span
/// the middle 80% of the width, leaving a 10% margin on each side. The
/// top and bottom 10% are left blank.
pub fn gray_text_page(w: u32, h: u32, spacing: u32, thickness: u32) -> Pix {
    let mut pm = gray_page(w, h, 240).into_mut();
    let x0 = (w / 10) as i32;
    let bar_w = (w * 8 / 10) as i32;
    let mut y = h / 10;
    while y + thickness < h - h / 10 {
        pm.fill_rect(Rect::new(x0, y as i32, bar_w, thickness as i32), 20);
        y += spacing;
    }
    pm.into()
}

/// Gray text page lit unevenly: brightness falls from `bright` on the
/// left to `dark` on the right, text bars keep a fixed contrast of 60%.
pub fn gray_uneven_page(w: u32, h: u32, bright: u8, dark: u8) -> Pix {
    let text = gray_text_page(w, h, 12, 3);
    let mut pm = text.to_mut();
    for y in 0..h {
        for x in 0..w {
            let t = f64::from(x) / f64::from(w.max(2) - 1);
            let light = f64::from(bright) + (f64::from(dark) - f64::from(bright)) * t;
            let v = text.get_pixel_unchecked(x, y);
            let out = if v < 128 { light * 0.4 } else { light };
            pm.set_pixel_unchecked(x, y, out.round() as u32);
        }
    }
    pm.into()
}

/// Color page: text bars on white plus a busy, saturated picture block.
///
/// Returns the page and the picture rectangle.
pub fn color_page_with_picture(w: u32, h: u32) -> (Pix, Rect) {
    let gray = gray_text_page(w, h, 12, 3);
    let mut pm = gray.convert_to_rgb().unwrap().into_mut();
    let pic = Rect::new((w / 2) as i32, (h / 3) as i32, (w / 3) as i32, (h / 3) as i32);
    for y in pic.top()..pic.bottom() {
        for x in pic.left()..pic.right() {
            let r = ((x * 37 + y * 91) % 7 * 30 + 30) as u8;
            let g = ((x * 53 + y * 29) % 5 * 40 + 40) as u8;
            pm.set_pixel_unchecked(x as u32, y as u32, color::compose_rgb(r, g, 90));
        }
    }
    (pm.into(), pic)
}
