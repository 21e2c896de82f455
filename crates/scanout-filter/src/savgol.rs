//! Savitzky-Golay smoothing
//!
//! Every pixel is replaced by the value, at the window centre, of the
//! least-squares polynomial fitted to its window. Polynomials have terms
//! `x^i * y^j` with `i <= hor_degree` and `j <= vert_degree`. Flat areas
//! and linear ramps pass through unchanged while pixel noise and jagged
//! stroke edges are smoothed, which helps binarization of low resolution
//! scans. Image borders are extended by replication.

use crate::linalg::solve;
use crate::{FilterError, FilterResult};
use scanout_core::{Dpi, Pix, PixelDepth, Size};

/// Convolution kernel of the filter, row-major over the window.
fn savgol_kernel(window: Size, hor_degree: u32, vert_degree: u32) -> FilterResult<Vec<f64>> {
    let (kw, kh) = (window.width as i32, window.height as i32);
    let terms = ((hor_degree + 1) * (vert_degree + 1)) as usize;
    let term_values = |dx: i32, dy: i32| -> Vec<f64> {
        let mut out = Vec::with_capacity(terms);
        for j in 0..=vert_degree {
            for i in 0..=hor_degree {
                out.push(f64::from(dx).powi(i as i32) * f64::from(dy).powi(j as i32));
            }
        }
        out
    };
    let rows: Vec<Vec<f64>> = (0..kh)
        .flat_map(|y| (0..kw).map(move |x| (x - kw / 2, y - kh / 2)))
        .map(|(dx, dy)| term_values(dx, dy))
        .collect();

    let mut ata = vec![0.0; terms * terms];
    for row in &rows {
        for r in 0..terms {
            for c in 0..terms {
                ata[r * terms + c] += row[r] * row[c];
            }
        }
    }
    // The value at the centre is the constant coefficient.
    let mut e0 = vec![0.0; terms];
    e0[0] = 1.0;
    let z = solve(ata, e0, terms).ok_or(FilterError::SingularSystem("savitzky-golay kernel"))?;
    Ok(rows
        .iter()
        .map(|row| row.iter().zip(&z).map(|(a, b)| a * b).sum())
        .collect())
}

/// Savitzky-Golay filter of an 8 bpp image.
///
/// # Errors
///
/// The window sides must be odd and exceed the degree along the same
/// axis.
pub fn savgol_filter(gray: &Pix, window: Size, hor_degree: u32, vert_degree: u32) -> FilterResult<Pix> {
    if gray.depth() != PixelDepth::Bit8 {
        return Err(FilterError::UnsupportedDepth {
            expected: "8 bpp",
            actual: gray.depth().bits(),
        });
    }
    if window.width % 2 == 0 || window.height % 2 == 0 {
        return Err(FilterError::InvalidParameters(format!(
            "window sides must be odd, got {}x{}",
            window.width, window.height
        )));
    }
    if window.width <= hor_degree || window.height <= vert_degree {
        return Err(FilterError::InvalidParameters(format!(
            "window {}x{} too small for degrees {hor_degree}/{vert_degree}",
            window.width, window.height
        )));
    }
    let kernel = savgol_kernel(window, hor_degree, vert_degree)?;
    let (kw, kh) = (window.width as i64, window.height as i64);
    let (w, h) = (i64::from(gray.width()), i64::from(gray.height()));
    let mut out = gray.to_mut();
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0.0;
            let mut k = kernel.iter();
            for dy in -(kh / 2)..=kh / 2 {
                let sy = (y + dy).clamp(0, h - 1) as u32;
                for dx in -(kw / 2)..=kw / 2 {
                    let sx = (x + dx).clamp(0, w - 1) as u32;
                    let weight = k.next().copied().unwrap_or(0.0);
                    acc += weight * f64::from(gray.get_pixel_unchecked(sx, sy));
                }
            }
            out.set_pixel_unchecked(x as u32, y as u32, acc.round().clamp(0.0, 255.0) as u32);
        }
    }
    Ok(out.into())
}

/// Window side and polynomial degree for [`smooth_to_grayscale`] at the
/// smaller of the two resolutions.
pub fn smoothing_window_for(dpi: Dpi) -> (u32, u32) {
    match dpi.horizontal.min(dpi.vertical) {
        0..=200 => (5, 3),
        201..=400 => (7, 4),
        401..=800 => (11, 4),
        _ => (11, 2),
    }
}

/// Convert to grayscale and apply a resolution dependent Savitzky-Golay
/// filter.
pub fn smooth_to_grayscale(src: &Pix, dpi: Dpi) -> FilterResult<Pix> {
    let gray = src.convert_to_gray()?;
    let (side, degree) = smoothing_window_for(dpi);
    tracing::trace!(side, degree, "savitzky-golay smoothing");
    savgol_filter(&gray, Size::new(side, side), degree, degree)
}
