//! Polynomial surfaces over an image
//!
//! A surface is `sum c[j][i] * u^i * v^j` with `i <= hor_degree` and
//! `j <= vert_degree`. `u` and `v` are pixel centre coordinates mapped
//! onto `[-1, 1]`, so a surface fitted on a downscaled image renders at
//! any size.

use crate::linalg::solve;
use crate::{FilterError, FilterResult};
use scanout_core::{Pix, PixelDepth, Size};

/// Ridge term relative to the sample count; keeps sparse fits solvable.
const RIDGE: f64 = 1e-6;

/// A fitted polynomial surface.
#[derive(Debug, Clone, PartialEq)]
pub struct PolynomialSurface {
    hor_degree: u32,
    vert_degree: u32,
    /// Row `j` holds the coefficients of `v^j`.
    coeffs: Vec<f64>,
}

#[inline]
fn normalized(pos: u32, len: u32) -> f64 {
    (f64::from(pos) + 0.5) / f64::from(len) * 2.0 - 1.0
}

fn powers(t: f64, degree: u32) -> Vec<f64> {
    let mut out = Vec::with_capacity(degree as usize + 1);
    let mut p = 1.0;
    for _ in 0..=degree {
        out.push(p);
        p *= t;
    }
    out
}

impl PolynomialSurface {
    /// A constant surface.
    pub fn constant(value: f64) -> Self {
        PolynomialSurface {
            hor_degree: 0,
            vert_degree: 0,
            coeffs: vec![value],
        }
    }

    /// Least-squares fit to the pixels of `gray` under black pixels of
    /// `mask`.
    ///
    /// Degrees are lowered while the samples are fewer than the terms.
    ///
    /// # Errors
    ///
    /// `gray` must be 8 bpp and `mask` a 1 bpp image of the same size
    /// with at least one black pixel.
    pub fn fit(hor_degree: u32, vert_degree: u32, gray: &Pix, mask: &Pix) -> FilterResult<Self> {
        if gray.depth() != PixelDepth::Bit8 {
            return Err(FilterError::UnsupportedDepth {
                expected: "8 bpp",
                actual: gray.depth().bits(),
            });
        }
        if mask.depth() != PixelDepth::Bit1 || !gray.same_dimensions(mask) {
            return Err(FilterError::InvalidParameters(
                "mask must be 1 bpp and match the image size".to_string(),
            ));
        }
        let samples = mask.count_black()?;
        if samples == 0 {
            return Err(FilterError::InvalidParameters(
                "no samples to fit a surface to".to_string(),
            ));
        }

        let (mut hd, mut vd) = (hor_degree, vert_degree);
        while u64::from((hd + 1) * (vd + 1)) > samples && hd + vd > 0 {
            if hd >= vd {
                hd -= 1;
            } else {
                vd -= 1;
            }
        }

        let n = ((hd + 1) * (vd + 1)) as usize;
        let (w, h) = (gray.width(), gray.height());
        let u_pows: Vec<Vec<f64>> = (0..w).map(|x| powers(normalized(x, w), hd)).collect();
        let mut ata = vec![0.0; n * n];
        let mut atb = vec![0.0; n];
        let mut terms = vec![0.0; n];
        for y in 0..h {
            let v_pow = powers(normalized(y, h), vd);
            for x in 0..w {
                if mask.get_pixel_unchecked(x, y) == 0 {
                    continue;
                }
                let u_pow = &u_pows[x as usize];
                for (j, &vp) in v_pow.iter().enumerate() {
                    for (i, &up) in u_pow.iter().enumerate() {
                        terms[j * (hd as usize + 1) + i] = up * vp;
                    }
                }
                let value = f64::from(gray.get_pixel_unchecked(x, y));
                for r in 0..n {
                    let tr = terms[r];
                    atb[r] += tr * value;
                    // Upper triangle only; mirrored below.
                    for c in r..n {
                        ata[r * n + c] += tr * terms[c];
                    }
                }
            }
        }
        let ridge = RIDGE * samples as f64;
        for r in 0..n {
            for c in 0..r {
                ata[r * n + c] = ata[c * n + r];
            }
            ata[r * n + r] += ridge;
        }
        let coeffs = solve(ata, atb, n).ok_or(FilterError::SingularSystem("surface fit"))?;
        Ok(PolynomialSurface {
            hor_degree: hd,
            vert_degree: vd,
            coeffs,
        })
    }

    pub fn hor_degree(&self) -> u32 {
        self.hor_degree
    }

    pub fn vert_degree(&self) -> u32 {
        self.vert_degree
    }

    /// Evaluate at normalized coordinates.
    pub fn value_at(&self, u: f64, v: f64) -> f64 {
        let u_pow = powers(u, self.hor_degree);
        let v_pow = powers(v, self.vert_degree);
        self.eval(&u_pow, &v_pow)
    }

    fn eval(&self, u_pow: &[f64], v_pow: &[f64]) -> f64 {
        let stride = self.hor_degree as usize + 1;
        v_pow
            .iter()
            .enumerate()
            .map(|(j, vp)| {
                let row = &self.coeffs[j * stride..(j + 1) * stride];
                vp * row.iter().zip(u_pow).map(|(c, up)| c * up).sum::<f64>()
            })
            .sum()
    }

    /// Render as an 8 bpp image of `size`, values clamped to `0..=255`.
    pub fn render(&self, size: Size) -> FilterResult<Pix> {
        let mut out = Pix::new(size.width, size.height, PixelDepth::Bit8)?.into_mut();
        let u_pows: Vec<Vec<f64>> = (0..size.width)
            .map(|x| powers(normalized(x, size.width), self.hor_degree))
            .collect();
        for y in 0..size.height {
            let v_pow = powers(normalized(y, size.height), self.vert_degree);
            for (x, u_pow) in u_pows.iter().enumerate() {
                let v = self.eval(u_pow, &v_pow).round().clamp(0.0, 255.0);
                out.set_pixel_unchecked(x as u32, y, v as u32);
            }
        }
        Ok(out.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_mask(w: u32, h: u32) -> Pix {
        Pix::new_filled(w, h, PixelDepth::Bit1, 1).unwrap()
    }

    #[test]
    fn test_fit_linear_ramp() {
        let mut pm = Pix::new(50, 20, PixelDepth::Bit8).unwrap().into_mut();
        for y in 0..20 {
            for x in 0..50 {
                pm.set_pixel_unchecked(x, y, 100 + 2 * x);
            }
        }
        let ramp: Pix = pm.into();
        let surface = PolynomialSurface::fit(3, 3, &ramp, &full_mask(50, 20)).unwrap();
        let rendered = surface.render(ramp.size()).unwrap();
        for x in [0, 17, 49] {
            let diff = rendered.get_pixel(x, 7).unwrap() as i32 - ramp.get_pixel(x, 7).unwrap() as i32;
            assert!(diff.abs() <= 1, "x = {x}, diff = {diff}");
        }
        // Renders at another size too.
        let big = surface.render(Size::new(100, 40)).unwrap();
        assert!((big.get_pixel(99, 0).unwrap() as i32 - 198).abs() <= 1);
    }

    #[test]
    fn test_fit_ignores_unmasked() {
        let mut pm = Pix::new_filled(20, 20, PixelDepth::Bit8, 180).unwrap().into_mut();
        pm.fill_rect(scanout_core::Rect::new(5, 5, 5, 5), 10);
        let mut mask = full_mask(20, 20).into_mut();
        mask.fill_rect(scanout_core::Rect::new(5, 5, 5, 5), 0);
        let surface = PolynomialSurface::fit(2, 2, &pm.into(), &mask.into()).unwrap();
        assert!((surface.value_at(0.0, 0.0) - 180.0).abs() < 0.5);
    }

    #[test]
    fn test_degree_reduced_for_few_samples() {
        let gray = Pix::new_filled(10, 10, PixelDepth::Bit8, 50).unwrap();
        let mut mask = Pix::new(10, 10, PixelDepth::Bit1).unwrap().into_mut();
        mask.set_pixel(3, 3, 1).unwrap();
        let surface = PolynomialSurface::fit(5, 5, &gray, &mask.into()).unwrap();
        assert_eq!((surface.hor_degree(), surface.vert_degree()), (0, 0));
        assert!((surface.value_at(0.3, -0.2) - 50.0).abs() < 0.01);
        let empty = Pix::new(10, 10, PixelDepth::Bit1).unwrap();
        assert!(PolynomialSurface::fit(5, 5, &gray, &empty).is_err());
    }
}
