//! Polygon rasterization
//!
//! A pixel belongs to a polygon when its centre `(x + 0.5, y + 0.5)` is
//! inside it under the chosen fill rule. Rows are processed as scanlines:
//! edge crossings are collected, sorted, and turned into spans.

use super::access::write;
use super::PixMut;
use crate::geom::Polygon;

/// Polygon fill rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillRule {
    /// Inside when the winding number is non-zero
    #[default]
    Winding,
    /// Inside when an odd number of edges is crossed
    OddEven,
}

/// Fills the inside or the outside of a polygon with a pixel value.
pub struct PolygonRasterizer;

impl PolygonRasterizer {
    /// Set every pixel inside `poly` to `val`.
    pub fn fill(pix: &mut PixMut, val: u32, poly: &Polygon, rule: FillRule) {
        Self::fill_impl(pix, val, poly, rule, false);
    }

    /// Set every pixel outside `poly` to `val`.
    ///
    /// An empty polygon has no inside, so the whole image is filled.
    pub fn fill_except(pix: &mut PixMut, val: u32, poly: &Polygon, rule: FillRule) {
        Self::fill_impl(pix, val, poly, rule, true);
    }

    fn fill_impl(pix: &mut PixMut, val: u32, poly: &Polygon, rule: FillRule, invert: bool) {
        let width = pix.width() as i64;
        let depth = pix.depth();
        let mut crossings: Vec<(f64, i32)> = Vec::new();
        let mut inside = vec![false; width as usize];

        for y in 0..pix.height() {
            let cy = f64::from(y) + 0.5;
            crossings.clear();
            if !poly.is_empty() {
                for (a, b) in poly.edges() {
                    let dir = if a.y <= cy && b.y > cy {
                        1
                    } else if b.y <= cy && a.y > cy {
                        -1
                    } else {
                        continue;
                    };
                    let t = (cy - a.y) / (b.y - a.y);
                    crossings.push((a.x + t * (b.x - a.x), dir));
                }
                crossings.sort_by(|l, r| l.0.total_cmp(&r.0));
            }

            inside.iter_mut().for_each(|v| *v = false);
            let mut winding = 0;
            for pair in crossings.windows(2) {
                let (x0, dir) = pair[0];
                let x1 = pair[1].0;
                winding += dir;
                let filled = match rule {
                    FillRule::Winding => winding != 0,
                    FillRule::OddEven => winding % 2 != 0,
                };
                if !filled {
                    continue;
                }
                // Pixels whose centre lies in [x0, x1).
                let start = (x0 - 0.5).ceil().max(0.0) as i64;
                let end = ((x1 - 0.5).ceil() as i64).min(width);
                for x in start..end {
                    inside[x as usize] = true;
                }
            }

            let line = pix.row_data_mut(y);
            for (x, &is_inside) in inside.iter().enumerate() {
                if is_inside != invert {
                    write(line, depth, x as u32, val);
                }
            }
        }
    }
}
