//! Morphological edge smoothing for binarized text
//!
//! A fixed sequence of hit-miss replacement patterns removes one-pixel
//! bumps and fills one-pixel notches along glyph edges. Each pattern is
//! applied in four orientations with white surroundings. The order
//! matters: small noise patterns first, longer staircase patterns next,
//! and a 3x3 corner fill last.

use crate::{MorphError, MorphResult, Sel, hit_miss_replace_all_directions};
use scanout_core::{BwColor, Pix};

/// Smoothing patterns as `(pattern, width, height)`, in application order.
///
/// See [`crate::sel`] for the pattern alphabet.
pub const SMOOTHING_PATTERNS: [(&str, u32, u32); 6] = [
    (concat!("XXX", " - ", "   "), 3, 3),
    (concat!("X ?", "X  ", "X- ", "X- ", "X  ", "X ?"), 3, 6),
    (
        concat!("X ?", "X ?", "X  ", "X- ", "X- ", "X- ", "X  ", "X ?", "X ?"),
        3,
        9,
    ),
    (
        concat!("XX?", "XX?", "XX ", "X+ ", "X+ ", "X+ ", "XX ", "XX?", "XX?"),
        3,
        9,
    ),
    (concat!("XX?", "XX ", "X+ ", "X+ ", "XX ", "XX?"), 3, 6),
    (concat!("   ", "X+X", "XXX"), 3, 3),
];

/// Parse [`SMOOTHING_PATTERNS`] into SELs.
pub fn smoothing_sels() -> MorphResult<Vec<Sel>> {
    SMOOTHING_PATTERNS
        .iter()
        .map(|&(pattern, w, h)| Sel::from_pattern(pattern, w, h))
        .collect()
}

/// Smooth the edges of a binary image.
///
/// `checkpoint` runs before every pattern; an error from it aborts the
/// operation and is returned unchanged. This is how callers plug in
/// cooperative cancellation.
pub fn smooth_edges<E, F>(pix: &Pix, mut checkpoint: F) -> Result<Pix, E>
where
    E: From<MorphError>,
    F: FnMut() -> Result<(), E>,
{
    crate::check_binary(pix)?;
    let sels = smoothing_sels()?;
    let mut img = pix.clone();
    for sel in &sels {
        checkpoint()?;
        img = hit_miss_replace_all_directions(&img, sel, BwColor::White)?;
    }
    Ok(img)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanout_core::PixelDepth;

    fn binary(rows: &[&str]) -> Pix {
        let h = rows.len() as u32;
        let w = rows[0].len() as u32;
        let mut pm = Pix::new(w, h, PixelDepth::Bit1).unwrap().to_mut();
        for (y, r) in rows.iter().enumerate() {
            for (x, c) in r.chars().enumerate() {
                if c == 'X' {
                    pm.set_pixel(x as u32, y as u32, 1).unwrap();
                }
            }
        }
        pm.into()
    }

    #[test]
    fn test_patterns_parse() {
        let sels = smoothing_sels().unwrap();
        assert_eq!(sels.len(), 6);
        assert_eq!((sels[2].width(), sels[2].height()), (3, 9));
    }

    #[test]
    fn test_removes_bump_under_bar() {
        let pix = binary(&[
            "........", "..XXX...", "...X....", "........", "........",
        ]);
        let out = smooth_edges::<MorphError, _>(&pix, || Ok(())).unwrap();
        assert_eq!(out.get_pixel(3, 2), Some(0));
        assert_eq!(out.count_black().unwrap(), 3);
    }

    #[test]
    fn test_fills_notch_in_edge() {
        // One-pixel notch in the top edge of a solid block.
        let mut pm = Pix::new(12, 8, PixelDepth::Bit1).unwrap().to_mut();
        pm.fill_rect(scanout_core::Rect::new(2, 3, 8, 4), 1);
        pm.set_pixel(5, 3, 0).unwrap();
        let out = smooth_edges::<MorphError, _>(&pm.into(), || Ok(())).unwrap();
        assert_eq!(out.get_pixel(5, 3), Some(1));
        assert_eq!(out.count_black().unwrap(), 32);
    }

    #[test]
    fn test_solid_block_unchanged() {
        let mut pm = Pix::new(20, 20, PixelDepth::Bit1).unwrap().to_mut();
        pm.fill_rect(scanout_core::Rect::new(4, 4, 10, 10), 1);
        let pix: Pix = pm.into();
        let out = smooth_edges::<MorphError, _>(&pix, || Ok(())).unwrap();
        assert_eq!(out.count_black().unwrap(), 100);
    }

    #[test]
    fn test_checkpoint_aborts() {
        let pix = Pix::new(8, 8, PixelDepth::Bit1).unwrap();
        let mut calls = 0;
        let res = smooth_edges(&pix, || {
            calls += 1;
            if calls == 3 {
                Err(MorphError::InvalidParameters("stop".into()))
            } else {
                Ok(())
            }
        });
        assert!(res.is_err());
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_rejects_gray() {
        let pix = Pix::new(8, 8, PixelDepth::Bit8).unwrap();
        assert!(smooth_edges::<MorphError, _>(&pix, || Ok(())).is_err());
    }
}
