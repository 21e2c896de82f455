//! Replace blobs of a binary mask with their bounding rectangles
//!
//! Used to turn a free-form picture mask into rectangular picture zones.

use crate::conncomp::{ConnectivityType, label_components};
use crate::error::{RegionError, RegionResult};
use scanout_core::{BwColor, Pix, Rect};

/// Rectangularize the `content` colored areas of a binary mask.
///
/// Bounding boxes of the 8-connected `content` components are merged
/// while any two of them overlap. A merged rectangle is kept when at
/// least `100 - sensitivity` percent of it is `content`; with the
/// default sensitivity of 100 every rectangle is kept.
///
/// Returns the mask redrawn with only the kept rectangles in `content`
/// color, and the rectangles themselves.
pub fn rectangularize_areas(
    pix: &Pix,
    content: BwColor,
    sensitivity: u32,
) -> RegionResult<(Pix, Vec<Rect>)> {
    if sensitivity > 100 {
        return Err(RegionError::InvalidParameters(format!(
            "sensitivity must be in 0..=100, got {sensitivity}"
        )));
    }
    let map = label_components(pix, content, ConnectivityType::EightWay)?;
    let mut rects: Vec<(Rect, u64)> = map
        .components()
        .iter()
        .map(|c| (c.bounds, u64::from(c.pixel_count)))
        .collect();

    loop {
        let mut merged = false;
        let mut i = 0;
        while i < rects.len() {
            let mut j = i + 1;
            while j < rects.len() {
                if !rects[i].0.intersected(&rects[j].0).is_empty() {
                    let (r, n) = rects.swap_remove(j);
                    rects[i].0 = rects[i].0.united(&r);
                    rects[i].1 += n;
                    merged = true;
                } else {
                    j += 1;
                }
            }
            i += 1;
        }
        if !merged {
            break;
        }
    }

    let min_fill = u64::from(100 - sensitivity);
    let kept: Vec<Rect> = rects
        .into_iter()
        .filter(|(r, n)| n * 100 >= min_fill * (r.w as u64) * (r.h as u64))
        .map(|(r, _)| r)
        .collect();

    let mut out = pix.create_template()?.into_mut();
    out.fill(content.inverted().bit());
    for r in &kept {
        out.fill_rect(*r, content.bit());
    }
    tracing::debug!(rects = kept.len(), sensitivity, "rectangularized picture areas");
    Ok((out.into(), kept))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanout_core::PixelDepth;

    fn mask() -> Pix {
        // Black background, white picture blobs.
        let mut pm = Pix::new(60, 40, PixelDepth::Bit1).unwrap().to_mut();
        pm.fill(1);
        // An L-shaped blob.
        pm.fill_rect(Rect::new(5, 5, 20, 4), 0);
        pm.fill_rect(Rect::new(5, 5, 4, 20), 0);
        // A thin diagonal line, sparse inside its bounding box.
        for i in 0..10 {
            pm.set_pixel(40 + i, 20 + i, 0).unwrap();
        }
        pm.into()
    }

    #[test]
    fn test_rectangularize_keeps_all_at_full_sensitivity() {
        let (out, rects) = rectangularize_areas(&mask(), BwColor::White, 100).unwrap();
        assert_eq!(rects.len(), 2);
        assert!(rects.contains(&Rect::new(5, 5, 20, 20)));
        // The hollow of the L becomes white.
        assert_eq!(out.get_pixel(15, 15), Some(0));
        assert_eq!(out.get_pixel(50, 5), Some(1));
    }

    #[test]
    fn test_rectangularize_drops_sparse_areas() {
        // The L fills 144 of 400 pixels (36%), the diagonal 10 of 100.
        let (_, rects) = rectangularize_areas(&mask(), BwColor::White, 70).unwrap();
        assert_eq!(rects, vec![Rect::new(5, 5, 20, 20)]);
        let (_, rects) = rectangularize_areas(&mask(), BwColor::White, 50).unwrap();
        assert!(rects.is_empty());
    }

    #[test]
    fn test_overlapping_boxes_merge() {
        let mut pm = Pix::new(30, 30, PixelDepth::Bit1).unwrap().to_mut();
        // Two separate blobs whose boxes overlap.
        pm.fill_rect(Rect::new(2, 2, 10, 2), 1);
        pm.fill_rect(Rect::new(2, 2, 2, 10), 1);
        pm.fill_rect(Rect::new(6, 6, 10, 10), 1);
        let (_, rects) = rectangularize_areas(&pm.into(), BwColor::Black, 100).unwrap();
        assert_eq!(rects, vec![Rect::new(2, 2, 14, 14)]);
    }
}
