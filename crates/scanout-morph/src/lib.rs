//! scanout-morph - Morphological operations for page cleanup
//!
//! This crate provides:
//!
//! - Structuring elements (SEL) parsed from text patterns, with
//!   orthogonal rotations
//! - Binary brick erosion and dilation with an explicit policy for
//!   pixels outside the image
//! - Grayscale min/max filters (erosion/dilation) with a border value
//! - Hit-miss matching and hit-miss replacement
//! - Edge smoothing of binarized text built from hit-miss replacement

pub mod binary;
mod error;
pub mod grayscale;
pub mod hitmiss;
pub mod sel;
pub mod smooth;
mod words;

pub use error::{MorphError, MorphResult};
pub use sel::{Sel, SelElement};

pub use binary::{dilate_brick, erode_brick};
pub use grayscale::{dilate_gray, erode_gray};
pub use hitmiss::{hit_miss_match, hit_miss_replace, hit_miss_replace_all_directions};
pub use smooth::{SMOOTHING_PATTERNS, smooth_edges};

use scanout_core::{Pix, PixelDepth};

pub(crate) fn check_binary(pix: &Pix) -> MorphResult<()> {
    if pix.depth() != PixelDepth::Bit1 {
        return Err(MorphError::UnsupportedDepth {
            expected: "1 bpp",
            actual: pix.depth().bits(),
        });
    }
    Ok(())
}

pub(crate) fn check_gray(pix: &Pix) -> MorphResult<()> {
    if pix.depth() != PixelDepth::Bit8 {
        return Err(MorphError::UnsupportedDepth {
            expected: "8 bpp",
            actual: pix.depth().bits(),
        });
    }
    Ok(())
}
