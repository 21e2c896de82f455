//! Building blocks of the output pipeline
//!
//! Each stage is a set of free functions over [`Pix`](scanout_core::Pix)
//! that the generator strings together. Stages that can take a while
//! receive the [`PipelineContext`](crate::context::PipelineContext) and
//! poll it for cancellation.

pub mod binarize;
pub mod cleanup;
pub mod compose;
pub mod dewarping;
pub mod illumination;
pub mod pictures;

pub use binarize::Binarizer;
pub use cleanup::{maybe_despeckle_in_place, morphological_smooth_in_place};
pub use compose::{
    apply_fill_zones, apply_fill_zones_to_mask, combine_mixed, fill_margins,
    fill_margins_with_mask, pixel_for_depth, reserve_black_and_white,
};
pub use illumination::{NormalizedIllumination, normalize_illumination_gray};
pub use pictures::{estimate_binarization_mask, modify_binarization_mask};
