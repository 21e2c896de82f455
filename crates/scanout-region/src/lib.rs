//! scanout-region - Region processing for page cleanup
//!
//! This crate provides:
//!
//! - **Connected component analysis** - labeling black or white regions
//!   of a binary image with 4- or 8-connectivity
//! - **Seed fill** - grayscale morphological reconstruction in both
//!   polarities
//! - **Despeckling** - removal of small components far from text
//! - **Rectangularization** - turning mask blobs into rectangles
//!
//! # Examples
//!
//! ```
//! use scanout_region::{find_connected_components, ConnectivityType};
//! use scanout_core::{Pix, PixelDepth};
//!
//! let mut pm = Pix::new(100, 100, PixelDepth::Bit1).unwrap().into_mut();
//! pm.set_pixel(10, 10, 1).unwrap();
//! pm.set_pixel(11, 11, 1).unwrap();
//! pm.set_pixel(50, 50, 1).unwrap();
//! let pix: Pix = pm.into();
//!
//! let components = find_connected_components(&pix, ConnectivityType::EightWay).unwrap();
//! assert_eq!(components.len(), 2);
//! ```

pub mod conncomp;
pub mod despeckle;
mod error;
pub mod rectangularize;
pub mod seedfill;

pub use error::{RegionError, RegionResult};

pub use conncomp::{
    ComponentMap, ConnectedComponent, ConnectivityType, find_connected_components,
    label_components,
};
pub use despeckle::{DespeckleLevel, DespeckleOptions, despeckle, despeckle_with_options};
pub use rectangularize::rectangularize_areas;
pub use seedfill::{seedfill_gray, seedfill_gray_inv};
