//! Dewarping of curled pages
//!
//! A [`DistortionModel`] holds two curves, the top and bottom of the text
//! block, in original image coordinates. [`CylindricalSurfaceDewarper`]
//! turns it into a mapping from the unit square to the image,
//! [`RasterDewarper`] renders the flattened page and
//! [`DewarpingPointMapper`] carries points between both spaces.
//! Models are found automatically with a [`CurveTracer`].

mod curve;
mod cylindrical;
mod mapper;
mod model;
mod polyline;
mod raster;
mod tracer;

pub use curve::Curve;
pub use cylindrical::{CylindricalSurfaceDewarper, MAX_DEPTH_PERCEPTION, MIN_DEPTH_PERCEPTION};
pub use mapper::DewarpingPointMapper;
pub use model::DistortionModel;
pub use raster::RasterDewarper;
pub use tracer::{ContentBoundaryTracer, CurveTracer};
