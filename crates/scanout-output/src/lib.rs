//! scanout-output - Output page generation
//!
//! This crate provides:
//!
//! - **Generator**: [`OutputGenerator`] renders a page as binary,
//!   color/grayscale or mixed output, optionally dewarped and split into
//!   layers
//! - **Parameters**: color, splitting, picture shape and dewarping options,
//!   and [`OutputImageParams`] to decide whether a page needs regenerating
//! - **Zones**: user picture and fill zones
//! - **Stages**: illumination normalization, picture detection,
//!   binarization, cleanup, dewarping and compositing building blocks
//! - **Seams**: the [`Settings`] store, [`DebugSink`] and cancellation via
//!   [`TaskStatus`]
//!
//! # Quick Start
//!
//! ```no_run
//! use scanout_core::{Dpi, Pix, PixelDepth, Polygon, RectF, Size};
//! use scanout_output::{
//!     ColorMode, ColorParams, DepthPerception, FilterData, InMemorySettings, OutputGenerator,
//!     OutputOptions, PageId, PipelineContext, SubPage, TaskStatus, ZoneSet,
//! };
//! use scanout_recog::DistortionModel;
//! use scanout_transform::ImageTransformation;
//!
//! let page = Pix::new(800, 600, PixelDepth::Bit8).unwrap();
//! let xform = ImageTransformation::new(page.size(), Dpi::square(300));
//! let content = Polygon::from_rect(&RectF::new(40.0, 40.0, 720.0, 520.0));
//! let options = OutputOptions::new(ColorParams::new(ColorMode::BlackAndWhite));
//! let generator = OutputGenerator::new(xform, &content, options);
//!
//! let status = TaskStatus::new();
//! let settings = InMemorySettings::new();
//! let mut ctx = PipelineContext::new(&status, PageId::new("page.png", SubPage::Single), &settings);
//! let out = generator
//!     .process(
//!         &mut ctx,
//!         &FilterData::new(page).unwrap(),
//!         &mut ZoneSet::new(),
//!         &ZoneSet::new(),
//!         &mut DistortionModel::default(),
//!         DepthPerception::default(),
//!     )
//!     .unwrap();
//! assert_eq!(out.single().unwrap().size(), Size::new(800, 600));
//! ```

pub mod context;
pub mod debug;
mod error;
pub mod generator;
pub mod image_params;
pub mod params;
pub mod render;
pub mod settings;
pub mod split;
pub mod stages;
pub mod status;
pub mod zone;

pub use error::{OutputError, OutputResult};

pub use context::PipelineContext;
pub use debug::{DebugImages, DebugSink, PngDebugSink};
pub use generator::{FilterData, OutputGenerator, OutputImage, OutputOptions};
pub use image_params::{OutputImageParams, PartialXform};
pub use params::{
    BinarizationMethod, BlackWhiteOptions, ColorCommonOptions, ColorMode, ColorParams,
    DepthPerception, DewarpingMode, DewarpingOptions, FillingColor, ForegroundType,
    OutputProcessingParams, PictureShape, PictureShapeOptions, SplittingOptions,
};
pub use render::RenderParams;
pub use settings::{InMemorySettings, PageId, Settings, SubPage};
pub use split::SplitImage;
pub use status::TaskStatus;
pub use zone::{PictureLayer, PropertySet, Rgb, Zone, ZoneCategory, ZoneProperty, ZoneSet};
