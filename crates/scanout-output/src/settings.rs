//! Per-page settings store
//!
//! The generator reads and writes back zones, the memoized processing
//! flags and the distortion model through the [`Settings`] trait.
//! [`InMemorySettings`] is a thread-safe map-backed store.

use crate::params::OutputProcessingParams;
use crate::zone::ZoneSet;
use scanout_recog::DistortionModel;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};

/// Which part of a scanned image a page is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubPage {
    #[default]
    Single,
    Left,
    Right,
}

impl SubPage {
    pub fn as_str(self) -> &'static str {
        match self {
            SubPage::Single => "single",
            SubPage::Left => "left",
            SubPage::Right => "right",
        }
    }
}

/// Identifies a page: an image plus the sub-page within it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageId {
    pub image: String,
    pub sub_page: SubPage,
}

impl PageId {
    pub fn new(image: impl Into<String>, sub_page: SubPage) -> Self {
        PageId {
            image: image.into(),
            sub_page,
        }
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.image, self.sub_page.as_str())
    }
}

/// Storage of per-page output state.
pub trait Settings: Send + Sync {
    fn picture_zones(&self, page: &PageId) -> ZoneSet;
    fn set_picture_zones(&self, page: &PageId, zones: &ZoneSet);
    fn fill_zones(&self, page: &PageId) -> ZoneSet;
    fn set_fill_zones(&self, page: &PageId, zones: &ZoneSet);
    fn output_processing_params(&self, page: &PageId) -> OutputProcessingParams;
    fn set_output_processing_params(&self, page: &PageId, params: OutputProcessingParams);
    fn distortion_model(&self, page: &PageId) -> Option<DistortionModel>;
    fn set_distortion_model(&self, page: &PageId, model: &DistortionModel);
}

#[derive(Debug, Clone, Default)]
struct PageRecord {
    picture_zones: ZoneSet,
    fill_zones: ZoneSet,
    processing: OutputProcessingParams,
    distortion_model: Option<DistortionModel>,
}

/// [`Settings`] kept in memory.
#[derive(Debug, Default)]
pub struct InMemorySettings {
    pages: Mutex<HashMap<PageId, PageRecord>>,
}

impl InMemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T>(&self, page: &PageId, f: impl FnOnce(&PageRecord) -> T) -> Option<T> {
        let pages = self.pages.lock().unwrap_or_else(PoisonError::into_inner);
        pages.get(page).map(f)
    }

    fn write(&self, page: &PageId, f: impl FnOnce(&mut PageRecord)) {
        let mut pages = self.pages.lock().unwrap_or_else(PoisonError::into_inner);
        f(pages.entry(page.clone()).or_default());
    }
}

impl Settings for InMemorySettings {
    fn picture_zones(&self, page: &PageId) -> ZoneSet {
        self.read(page, |r| r.picture_zones.clone()).unwrap_or_default()
    }

    fn set_picture_zones(&self, page: &PageId, zones: &ZoneSet) {
        tracing::trace!(page = %page, zones = zones.len(), "storing picture zones");
        self.write(page, |r| r.picture_zones = zones.clone());
    }

    fn fill_zones(&self, page: &PageId) -> ZoneSet {
        self.read(page, |r| r.fill_zones.clone()).unwrap_or_default()
    }

    fn set_fill_zones(&self, page: &PageId, zones: &ZoneSet) {
        self.write(page, |r| r.fill_zones = zones.clone());
    }

    fn output_processing_params(&self, page: &PageId) -> OutputProcessingParams {
        self.read(page, |r| r.processing).unwrap_or_default()
    }

    fn set_output_processing_params(&self, page: &PageId, params: OutputProcessingParams) {
        tracing::trace!(page = %page, ?params, "storing processing params");
        self.write(page, |r| r.processing = params);
    }

    fn distortion_model(&self, page: &PageId) -> Option<DistortionModel> {
        self.read(page, |r| r.distortion_model.clone()).flatten()
    }

    fn set_distortion_model(&self, page: &PageId, model: &DistortionModel) {
        self.write(page, |r| r.distortion_model = Some(model.clone()));
    }
}
