//! Per-call pipeline state
//!
//! One [`PipelineContext`] lives for one generation pass. It carries the
//! cancellation flag, the settings store, the optional debug sink, the
//! processing flags being decided, and the side outputs the caller asked
//! for.

use crate::debug::DebugSink;
use crate::error::OutputResult;
use crate::params::OutputProcessingParams;
use crate::settings::{PageId, Settings};
use crate::status::TaskStatus;
use crate::zone::ZoneSet;
use scanout_core::{Pix, Transform};
use scanout_recog::DistortionModel;

pub struct PipelineContext<'a> {
    status: &'a TaskStatus,
    page_id: PageId,
    settings: &'a dyn Settings,
    dbg: Option<&'a mut dyn DebugSink>,
    processing: OutputProcessingParams,
    want_auto_picture_mask: bool,
    want_speckles: bool,
    auto_picture_mask: Option<Pix>,
    speckles: Option<Pix>,
    post_transform: Transform,
}

impl<'a> PipelineContext<'a> {
    pub fn new(status: &'a TaskStatus, page_id: PageId, settings: &'a dyn Settings) -> Self {
        PipelineContext {
            status,
            page_id,
            settings,
            dbg: None,
            processing: OutputProcessingParams::default(),
            want_auto_picture_mask: false,
            want_speckles: false,
            auto_picture_mask: None,
            speckles: None,
            post_transform: Transform::identity(),
        }
    }

    pub fn with_debug_sink(mut self, sink: &'a mut dyn DebugSink) -> Self {
        self.dbg = Some(sink);
        self
    }

    /// Also produce the automatically detected picture mask.
    pub fn with_auto_picture_mask(mut self) -> Self {
        self.want_auto_picture_mask = true;
        self
    }

    /// Also produce the image of removed speckles.
    pub fn with_speckles(mut self) -> Self {
        self.want_speckles = true;
        self
    }

    pub fn page_id(&self) -> &PageId {
        &self.page_id
    }

    pub fn status(&self) -> &TaskStatus {
        self.status
    }

    pub fn checkpoint(&self) -> OutputResult<()> {
        self.status.throw_if_cancelled()
    }

    pub fn debug(&mut self, pix: &Pix, label: &str) {
        if let Some(dbg) = self.dbg.as_deref_mut() {
            dbg.add(pix, label);
        }
    }

    pub fn processing_params(&self) -> OutputProcessingParams {
        self.processing
    }

    /// Flags persisted by an earlier run on this page.
    pub(crate) fn stored_processing_params(&self) -> OutputProcessingParams {
        self.settings.output_processing_params(&self.page_id)
    }

    pub(crate) fn set_processing_params(&mut self, params: OutputProcessingParams) {
        self.processing = params;
    }

    /// Update the memoized flags and write them back to the settings.
    pub(crate) fn store_processing_params(&mut self, params: OutputProcessingParams) {
        self.processing = params;
        self.settings.set_output_processing_params(&self.page_id, params);
    }

    pub(crate) fn store_picture_zones(&self, zones: &ZoneSet) {
        self.settings.set_picture_zones(&self.page_id, zones);
    }

    pub(crate) fn store_distortion_model(&self, model: &DistortionModel) {
        self.settings.set_distortion_model(&self.page_id, model);
    }

    pub(crate) fn wants_auto_picture_mask(&self) -> bool {
        self.want_auto_picture_mask
    }

    pub(crate) fn wants_speckles(&self) -> bool {
        self.want_speckles
    }

    pub(crate) fn set_auto_picture_mask(&mut self, mask: Pix) {
        self.auto_picture_mask = Some(mask);
    }

    pub(crate) fn set_speckles(&mut self, speckles: Pix) {
        self.speckles = Some(speckles);
    }

    pub(crate) fn set_post_transform(&mut self, xform: Transform) {
        self.post_transform = xform;
    }

    /// Picture mask at output size, when requested and produced.
    pub fn auto_picture_mask(&self) -> Option<&Pix> {
        self.auto_picture_mask.as_ref()
    }

    pub fn take_auto_picture_mask(&mut self) -> Option<Pix> {
        self.auto_picture_mask.take()
    }

    /// Removed speckles at output size, when requested and produced.
    pub fn speckles(&self) -> Option<&Pix> {
        self.speckles.as_ref()
    }

    pub fn take_speckles(&mut self) -> Option<Pix> {
        self.speckles.take()
    }

    /// Rotation applied after dewarping (post-deskew); identity otherwise.
    pub fn post_transform(&self) -> Transform {
        self.post_transform
    }
}
