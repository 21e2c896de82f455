//! Debug image sinks
//!
//! Stages hand intermediate rasters to an optional [`DebugSink`].

use crate::error::OutputResult;
use scanout_core::Pix;
use std::path::{Path, PathBuf};

/// Receiver of labelled intermediate images.
pub trait DebugSink {
    fn add(&mut self, pix: &Pix, label: &str);
}

/// Collects debug images in memory.
#[derive(Debug, Default)]
pub struct DebugImages {
    images: Vec<(String, Pix)>,
}

impl DebugImages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.images.iter().map(|(l, _)| l.as_str())
    }

    pub fn get(&self, label: &str) -> Option<&Pix> {
        self.images.iter().find(|(l, _)| l == label).map(|(_, p)| p)
    }

    pub fn into_images(self) -> Vec<(String, Pix)> {
        self.images
    }
}

impl DebugSink for DebugImages {
    fn add(&mut self, pix: &Pix, label: &str) {
        self.images.push((label.to_string(), pix.clone()));
    }
}

/// Writes each debug image as a numbered PNG into a directory.
#[derive(Debug)]
pub struct PngDebugSink {
    dir: PathBuf,
    counter: usize,
    written: Vec<PathBuf>,
}

impl PngDebugSink {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        PngDebugSink {
            dir: dir.as_ref().to_path_buf(),
            counter: 0,
            written: Vec::new(),
        }
    }

    /// Files written so far.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn write(&mut self, pix: &Pix, label: &str) -> OutputResult<PathBuf> {
        let name: String = label
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        let path = self.dir.join(format!("{:03}_{name}.png", self.counter));
        self.counter += 1;
        scanout_io::write_image(pix, &path)?;
        Ok(path)
    }
}

impl DebugSink for PngDebugSink {
    fn add(&mut self, pix: &Pix, label: &str) {
        match self.write(pix, label) {
            Ok(path) => self.written.push(path),
            Err(e) => tracing::warn!(label, error = %e, "failed to write debug image"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanout_core::{PixelDepth, Size};

    #[test]
    fn test_debug_images_collects() {
        let mut sink = DebugImages::new();
        let pix = Pix::new_white(Size::new(4, 4), PixelDepth::Bit8).unwrap();
        sink.add(&pix, "background");
        sink.add(&pix, "normalized_illumination");
        assert_eq!(sink.len(), 2);
        assert!(sink.get("background").is_some());
        assert_eq!(sink.labels().collect::<Vec<_>>(), ["background", "normalized_illumination"]);
    }

    #[test]
    fn test_png_sink_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = PngDebugSink::new(dir.path());
        let pix = Pix::new_black(Size::new(8, 3), PixelDepth::Bit1).unwrap();
        sink.add(&pix, "bw mask");
        assert_eq!(sink.written().len(), 1);
        let back = scanout_io::read_image(&sink.written()[0]).unwrap();
        assert_eq!(back.size(), pix.size());
        assert!(sink.written()[0].ends_with("000_bw_mask.png"));
    }
}
