//! scanout-io - Raster file output
//!
//! PNG is the only format: it stores every depth the pipeline produces
//! losslessly and is what debug sinks and regression tests write.

mod error;
pub mod png;

pub use error::{IoError, IoResult};
pub use self::png::{read_png, write_png};

use scanout_core::Pix;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Read a PNG file.
pub fn read_image<P: AsRef<Path>>(path: P) -> IoResult<Pix> {
    let file = File::open(path)?;
    read_png(BufReader::new(file))
}

/// Write a PNG file.
pub fn write_image<P: AsRef<Path>>(pix: &Pix, path: P) -> IoResult<()> {
    let file = File::create(path)?;
    write_png(pix, BufWriter::new(file))
}
