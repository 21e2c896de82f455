//! PIX - The raster container used by every pipeline stage
//!
//! # Pixel layout
//!
//! - Image data is stored in 32-bit words
//! - Every row starts on a 32-bit boundary
//! - Pixels are packed MSB to LSB within each word
//! - 1 bpp: 1 is black (foreground), 0 is white
//! - 8 bpp: 0 is black, 255 is white
//! - 32 bpp: `0xRRGGBBAA` (red in MSB, alpha in LSB)
//!
//! # Ownership model
//!
//! `Pix` uses `Arc` for cheap cloning (shared ownership).
//! To modify pixel data, convert to `PixMut` via [`Pix::try_into_mut`]
//! or [`Pix::to_mut`], then convert back with `Into<Pix>`.

mod access;
pub mod convert;
pub mod raster;
pub mod rop;

pub use access::*;
pub use raster::{FillRule, PolygonRasterizer};
pub use rop::RopOp;

use crate::dpi::Dpi;
use crate::error::{Error, Result};
use crate::geom::{Rect, Size};
use std::sync::Arc;

/// Pixel depth (bits per pixel)
///
/// Only the depths the output pipeline produces are representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum PixelDepth {
    /// 1-bit binary image
    Bit1 = 1,
    /// 8-bit grayscale
    Bit8 = 8,
    /// 32-bit RGB or RGBA
    Bit32 = 32,
}

impl PixelDepth {
    /// Create `PixelDepth` from a raw bit count.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDepth`] if `bits` is not 1, 8, or 32.
    pub fn from_bits(bits: u32) -> Result<Self> {
        match bits {
            1 => Ok(PixelDepth::Bit1),
            8 => Ok(PixelDepth::Bit8),
            32 => Ok(PixelDepth::Bit32),
            _ => Err(Error::InvalidDepth(bits)),
        }
    }

    /// Get the number of bits per pixel.
    pub fn bits(self) -> u32 {
        self as u32
    }

    /// Pixel value that renders as white at this depth.
    pub fn white(self) -> u32 {
        match self {
            PixelDepth::Bit1 => 0,
            PixelDepth::Bit8 => 0xff,
            PixelDepth::Bit32 => 0xffff_ffff,
        }
    }

    /// Pixel value that renders as black at this depth.
    pub fn black(self) -> u32 {
        match self {
            PixelDepth::Bit1 => 1,
            PixelDepth::Bit8 => 0,
            PixelDepth::Bit32 => 0x0000_00ff,
        }
    }
}

/// Black or white, as used for binary fill values and border policies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BwColor {
    White,
    Black,
}

impl BwColor {
    /// 1 bpp pixel value (black is 1).
    #[inline]
    pub fn bit(self) -> u32 {
        match self {
            BwColor::White => 0,
            BwColor::Black => 1,
        }
    }

    /// A full 32-pixel word of this color.
    #[inline]
    pub fn word(self) -> u32 {
        match self {
            BwColor::White => 0,
            BwColor::Black => u32::MAX,
        }
    }

    /// The opposite color.
    pub fn inverted(self) -> BwColor {
        match self {
            BwColor::White => BwColor::Black,
            BwColor::Black => BwColor::White,
        }
    }
}

/// Internal PIX data
#[derive(Debug, Clone)]
struct PixData {
    width: u32,
    height: u32,
    depth: PixelDepth,
    /// Whether the alpha byte of 32 bpp pixels carries information
    has_alpha: bool,
    /// 32-bit words per line
    wpl: u32,
    /// Horizontal resolution in dots per inch, 0 if unknown
    xres: u32,
    /// Vertical resolution in dots per inch, 0 if unknown
    yres: u32,
    data: Vec<u32>,
}

impl PixData {
    fn alloc(width: u32, height: u32, depth: PixelDepth, fill: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }
        let wpl = compute_wpl(width, depth)?;
        let len = (wpl as usize)
            .checked_mul(height as usize)
            .ok_or(Error::AllocationFailed)?;
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| Error::AllocationFailed)?;
        data.resize(len, fill);
        Ok(PixData {
            width,
            height,
            depth,
            has_alpha: false,
            wpl,
            xres: 0,
            yres: 0,
            data,
        })
    }
}

/// Words per line for the given width and depth.
fn compute_wpl(width: u32, depth: PixelDepth) -> Result<u32> {
    let bits_per_line = u64::from(width) * u64::from(depth.bits());
    u32::try_from(bits_per_line.div_ceil(32)).map_err(|_| Error::AllocationFailed)
}

/// Word pattern that fills every pixel of a row with `val`.
fn replicate(depth: PixelDepth, val: u32) -> u32 {
    match depth {
        PixelDepth::Bit1 => {
            if val & 1 != 0 {
                u32::MAX
            } else {
                0
            }
        }
        PixelDepth::Bit8 => (val & 0xff) * 0x0101_0101,
        PixelDepth::Bit32 => val,
    }
}

/// PIX - Main image container
///
/// # Examples
///
/// ```
/// use scanout_core::{Pix, PixelDepth};
///
/// let pix = Pix::new(640, 480, PixelDepth::Bit8).unwrap();
/// assert_eq!(pix.width(), 640);
/// assert_eq!(pix.height(), 480);
/// ```
#[derive(Debug, Clone)]
pub struct Pix {
    inner: Arc<PixData>,
}

impl Pix {
    /// Create a new PIX with every word zeroed.
    ///
    /// Zero is white for 1 bpp and black for 8/32 bpp.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if width or height is 0 and
    /// [`Error::AllocationFailed`] if the buffer cannot be reserved.
    pub fn new(width: u32, height: u32, depth: PixelDepth) -> Result<Self> {
        Ok(Pix {
            inner: Arc::new(PixData::alloc(width, height, depth, 0)?),
        })
    }

    /// Create a new PIX with every pixel set to `val`.
    pub fn new_filled(width: u32, height: u32, depth: PixelDepth, val: u32) -> Result<Self> {
        Ok(Pix {
            inner: Arc::new(PixData::alloc(width, height, depth, replicate(depth, val))?),
        })
    }

    /// Create an all-white image of the given size.
    pub fn new_white(size: Size, depth: PixelDepth) -> Result<Self> {
        Self::new_filled(size.width, size.height, depth, depth.white())
    }

    /// Create an all-black image of the given size.
    pub fn new_black(size: Size, depth: PixelDepth) -> Result<Self> {
        Self::new_filled(size.width, size.height, depth, depth.black())
    }

    /// Get the image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    /// Get the image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// Image dimensions.
    #[inline]
    pub fn size(&self) -> Size {
        Size::new(self.inner.width, self.inner.height)
    }

    /// Rectangle covering the whole image.
    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_size(self.size())
    }

    /// Get the pixel depth.
    #[inline]
    pub fn depth(&self) -> PixelDepth {
        self.inner.depth
    }

    /// Whether 32 bpp pixels carry a meaningful alpha channel.
    #[inline]
    pub fn has_alpha(&self) -> bool {
        self.inner.has_alpha
    }

    /// Get the words per line.
    #[inline]
    pub fn wpl(&self) -> u32 {
        self.inner.wpl
    }

    /// Horizontal resolution in dots per inch (0 if unknown).
    #[inline]
    pub fn xres(&self) -> u32 {
        self.inner.xres
    }

    /// Vertical resolution in dots per inch (0 if unknown).
    #[inline]
    pub fn yres(&self) -> u32 {
        self.inner.yres
    }

    /// Resolution as a [`Dpi`].
    pub fn dpi(&self) -> Dpi {
        Dpi::new(self.inner.xres, self.inner.yres)
    }

    /// Get raw access to the image data.
    #[inline]
    pub fn data(&self) -> &[u32] {
        &self.inner.data
    }

    /// Get the words of one row.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row_data(&self, y: u32) -> &[u32] {
        let start = (y * self.inner.wpl) as usize;
        &self.inner.data[start..start + self.inner.wpl as usize]
    }

    /// Check if two PIX have the same width, height, and depth.
    pub fn sizes_equal(&self, other: &Pix) -> bool {
        self.inner.width == other.inner.width
            && self.inner.height == other.inner.height
            && self.inner.depth == other.inner.depth
    }

    /// Check if two PIX have the same width and height, whatever their depths.
    pub fn same_dimensions(&self, other: &Pix) -> bool {
        self.inner.width == other.inner.width && self.inner.height == other.inner.height
    }

    /// Create a zeroed PIX with the same dimensions, depth and resolution.
    pub fn create_template(&self) -> Result<Self> {
        let mut data = PixData::alloc(self.inner.width, self.inner.height, self.inner.depth, 0)?;
        data.has_alpha = self.inner.has_alpha;
        data.xres = self.inner.xres;
        data.yres = self.inner.yres;
        Ok(Pix {
            inner: Arc::new(data),
        })
    }

    /// Create a deep copy of this PIX.
    pub fn deep_clone(&self) -> Self {
        Pix {
            inner: Arc::new((*self.inner).clone()),
        }
    }

    /// Try to get mutable access without copying.
    ///
    /// Succeeds only if there is exactly one reference to the data.
    pub fn try_into_mut(self) -> std::result::Result<PixMut, Self> {
        match Arc::try_unwrap(self.inner) {
            Ok(data) => Ok(PixMut { inner: data }),
            Err(arc) => Err(Pix { inner: arc }),
        }
    }

    /// Mutable access, copying only when the data is shared.
    pub fn into_mut(self) -> PixMut {
        match self.try_into_mut() {
            Ok(pm) => pm,
            Err(shared) => shared.to_mut(),
        }
    }

    /// Create a mutable copy of this PIX.
    pub fn to_mut(&self) -> PixMut {
        PixMut {
            inner: (*self.inner).clone(),
        }
    }

    /// Count black pixels of a 1 bpp image.
    pub fn count_black(&self) -> Result<u64> {
        if self.inner.depth != PixelDepth::Bit1 {
            return Err(Error::UnsupportedDepth(self.inner.depth.bits()));
        }
        let w = self.inner.width;
        let full = (w / 32) as usize;
        let rem = w % 32;
        let mut count = 0u64;
        for y in 0..self.inner.height {
            let line = self.row_data(y);
            count += line[..full].iter().map(|w| u64::from(w.count_ones())).sum::<u64>();
            if rem != 0 {
                let mask = !0u32 << (32 - rem);
                count += u64::from((line[full] & mask).count_ones());
            }
        }
        Ok(count)
    }
}

/// Mutable PIX
///
/// Allows modification of image data. Convert back to an immutable
/// [`Pix`] using `Into<Pix>`.
#[derive(Debug)]
pub struct PixMut {
    inner: PixData,
}

impl PixMut {
    /// Get the image width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    /// Get the image height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// Image dimensions.
    #[inline]
    pub fn size(&self) -> Size {
        Size::new(self.inner.width, self.inner.height)
    }

    /// Rectangle covering the whole image.
    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_size(self.size())
    }

    /// Get the pixel depth.
    #[inline]
    pub fn depth(&self) -> PixelDepth {
        self.inner.depth
    }

    /// Get words per line.
    #[inline]
    pub fn wpl(&self) -> u32 {
        self.inner.wpl
    }

    /// Mark whether 32 bpp pixels carry alpha.
    pub fn set_has_alpha(&mut self, has_alpha: bool) {
        self.inner.has_alpha = has_alpha;
    }

    /// Set both resolutions in dots per inch.
    pub fn set_resolution(&mut self, xres: u32, yres: u32) {
        self.inner.xres = xres;
        self.inner.yres = yres;
    }

    /// Set the resolution from a [`Dpi`].
    pub fn set_dpi(&mut self, dpi: Dpi) {
        self.set_resolution(dpi.horizontal, dpi.vertical);
    }

    /// Copy the resolution of another PIX.
    pub fn copy_resolution_from(&mut self, src: &Pix) {
        self.inner.xres = src.xres();
        self.inner.yres = src.yres();
    }

    /// Get raw access to the image data.
    #[inline]
    pub fn data(&self) -> &[u32] {
        &self.inner.data
    }

    /// Get mutable access to the image data.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u32] {
        &mut self.inner.data
    }

    /// Get the words of one row.
    #[inline]
    pub fn row_data(&self, y: u32) -> &[u32] {
        let start = (y * self.inner.wpl) as usize;
        &self.inner.data[start..start + self.inner.wpl as usize]
    }

    /// Get mutable access to a specific row.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row_data_mut(&mut self, y: u32) -> &mut [u32] {
        let start = (y * self.inner.wpl) as usize;
        let end = start + self.inner.wpl as usize;
        &mut self.inner.data[start..end]
    }

    /// Set every pixel to `val` (depth-dependent meaning).
    pub fn fill(&mut self, val: u32) {
        let word = replicate(self.inner.depth, val);
        self.inner.data.iter_mut().for_each(|w| *w = word);
    }

    /// Set every pixel to white.
    pub fn fill_white(&mut self) {
        self.fill(self.inner.depth.white());
    }

    /// Set every pixel to black.
    pub fn fill_black(&mut self) {
        self.fill(self.inner.depth.black());
    }
}

impl From<PixMut> for Pix {
    fn from(pix_mut: PixMut) -> Self {
        Pix {
            inner: Arc::new(pix_mut.inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_zero_size() {
        assert!(Pix::new(0, 10, PixelDepth::Bit8).is_err());
        assert!(Pix::new(10, 0, PixelDepth::Bit1).is_err());
    }

    #[test]
    fn test_same_dimensions_ignores_depth() {
        let gray = Pix::new(40, 30, PixelDepth::Bit8).unwrap();
        let mask = Pix::new(40, 30, PixelDepth::Bit1).unwrap();
        let other = Pix::new(40, 31, PixelDepth::Bit1).unwrap();
        assert!(gray.same_dimensions(&mask));
        assert!(!gray.sizes_equal(&mask));
        assert!(!gray.same_dimensions(&other));
    }

    #[test]
    fn test_wpl() {
        assert_eq!(Pix::new(33, 1, PixelDepth::Bit1).unwrap().wpl(), 2);
        assert_eq!(Pix::new(5, 1, PixelDepth::Bit8).unwrap().wpl(), 2);
        assert_eq!(Pix::new(5, 1, PixelDepth::Bit32).unwrap().wpl(), 5);
    }

    #[test]
    fn test_new_white_and_black() {
        let size = Size::new(7, 3);
        let w = Pix::new_white(size, PixelDepth::Bit8).unwrap();
        assert_eq!(w.get_pixel(6, 2), Some(255));
        let b = Pix::new_black(size, PixelDepth::Bit1).unwrap();
        assert_eq!(b.count_black().unwrap(), 21);
        let rgb = Pix::new_white(size, PixelDepth::Bit32).unwrap();
        assert_eq!(rgb.get_pixel(0, 0), Some(0xffff_ffff));
    }

    #[test]
    fn test_try_into_mut_shared() {
        let pix = Pix::new(4, 4, PixelDepth::Bit8).unwrap();
        let other = pix.clone();
        assert!(pix.try_into_mut().is_err());
        drop(other);
    }

    #[test]
    fn test_count_black_ignores_padding() {
        let mut pm = Pix::new(35, 2, PixelDepth::Bit1).unwrap().to_mut();
        pm.data_mut().iter_mut().for_each(|w| *w = u32::MAX);
        let pix: Pix = pm.into();
        assert_eq!(pix.count_black().unwrap(), 70);
    }
}
