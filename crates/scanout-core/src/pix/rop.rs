//! Raster operations (ROP)
//!
//! This module provides pixel-wise combination of images:
//!
//! - AND, OR, XOR, subtract on whole images or on rectangles
//! - Invert (NOT)
//! - Rectangle fill and crop

use super::access::{read, write};
use super::{Pix, PixMut, PixelDepth};
use crate::error::{Error, Result};
use crate::geom::Rect;

/// Raster operation type
///
/// Named raster operations for combining source and destination pixels.
/// For 1 bpp images these are the usual boolean operations on the black
/// bit; for deeper images they apply bitwise to the pixel values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RopOp {
    /// Copy source to destination
    Src,
    /// Source AND destination
    SrcAndDst,
    /// Source OR destination
    SrcOrDst,
    /// Source XOR destination
    SrcXorDst,
    /// Subtract: (NOT source) AND destination
    Subtract,
}

impl RopOp {
    #[inline]
    fn apply(self, s: u32, d: u32) -> u32 {
        match self {
            RopOp::Src => s,
            RopOp::SrcAndDst => s & d,
            RopOp::SrcOrDst => s | d,
            RopOp::SrcXorDst => s ^ d,
            RopOp::Subtract => !s & d,
        }
    }
}

fn check_same(a_w: u32, a_h: u32, a_d: PixelDepth, b: &Pix) -> Result<()> {
    if a_d != b.depth() {
        return Err(Error::IncompatibleDepths(a_d.bits(), b.depth().bits()));
    }
    if a_w != b.width() || a_h != b.height() {
        return Err(Error::IncompatibleSizes(a_w, a_h, b.width(), b.height()));
    }
    Ok(())
}

impl Pix {
    /// Combine two images of the same size and depth.
    ///
    /// `self` is the destination operand, `other` the source.
    pub fn rop(&self, other: &Pix, op: RopOp) -> Result<Pix> {
        let mut pm = self.to_mut();
        pm.rop_inplace(other, op)?;
        Ok(pm.into())
    }

    /// Bitwise AND of two images.
    pub fn and(&self, other: &Pix) -> Result<Pix> {
        self.rop(other, RopOp::SrcAndDst)
    }

    /// Bitwise OR of two images.
    pub fn or(&self, other: &Pix) -> Result<Pix> {
        self.rop(other, RopOp::SrcOrDst)
    }

    /// Inverted copy.
    pub fn invert(&self) -> Pix {
        let mut pm = self.to_mut();
        pm.invert_inplace();
        pm.into()
    }

    /// Extract a rectangle as a new image.
    ///
    /// The rectangle is clipped to the image first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if the clipped rectangle is empty.
    pub fn crop(&self, rect: Rect) -> Result<Pix> {
        let r = rect.intersected(&self.rect());
        if r.is_empty() {
            return Err(Error::InvalidDimension {
                width: rect.w.max(0) as u32,
                height: rect.h.max(0) as u32,
            });
        }
        let mut out = Pix::new(r.w as u32, r.h as u32, self.depth())?.into_mut();
        out.copy_resolution_from(self);
        out.set_has_alpha(self.has_alpha());
        out.rop_rect(out.rect(), self, r.x, r.y, RopOp::Src)?;
        Ok(out.into())
    }
}

impl PixMut {
    /// Combine with another image of the same size and depth, in place.
    pub fn rop_inplace(&mut self, other: &Pix, op: RopOp) -> Result<()> {
        check_same(self.width(), self.height(), self.depth(), other)?;
        for (d, &s) in self.data_mut().iter_mut().zip(other.data()) {
            *d = op.apply(s, *d);
        }
        Ok(())
    }

    /// AND with another image, in place.
    pub fn and_inplace(&mut self, other: &Pix) -> Result<()> {
        self.rop_inplace(other, RopOp::SrcAndDst)
    }

    /// OR with another image, in place.
    pub fn or_inplace(&mut self, other: &Pix) -> Result<()> {
        self.rop_inplace(other, RopOp::SrcOrDst)
    }

    /// Clear every pixel that is set in `other` (1 bpp subtract).
    pub fn subtract_inplace(&mut self, other: &Pix) -> Result<()> {
        self.rop_inplace(other, RopOp::Subtract)
    }

    /// Invert in place.
    ///
    /// 1 bpp swaps black and white, 8 bpp maps `v` to `255 - v`,
    /// 32 bpp inverts the color channels and keeps alpha.
    pub fn invert_inplace(&mut self) {
        let mask = match self.depth() {
            PixelDepth::Bit1 | PixelDepth::Bit8 => u32::MAX,
            PixelDepth::Bit32 => 0xffff_ff00,
        };
        self.data_mut().iter_mut().for_each(|w| *w ^= mask);
    }

    /// Apply `op` to `dst_rect` using source pixels starting at
    /// `(src_x, src_y)` in `src`.
    ///
    /// Both rectangles are clipped to their images; areas falling outside
    /// either image are left untouched.
    pub fn rop_rect(
        &mut self,
        dst_rect: Rect,
        src: &Pix,
        src_x: i32,
        src_y: i32,
        op: RopOp,
    ) -> Result<()> {
        let depth = self.depth();
        if depth != src.depth() {
            return Err(Error::IncompatibleDepths(depth.bits(), src.depth().bits()));
        }
        let ox = src_x - dst_rect.x;
        let oy = src_y - dst_rect.y;
        let r = dst_rect
            .intersected(&self.rect())
            .intersected(&src.rect().translated(-ox, -oy));
        if r.is_empty() {
            return Ok(());
        }
        for y in r.top()..r.bottom() {
            let sline = src.row_data((y + oy) as u32);
            let dline = self.row_data_mut(y as u32);
            for x in r.left()..r.right() {
                let s = read(sline, depth, (x + ox) as u32);
                let d = read(dline, depth, x as u32);
                write(dline, depth, x as u32, op.apply(s, d));
            }
        }
        Ok(())
    }

    /// Copy all of `src` with its top-left corner at `(x, y)`.
    pub fn draw_over(&mut self, src: &Pix, x: i32, y: i32) -> Result<()> {
        let dst = Rect::new(x, y, src.width() as i32, src.height() as i32);
        self.rop_rect(dst, src, 0, 0, RopOp::Src)
    }

    /// Set every pixel inside `rect` (clipped) to `val`.
    pub fn fill_rect(&mut self, rect: Rect, val: u32) {
        let r = rect.intersected(&self.rect());
        if r.is_empty() {
            return;
        }
        let depth = self.depth();
        for y in r.top()..r.bottom() {
            let line = self.row_data_mut(y as u32);
            for x in r.left()..r.right() {
                write(line, depth, x as u32, val);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binary_with(w: u32, h: u32, black: &[(u32, u32)]) -> Pix {
        let mut pm = Pix::new(w, h, PixelDepth::Bit1).unwrap().to_mut();
        for &(x, y) in black {
            pm.set_pixel(x, y, 1).unwrap();
        }
        pm.into()
    }

    #[test]
    fn test_and_or_subtract() {
        let a = binary_with(4, 1, &[(0, 0), (1, 0)]);
        let b = binary_with(4, 1, &[(1, 0), (2, 0)]);
        let and = a.and(&b).unwrap();
        assert_eq!(and.count_black().unwrap(), 1);
        let or = a.or(&b).unwrap();
        assert_eq!(or.count_black().unwrap(), 3);
        let sub = a.rop(&b, RopOp::Subtract).unwrap();
        assert_eq!(sub.get_pixel(0, 0), Some(1));
        assert_eq!(sub.get_pixel(1, 0), Some(0));
    }

    #[test]
    fn test_size_mismatch() {
        let a = Pix::new(4, 4, PixelDepth::Bit1).unwrap();
        let b = Pix::new(4, 5, PixelDepth::Bit1).unwrap();
        assert!(a.and(&b).is_err());
    }

    #[test]
    fn test_invert_rgb_keeps_alpha() {
        let pix = Pix::new_filled(2, 2, PixelDepth::Bit32, 0x1020_30ff).unwrap();
        assert_eq!(pix.invert().get_pixel(0, 0), Some(0xefdf_cfff));
    }

    #[test]
    fn test_rop_rect_clips() {
        let src = Pix::new_filled(4, 4, PixelDepth::Bit8, 9).unwrap();
        let mut dst = Pix::new(6, 6, PixelDepth::Bit8).unwrap().to_mut();
        dst.draw_over(&src, 4, 4).unwrap();
        let dst: Pix = dst.into();
        assert_eq!(dst.get_pixel(5, 5), Some(9));
        assert_eq!(dst.get_pixel(3, 5), Some(0));
    }

    #[test]
    fn test_crop() {
        let mut pm = Pix::new(5, 5, PixelDepth::Bit8).unwrap().to_mut();
        pm.set_pixel(3, 2, 200).unwrap();
        let pix: Pix = pm.into();
        let c = pix.crop(Rect::new(2, 1, 10, 10)).unwrap();
        assert_eq!((c.width(), c.height()), (3, 4));
        assert_eq!(c.get_pixel(1, 1), Some(200));
        assert!(pix.crop(Rect::new(7, 7, 2, 2)).is_err());
    }

    #[test]
    fn test_fill_rect() {
        let mut pm = Pix::new(40, 3, PixelDepth::Bit1).unwrap().to_mut();
        pm.fill_rect(Rect::new(30, 1, 20, 1), 1);
        let pix: Pix = pm.into();
        assert_eq!(pix.count_black().unwrap(), 10);
    }
}
