//! scanout Core - Basic data structures for page output generation
//!
//! This crate provides the fundamental types used throughout the scanout
//! workspace:
//!
//! - [`Pix`] / [`PixMut`] - The raster container (immutable / mutable),
//!   1, 8 and 32 bits per pixel
//! - [`Rect`] / [`RectF`] / [`Size`] / [`PointF`] - Geometry primitives
//! - [`Polygon`] - Closed polygons with winding-rule containment
//! - [`Transform`] - 2D affine transforms
//! - [`PolygonRasterizer`] - Fill inside or outside a polygon
//! - [`Dpi`] / [`Dpm`] - Resolution metadata

pub mod dpi;
pub mod error;
pub mod geom;
pub mod pix;

pub use dpi::{Dpi, Dpm};
pub use error::{Error, Result};
pub use geom::{PointF, Polygon, Rect, RectF, Size, Transform};
pub use pix::{BwColor, FillRule, Pix, PixMut, PixelDepth, PolygonRasterizer, RopOp};

/// Color channel helpers for 32-bit RGBA pixels.
///
/// # Pixel format
///
/// 32-bit pixels are stored as `0xRRGGBBAA` (red in MSB, alpha in LSB).
pub mod color {
    /// Shift amounts for extracting color channels
    pub const RED_SHIFT: u32 = 24;
    pub const GREEN_SHIFT: u32 = 16;
    pub const BLUE_SHIFT: u32 = 8;
    pub const ALPHA_SHIFT: u32 = 0;

    /// Opaque white
    pub const WHITE: u32 = 0xffff_ffff;
    /// Opaque black
    pub const BLACK: u32 = 0x0000_00ff;

    /// Extract red component from a 32-bit pixel.
    #[inline]
    pub fn red(pixel: u32) -> u8 {
        ((pixel >> RED_SHIFT) & 0xff) as u8
    }

    /// Extract green component from a 32-bit pixel.
    #[inline]
    pub fn green(pixel: u32) -> u8 {
        ((pixel >> GREEN_SHIFT) & 0xff) as u8
    }

    /// Extract blue component from a 32-bit pixel.
    #[inline]
    pub fn blue(pixel: u32) -> u8 {
        ((pixel >> BLUE_SHIFT) & 0xff) as u8
    }

    /// Extract alpha component from a 32-bit pixel.
    #[inline]
    pub fn alpha(pixel: u32) -> u8 {
        ((pixel >> ALPHA_SHIFT) & 0xff) as u8
    }

    /// Compose a 32-bit RGB pixel (alpha = 255).
    #[inline]
    pub fn compose_rgb(r: u8, g: u8, b: u8) -> u32 {
        ((r as u32) << RED_SHIFT)
            | ((g as u32) << GREEN_SHIFT)
            | ((b as u32) << BLUE_SHIFT)
            | (255 << ALPHA_SHIFT)
    }

    /// Compose a 32-bit RGBA pixel.
    #[inline]
    pub fn compose_rgba(r: u8, g: u8, b: u8, a: u8) -> u32 {
        ((r as u32) << RED_SHIFT)
            | ((g as u32) << GREEN_SHIFT)
            | ((b as u32) << BLUE_SHIFT)
            | ((a as u32) << ALPHA_SHIFT)
    }

    /// Extract RGB values from a 32-bit pixel.
    #[inline]
    pub fn extract_rgb(pixel: u32) -> (u8, u8, u8) {
        (red(pixel), green(pixel), blue(pixel))
    }

    /// Luminance as a weighted sum `(11 r + 16 g + 5 b) / 32`.
    #[inline]
    pub fn gray(pixel: u32) -> u8 {
        let (r, g, b) = extract_rgb(pixel);
        ((u32::from(r) * 11 + u32::from(g) * 16 + u32::from(b) * 5) / 32) as u8
    }

    /// Gray level replicated into an opaque RGB pixel.
    #[inline]
    pub fn from_gray(v: u8) -> u32 {
        compose_rgb(v, v, v)
    }

    /// True if all three color channels are equal.
    #[inline]
    pub fn is_gray(pixel: u32) -> bool {
        let (r, g, b) = extract_rgb(pixel);
        r == g && g == b
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_compose_extract() {
            let p = compose_rgb(1, 2, 3);
            assert_eq!(p, 0x0102_03ff);
            assert_eq!(extract_rgb(p), (1, 2, 3));
            assert_eq!(alpha(p), 255);
        }

        #[test]
        fn test_gray() {
            assert_eq!(gray(WHITE), 255);
            assert_eq!(gray(BLACK), 0);
            assert_eq!(gray(from_gray(77)), 77);
        }
    }
}
