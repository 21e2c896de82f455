//! PNG image format support
//!
//! Binary images are written as 1-bit grayscale with black stored as 0,
//! gray images as 8-bit grayscale and 32 bpp images as RGB (or RGBA when
//! the alpha channel is meaningful). The resolution is carried in the
//! `pHYs` chunk as dots per metre.

use crate::{IoError, IoResult};
use png::{BitDepth, ColorType, Decoder, Encoder, PixelDimensions, Unit};
use scanout_core::{Dpi, Dpm, Pix, PixelDepth, color};
use std::io::{BufRead, Seek, Write};

/// Read a PNG image
///
/// Supported layouts: 1-bit and 8-bit grayscale, 8-bit RGB and RGBA.
pub fn read_png<R: BufRead + Seek>(reader: R) -> IoResult<Pix> {
    let decoder = Decoder::new(reader);
    let mut reader = decoder
        .read_info()
        .map_err(|e| IoError::DecodeError(format!("PNG decode error: {}", e)))?;

    let info = reader.info();
    let width = info.width;
    let height = info.height;
    let color_type = info.color_type;
    let bit_depth = info.bit_depth;
    let dpi = info.pixel_dims.and_then(|dims| match dims.unit {
        Unit::Meter => Some(
            Dpm {
                horizontal: dims.xppu,
                vertical: dims.yppu,
            }
            .to_dpi(),
        ),
        Unit::Unspecified => None,
    });

    let (pix_depth, samples) = match (color_type, bit_depth) {
        (ColorType::Grayscale, BitDepth::One) => (PixelDepth::Bit1, 0),
        (ColorType::Grayscale, BitDepth::Eight) => (PixelDepth::Bit8, 1),
        (ColorType::Rgb, BitDepth::Eight) => (PixelDepth::Bit32, 3),
        (ColorType::Rgba, BitDepth::Eight) => (PixelDepth::Bit32, 4),
        _ => {
            return Err(IoError::UnsupportedFormat(format!(
                "unsupported PNG format: {:?} {:?}",
                color_type, bit_depth
            )));
        }
    };

    let buf_size = reader
        .output_buffer_size()
        .ok_or_else(|| IoError::DecodeError("failed to get output buffer size".to_string()))?;
    let mut buf = vec![0; buf_size];
    let output_info = reader
        .next_frame(&mut buf)
        .map_err(|e| IoError::DecodeError(format!("PNG frame error: {}", e)))?;

    let mut pix_mut = Pix::new(width, height, pix_depth)?.into_mut();
    if let Some(dpi) = dpi {
        pix_mut.set_dpi(dpi);
    }
    if samples == 4 {
        pix_mut.set_has_alpha(true);
    }

    let bytes_per_row = output_info.line_size;
    let data = &buf[..output_info.buffer_size()];

    for y in 0..height {
        let row = &data[y as usize * bytes_per_row..];
        for x in 0..width {
            let val = match samples {
                0 => {
                    let bit = (row[(x / 8) as usize] >> (7 - (x % 8))) & 1;
                    u32::from(bit == 0)
                }
                1 => u32::from(row[x as usize]),
                3 => {
                    let i = x as usize * 3;
                    color::compose_rgb(row[i], row[i + 1], row[i + 2])
                }
                _ => {
                    let i = x as usize * 4;
                    color::compose_rgba(row[i], row[i + 1], row[i + 2], row[i + 3])
                }
            };
            pix_mut.set_pixel_unchecked(x, y, val);
        }
    }

    Ok(pix_mut.into())
}

/// Write a PNG image
pub fn write_png<W: Write>(pix: &Pix, writer: W) -> IoResult<()> {
    let width = pix.width();
    let height = pix.height();

    let (color_type, bit_depth) = match pix.depth() {
        PixelDepth::Bit1 => (ColorType::Grayscale, BitDepth::One),
        PixelDepth::Bit8 => (ColorType::Grayscale, BitDepth::Eight),
        PixelDepth::Bit32 => {
            if pix.has_alpha() {
                (ColorType::Rgba, BitDepth::Eight)
            } else {
                (ColorType::Rgb, BitDepth::Eight)
            }
        }
    };

    let mut encoder = Encoder::new(writer, width, height);
    encoder.set_color(color_type);
    encoder.set_depth(bit_depth);
    let dpi: Dpi = pix.dpi();
    if !dpi.is_null() {
        let dpm = dpi.to_dpm();
        encoder.set_pixel_dims(Some(PixelDimensions {
            xppu: dpm.horizontal,
            yppu: dpm.vertical,
            unit: Unit::Meter,
        }));
    }

    let mut writer = encoder
        .write_header()
        .map_err(|e| IoError::EncodeError(format!("PNG header error: {}", e)))?;

    let bytes_per_row = match color_type {
        ColorType::Grayscale if bit_depth == BitDepth::One => width.div_ceil(8),
        ColorType::Grayscale => width,
        ColorType::Rgb => width * 3,
        _ => width * 4,
    } as usize;

    let mut data = vec![0u8; bytes_per_row * height as usize];

    for y in 0..height {
        let row = &mut data[y as usize * bytes_per_row..(y as usize + 1) * bytes_per_row];
        match pix.depth() {
            PixelDepth::Bit1 => {
                for x in 0..width {
                    if pix.get_pixel_unchecked(x, y) == 0 {
                        row[(x / 8) as usize] |= 1 << (7 - (x % 8));
                    }
                }
            }
            PixelDepth::Bit8 => {
                for x in 0..width {
                    row[x as usize] = pix.get_pixel_unchecked(x, y) as u8;
                }
            }
            PixelDepth::Bit32 => {
                let samples = if pix.has_alpha() { 4 } else { 3 };
                for x in 0..width {
                    let pixel = pix.get_pixel_unchecked(x, y);
                    let i = x as usize * samples;
                    let (r, g, b) = color::extract_rgb(pixel);
                    row[i] = r;
                    row[i + 1] = g;
                    row[i + 2] = b;
                    if samples == 4 {
                        row[i + 3] = color::alpha(pixel);
                    }
                }
            }
        }
    }

    writer
        .write_image_data(&data)
        .map_err(|e| IoError::EncodeError(format!("PNG write error: {}", e)))?;

    Ok(())
}
