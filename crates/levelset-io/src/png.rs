//! PNG format support
//!
//! Grayscale PNGs map to 2D fields with dims `[width, height]`. Color PNGs
//! are reduced to luminance (0.299 R + 0.587 G + 0.114 B) on read.

use crate::{IoError, IoResult, planar_dims, quantize};
use levelset_core::{Field, Grid};
use png::{BitDepth, ColorType, Decoder, Encoder};
use std::io::{BufRead, Seek, Write};

/// Read a PNG image as a 2D field
pub fn read_png<R: BufRead + Seek>(reader: R) -> IoResult<Field> {
    let decoder = Decoder::new(reader);
    let mut reader = decoder
        .read_info()
        .map_err(|e| IoError::DecodeError(format!("PNG decode error: {}", e)))?;

    let info = reader.info();
    let width = info.width as usize;
    let height = info.height as usize;
    let color_type = info.color_type;
    let bit_depth = info.bit_depth;

    let samples = match color_type {
        ColorType::Grayscale => 1,
        ColorType::GrayscaleAlpha => 2,
        ColorType::Rgb => 3,
        ColorType::Rgba => 4,
        ColorType::Indexed => {
            return Err(IoError::UnsupportedFormat(
                "indexed PNG is not a scalar field".to_string(),
            ));
        }
    };
    let bytes_per_sample = match bit_depth {
        BitDepth::Eight => 1,
        BitDepth::Sixteen => 2,
        _ => {
            return Err(IoError::UnsupportedFormat(format!(
                "unsupported PNG bit depth: {:?}",
                bit_depth
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
    let bytes_per_row = output_info.line_size;
    let data = &buf[..output_info.buffer_size()];

    let sample = |idx: usize| -> f32 {
        if bytes_per_sample == 2 {
            (((data[idx] as u32) << 8) | data[idx + 1] as u32) as f32
        } else {
            data[idx] as f32
        }
    };

    let mut values = Vec::with_capacity(width * height);
    for y in 0..height {
        let row_start = y * bytes_per_row;
        for x in 0..width {
            let idx = row_start + x * samples * bytes_per_sample;
            let val = if samples >= 3 {
                let r = sample(idx);
                let g = sample(idx + bytes_per_sample);
                let b = sample(idx + 2 * bytes_per_sample);
                0.299 * r + 0.587 * g + 0.114 * b
            } else {
                sample(idx)
            };
            values.push(val);
        }
    }

    let grid = Grid::new(&[width, height])?;
    Ok(Field::from_data(grid, values)?)
}

/// Write a 2D field as a grayscale PNG
///
/// Values are rounded and clamped; the output is 8-bit when every value
/// fits in `[0, 255]` and 16-bit otherwise. Negative values clip to zero.
pub fn write_png<W: Write>(field: &Field, writer: W) -> IoResult<()> {
    let (width, height) = planar_dims(field)?;
    let quantized = quantize(field);

    let mut encoder = Encoder::new(writer, width, height);
    encoder.set_color(ColorType::Grayscale);
    encoder.set_depth(if quantized.sixteen_bit {
        BitDepth::Sixteen
    } else {
        BitDepth::Eight
    });

    let mut writer = encoder
        .write_header()
        .map_err(|e| IoError::EncodeError(format!("PNG header error: {}", e)))?;

    let data: Vec<u8> = if quantized.sixteen_bit {
        quantized
            .samples
            .iter()
            .flat_map(|s| s.to_be_bytes())
            .collect()
    } else {
        quantized.samples.iter().map(|&s| s as u8).collect()
    };

    writer
        .write_image_data(&data)
        .map_err(|e| IoError::EncodeError(format!("PNG write error: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_png_roundtrip_8bit() {
        let grid = Grid::new(&[10, 7]).unwrap();
        let field = Field::from_fn(grid, |c| ((c[0] + c[1]) * 10) as f32);

        let mut buffer = Vec::new();
        write_png(&field, &mut buffer).unwrap();
        let restored = read_png(Cursor::new(buffer)).unwrap();

        assert_eq!(restored.dims(), &[10, 7]);
        assert_eq!(restored.data(), field.data());
    }

    #[test]
    fn test_png_roundtrip_16bit() {
        let grid = Grid::new(&[4, 4]).unwrap();
        let field = Field::from_fn(grid, |c| (c[0] * 1000 + c[1]) as f32);

        let mut buffer = Vec::new();
        write_png(&field, &mut buffer).unwrap();
        let restored = read_png(Cursor::new(buffer)).unwrap();

        assert_eq!(restored.get(&[3, 2]).unwrap(), 3002.0);
    }

    #[test]
    fn test_png_rejects_3d() {
        let field = Field::new(&[4, 4, 4]).unwrap();
        let mut buffer = Vec::new();
        assert!(write_png(&field, &mut buffer).is_err());
    }
}
