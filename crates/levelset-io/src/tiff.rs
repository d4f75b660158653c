//! TIFF format support
//!
//! Fields are written as single-page 32-bit float grayscale TIFFs, so level
//! sets and speed images survive a round trip without quantization. Reading
//! accepts 8/16-bit integer and 32/64-bit float grayscale pages.

use crate::{IoError, IoResult, planar_dims};
use levelset_core::{Field, Grid};
use std::io::{Read, Seek, Write};
use tiff::ColorType;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::TiffEncoder;
use tiff::encoder::colortype::Gray32Float;

/// Read the first page of a grayscale TIFF as a 2D field
pub fn read_tiff<R: Read + Seek>(reader: R) -> IoResult<Field> {
    let mut decoder = Decoder::new(reader)
        .map_err(|e| IoError::DecodeError(format!("TIFF decode error: {}", e)))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| IoError::DecodeError(format!("TIFF dimensions: {}", e)))?;

    let color_type = decoder
        .colortype()
        .map_err(|e| IoError::DecodeError(format!("TIFF colortype: {}", e)))?;
    if !matches!(color_type, ColorType::Gray(_)) {
        return Err(IoError::UnsupportedFormat(format!(
            "TIFF color type {:?} is not a scalar field",
            color_type
        )));
    }

    let image_data = decoder
        .read_image()
        .map_err(|e| IoError::DecodeError(format!("TIFF read error: {}", e)))?;

    let values: Vec<f32> = match image_data {
        DecodingResult::U8(data) => data.iter().map(|&v| v as f32).collect(),
        DecodingResult::U16(data) => data.iter().map(|&v| v as f32).collect(),
        DecodingResult::F32(data) => data,
        DecodingResult::F64(data) => data.iter().map(|&v| v as f32).collect(),
        _ => {
            return Err(IoError::UnsupportedFormat(
                "unsupported TIFF sample format".to_string(),
            ));
        }
    };

    let grid = Grid::new(&[width as usize, height as usize])?;
    Ok(Field::from_data(grid, values)?)
}

/// Write a 2D field as a 32-bit float grayscale TIFF
pub fn write_tiff<W: Write + Seek>(field: &Field, writer: W) -> IoResult<()> {
    let (width, height) = planar_dims(field)?;

    let mut encoder = TiffEncoder::new(writer)
        .map_err(|e| IoError::EncodeError(format!("TIFF encoder error: {}", e)))?;
    encoder
        .write_image::<Gray32Float>(width, height, field.data())
        .map_err(|e| IoError::EncodeError(format!("TIFF write error: {}", e)))?;

    Ok(())
}
