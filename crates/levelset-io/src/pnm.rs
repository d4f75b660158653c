//! PGM (binary, `P5`) format support
//!
//! Reads and writes 8-bit and 16-bit binary graymaps. ASCII PGM (`P2`)
//! and the color variants are not supported.

use crate::{IoError, IoResult, planar_dims, quantize};
use levelset_core::{Field, Grid};
use std::io::{BufRead, Write};

/// Read a binary PGM image as a 2D field
pub fn read_pnm<R: BufRead>(mut reader: R) -> IoResult<Field> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;

    let mut pos = 0;
    let magic = next_token(&data, &mut pos)?;
    if magic != "P5" {
        return Err(IoError::UnsupportedFormat(format!(
            "unsupported PNM type: {magic}"
        )));
    }
    let width = parse_header_value(&data, &mut pos, "width")?;
    let height = parse_header_value(&data, &mut pos, "height")?;
    let maxval = parse_header_value(&data, &mut pos, "maxval")?;
    if maxval == 0 || maxval > 65535 {
        return Err(IoError::InvalidData(format!("invalid maxval: {maxval}")));
    }
    // Exactly one whitespace byte separates the header from the raster
    pos += 1;

    let bytes_per_sample: usize = if maxval > 255 { 2 } else { 1 };
    let needed = width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(bytes_per_sample))
        .ok_or_else(|| {
            IoError::DecodeError(format!("PGM size {width} x {height} overflows"))
        })?;
    let end = pos
        .checked_add(needed)
        .ok_or_else(|| IoError::DecodeError(format!("PGM raster of {needed} bytes overflows")))?;
    if data.len() < end {
        return Err(IoError::DecodeError(format!(
            "PGM raster truncated: need {needed} bytes, have {}",
            data.len().saturating_sub(pos)
        )));
    }

    let raster = &data[pos..end];
    let values: Vec<f32> = if bytes_per_sample == 2 {
        raster
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]) as f32)
            .collect()
    } else {
        raster.iter().map(|&b| b as f32).collect()
    };

    let grid = Grid::new(&[width, height])?;
    Ok(Field::from_data(grid, values)?)
}

/// Write a 2D field as a binary PGM
pub fn write_pnm<W: Write>(field: &Field, mut writer: W) -> IoResult<()> {
    let (width, height) = planar_dims(field)?;
    let quantized = quantize(field);
    let maxval = if quantized.sixteen_bit { 65535 } else { 255 };

    write!(writer, "P5\n{} {}\n{}\n", width, height, maxval)?;
    if quantized.sixteen_bit {
        for s in &quantized.samples {
            writer.write_all(&s.to_be_bytes())?;
        }
    } else {
        let bytes: Vec<u8> = quantized.samples.iter().map(|&s| s as u8).collect();
        writer.write_all(&bytes)?;
    }
    writer.flush()?;
    Ok(())
}

/// Next whitespace-delimited header token, skipping `#` comments
fn next_token<'a>(data: &'a [u8], pos: &mut usize) -> IoResult<&'a str> {
    loop {
        while *pos < data.len() && data[*pos].is_ascii_whitespace() {
            *pos += 1;
        }
        if *pos < data.len() && data[*pos] == b'#' {
            while *pos < data.len() && data[*pos] != b'\n' {
                *pos += 1;
            }
            continue;
        }
        break;
    }
    let start = *pos;
    while *pos < data.len() && !data[*pos].is_ascii_whitespace() {
        *pos += 1;
    }
    if start == *pos {
        return Err(IoError::DecodeError("unexpected end of PGM header".into()));
    }
    std::str::from_utf8(&data[start..*pos])
        .map_err(|_| IoError::DecodeError("PGM header is not ASCII".into()))
}

fn parse_header_value(data: &[u8], pos: &mut usize, what: &str) -> IoResult<usize> {
    next_token(data, pos)?
        .parse()
        .map_err(|e| IoError::DecodeError(format!("invalid PGM {what}: {e}")))
}
