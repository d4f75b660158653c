//! levelset-io - Field I/O for the levelset segmentation engine
//!
//! Reads and writes [`Field`]s in a handful of formats:
//!
//! - **PNG** (8/16-bit grayscale, 2D)
//! - **PGM** (binary `P5`, 2D)
//! - **TIFF** (32-bit float grayscale, 2D)
//! - **Native** `.lsf` (any dimension, keeps spacing)
//!
//! Planar formats map a 2D field with dims `[width, height]` onto image
//! columns and rows. The integer formats quantize on write: values are
//! rounded, negatives clip to zero, and 16-bit samples are used when the
//! field exceeds 255.
//!
//! # Features
//!
//! - `png-format`, `pnm`, `tiff-format`: individual codecs (all default)
//! - `all-formats`: everything

mod error;
mod format;
#[cfg(feature = "png-format")]
mod png;
#[cfg(feature = "pnm")]
mod pnm;
mod show;
#[cfg(feature = "tiff-format")]
mod tiff;

pub use error::{IoError, IoResult};
pub use format::{FieldFormat, detect_format_from_bytes};
pub use show::{SHOW_COMMAND_VAR, show};

#[cfg(feature = "png-format")]
pub use crate::png::{read_png, write_png};
#[cfg(feature = "pnm")]
pub use crate::pnm::{read_pnm, write_pnm};
#[cfg(feature = "tiff-format")]
pub use crate::tiff::{read_tiff, write_tiff};

use levelset_core::Field;
use std::fs::File;
use std::io::{BufWriter, Cursor, Write};
use std::path::Path;

/// Read a field from a file, detecting the format from its contents
pub fn load<P: AsRef<Path>>(path: P) -> IoResult<Field> {
    let data = std::fs::read(path.as_ref())?;
    let field = read_from_bytes(&data)?;
    log::debug!(
        "loaded {} with dims {:?}",
        path.as_ref().display(),
        field.dims()
    );
    Ok(field)
}

/// Decode a field from an in-memory file
pub fn read_from_bytes(data: &[u8]) -> IoResult<Field> {
    match detect_format_from_bytes(data)? {
        #[cfg(feature = "png-format")]
        FieldFormat::Png => read_png(Cursor::new(data)),
        #[cfg(feature = "pnm")]
        FieldFormat::Pnm => read_pnm(Cursor::new(data)),
        #[cfg(feature = "tiff-format")]
        FieldFormat::Tiff => read_tiff(Cursor::new(data)),
        FieldFormat::Native => Ok(Field::read_from_bytes(data)?),
        #[allow(unreachable_patterns)]
        other => Err(IoError::UnsupportedFormat(format!(
            "{:?} support not enabled",
            other
        ))),
    }
}

/// Write a field to a file, choosing the format from the extension
pub fn save<P: AsRef<Path>>(field: &Field, path: P) -> IoResult<()> {
    let format = FieldFormat::from_path(path.as_ref())?;
    let bytes = write_to_bytes(field, format)?;
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    writer.write_all(&bytes)?;
    writer.flush()?;
    log::debug!("saved {} as {:?}", path.as_ref().display(), format);
    Ok(())
}

/// Encode a field in the given format
pub fn write_to_bytes(field: &Field, format: FieldFormat) -> IoResult<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    match format {
        #[cfg(feature = "png-format")]
        FieldFormat::Png => write_png(field, &mut buffer)?,
        #[cfg(feature = "pnm")]
        FieldFormat::Pnm => write_pnm(field, &mut buffer)?,
        #[cfg(feature = "tiff-format")]
        FieldFormat::Tiff => write_tiff(field, &mut buffer)?,
        FieldFormat::Native => field.write_to_writer(&mut buffer)?,
        #[allow(unreachable_patterns)]
        other => {
            return Err(IoError::UnsupportedFormat(format!(
                "{:?} support not enabled",
                other
            )));
        }
    }
    Ok(buffer.into_inner())
}

/// Linearly rescale a field onto `[0, 255]` for viewing
///
/// The minimum maps to 0 and the maximum to 255. A constant field maps to
/// all zeros. Non-finite values are treated as 0.
pub fn rescale_for_display(field: &Field) -> Field {
    let finite = field.data().iter().copied().filter(|v| v.is_finite());
    let (lo, hi) = finite.fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    let range = hi - lo;
    if !(range > 0.0) {
        return field.map(|_| 0.0);
    }
    field.map(|v| {
        if v.is_finite() {
            ((v - lo) / range * 255.0).round()
        } else {
            0.0
        }
    })
}

/// Width and height of a field destined for a planar format
#[allow(dead_code)]
pub(crate) fn planar_dims(field: &Field) -> IoResult<(u32, u32)> {
    match field.dims() {
        &[w, h] => {
            let w = u32::try_from(w)
                .map_err(|_| IoError::InvalidData(format!("width {w} too large")))?;
            let h = u32::try_from(h)
                .map_err(|_| IoError::InvalidData(format!("height {h} too large")))?;
            Ok((w, h))
        }
        dims => Err(IoError::UnsupportedFormat(format!(
            "planar formats hold 2D fields only, got dims {:?}",
            dims
        ))),
    }
}

/// Integer samples for the PNG and PGM writers
#[allow(dead_code)]
pub(crate) struct Quantized {
    pub samples: Vec<u16>,
    pub sixteen_bit: bool,
}

#[allow(dead_code)]
pub(crate) fn quantize(field: &Field) -> Quantized {
    let samples: Vec<u16> = field
        .data()
        .iter()
        .map(|&v| {
            if v.is_finite() {
                v.round().clamp(0.0, 65535.0) as u16
            } else {
                0
            }
        })
        .collect();
    let sixteen_bit = samples.iter().any(|&s| s > 255);
    Quantized {
        samples,
        sixteen_bit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use levelset_core::Grid;

    #[test]
    fn test_rescale_for_display() {
        let grid = Grid::new(&[3, 1]).unwrap();
        let field = Field::from_data(grid, vec![-2.0, 0.0, 2.0]).unwrap();
        let shown = rescale_for_display(&field);
        assert_eq!(shown.data(), &[0.0, 128.0, 255.0]);
    }

    #[test]
    fn test_rescale_constant_field() {
        let field = Field::new_with_value(&[4, 4], 7.0).unwrap();
        let shown = rescale_for_display(&field);
        assert!(shown.data().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_quantize_clips() {
        let grid = Grid::new(&[4, 1]).unwrap();
        let field = Field::from_data(grid, vec![-3.0, 12.4, 12.6, f32::NAN]).unwrap();
        let q = quantize(&field);
        assert_eq!(q.samples, vec![0, 12, 13, 0]);
        assert!(!q.sixteen_bit);
    }
}
