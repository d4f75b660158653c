//! Field format detection
//!
//! Detects file formats by examining magic numbers on read and by file
//! extension on write.

use crate::{IoError, IoResult};
use levelset_core::field::serial::is_field_data;
use std::path::Path;

/// Supported on-disk formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldFormat {
    /// 8/16-bit grayscale PNG (2D only)
    Png,
    /// Binary PGM, `P5` (2D only)
    Pnm,
    /// 32-bit float grayscale TIFF (2D only)
    Tiff,
    /// Native N-dimensional field format
    Native,
}

impl FieldFormat {
    /// Canonical file extension
    pub fn extension(&self) -> &'static str {
        match self {
            FieldFormat::Png => "png",
            FieldFormat::Pnm => "pgm",
            FieldFormat::Tiff => "tif",
            FieldFormat::Native => "lsf",
        }
    }

    /// Whether the format can only hold 2D data
    pub fn is_planar(&self) -> bool {
        !matches!(self, FieldFormat::Native)
    }

    /// Choose a format from a path's extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> IoResult<Self> {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "png" => Ok(FieldFormat::Png),
            "pgm" | "pnm" => Ok(FieldFormat::Pnm),
            "tif" | "tiff" => Ok(FieldFormat::Tiff),
            "lsf" | "field" => Ok(FieldFormat::Native),
            _ => Err(IoError::UnsupportedFormat(format!(
                "unknown extension '{}'",
                ext
            ))),
        }
    }
}

/// Magic numbers for format detection
mod magic {
    /// PNG: 89 50 4E 47 0D 0A 1A 0A
    pub const PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    /// TIFF little-endian: II 2A 00
    pub const TIFF_LE: &[u8] = &[0x49, 0x49, 0x2A, 0x00];

    /// TIFF big-endian: MM 00 2A
    pub const TIFF_BE: &[u8] = &[0x4D, 0x4D, 0x00, 0x2A];

    /// Binary PGM
    pub const PGM_BINARY: &[u8] = b"P5";
}

/// Detect the format of an in-memory file
pub fn detect_format_from_bytes(data: &[u8]) -> IoResult<FieldFormat> {
    if data.len() < 2 {
        return Err(IoError::InvalidData(
            "not enough data to detect format".to_string(),
        ));
    }

    if data.starts_with(magic::PNG) {
        return Ok(FieldFormat::Png);
    }
    if data.starts_with(magic::TIFF_LE) || data.starts_with(magic::TIFF_BE) {
        return Ok(FieldFormat::Tiff);
    }
    if data.starts_with(magic::PGM_BINARY) {
        return Ok(FieldFormat::Pnm);
    }
    if is_field_data(data) {
        return Ok(FieldFormat::Native);
    }

    Err(IoError::UnsupportedFormat(
        "unrecognized file signature".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        assert_eq!(FieldFormat::from_path("a/b.PNG").unwrap(), FieldFormat::Png);
        assert_eq!(FieldFormat::from_path("x.tiff").unwrap(), FieldFormat::Tiff);
        assert_eq!(FieldFormat::from_path("x.lsf").unwrap(), FieldFormat::Native);
        assert!(FieldFormat::from_path("x.bmp").is_err());
        assert!(FieldFormat::from_path("noext").is_err());
    }

    #[test]
    fn test_detect_magic() {
        let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];
        assert_eq!(detect_format_from_bytes(&png).unwrap(), FieldFormat::Png);
        assert_eq!(
            detect_format_from_bytes(b"P5\n2 2\n255\n").unwrap(),
            FieldFormat::Pnm
        );
        assert_eq!(
            detect_format_from_bytes(b"\nField Version 1\n").unwrap(),
            FieldFormat::Native
        );
        assert!(detect_format_from_bytes(b"GIF89a").is_err());
    }
}
