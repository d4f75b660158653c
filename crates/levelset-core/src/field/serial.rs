//! Serialization for Field
//!
//! Mixed text header + binary data format.
//!
//! ```text
//! \nField Version 1\n
//! ndim = N\n
//! dims = D0 D1 ...\n
//! spacing = S0 S1 ...\n
//! nbytes = B\n
//! <raw f32 data, little-endian, B bytes>
//! \n
//! ```

use crate::error::{Error, Result};
use crate::field::Field;
use crate::grid::Grid;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Field format version
const FIELD_VERSION: i32 = 1;

/// Number of non-empty header lines preceding the binary block
const HEADER_LINES: usize = 5;

/// Maximum node count for a serialized field (2^29)
const MAX_FIELD_NODES: u64 = 1 << 29;

/// Maximum input size in bytes.
const MAX_INPUT_SIZE: u64 = 2_200_000_000;

impl Field {
    /// Read a Field from a reader.
    pub fn read_from_reader(reader: &mut impl Read) -> Result<Self> {
        let mut buf = Vec::new();
        reader.take(MAX_INPUT_SIZE + 1).read_to_end(&mut buf)?;
        if buf.len() as u64 > MAX_INPUT_SIZE {
            return Err(Error::DecodeError(format!(
                "input too large: exceeds maximum allowed size of {MAX_INPUT_SIZE} bytes"
            )));
        }
        Self::read_from_bytes(&buf)
    }

    /// Read a Field from a file.
    pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::read_from_reader(&mut BufReader::new(file))
    }

    /// Read a Field from a byte slice.
    pub fn read_from_bytes(data: &[u8]) -> Result<Self> {
        let header = parse_header(data)?;

        let nnodes = header
            .dims
            .iter()
            .try_fold(1u64, |n, &d| n.checked_mul(d as u64))
            .unwrap_or(u64::MAX);
        if nnodes > MAX_FIELD_NODES {
            return Err(Error::DecodeError(format!(
                "Field too large: {nnodes} nodes exceeds maximum {MAX_FIELD_NODES}"
            )));
        }
        let expected_nbytes = nnodes * 4;
        if header.nbytes != expected_nbytes {
            return Err(Error::DecodeError(format!(
                "Field nbytes mismatch: header says {} but nodes*4 = {expected_nbytes}",
                header.nbytes
            )));
        }

        let binary_end = header.end + header.nbytes as usize;
        if data.len() < binary_end {
            return Err(Error::DecodeError(format!(
                "Field data truncated: need {binary_end} bytes but only have {}",
                data.len()
            )));
        }
        let values: Vec<f32> = data[header.end..binary_end]
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();

        let grid = Grid::with_spacing(&header.dims, &header.spacing)
            .map_err(|e| Error::DecodeError(format!("invalid Field grid: {e}")))?;
        Field::from_data(grid, values)
    }

    /// Write a Field to a writer.
    pub fn write_to_writer(&self, writer: &mut impl Write) -> Result<()> {
        let nbytes = self.len() as u64 * 4;
        writeln!(writer, "\nField Version {FIELD_VERSION}")?;
        writeln!(writer, "ndim = {}", self.ndim())?;
        writeln!(writer, "dims = {}", join(self.dims()))?;
        writeln!(writer, "spacing = {}", join(self.spacing()))?;
        writeln!(writer, "nbytes = {nbytes}")?;

        for &val in self.data() {
            writer.write_all(&val.to_le_bytes())?;
        }

        writeln!(writer)?;
        Ok(())
    }

    /// Write a Field to a file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        self.write_to_writer(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Write a Field to a byte vector.
    pub fn write_to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_to_writer(&mut buf)?;
        Ok(buf)
    }
}

/// Check whether a byte buffer starts with a serialized Field header
pub fn is_field_data(data: &[u8]) -> bool {
    let start = data.iter().take_while(|&&b| b == b'\n').count();
    data[start..].starts_with(b"Field Version ")
}

// ============================================================================
// Internal helpers
// ============================================================================

struct Header {
    dims: Vec<usize>,
    spacing: Vec<f64>,
    nbytes: u64,
    end: usize,
}

fn join<T: std::fmt::Display>(values: &[T]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse the text header; binary data starts at `Header::end`.
fn parse_header(data: &[u8]) -> Result<Header> {
    let end = find_header_end_by_lines(data)?;
    let text = std::str::from_utf8(&data[..end])
        .map_err(|e| Error::DecodeError(format!("Field header is not valid UTF-8: {e}")))?;
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    if lines.len() < HEADER_LINES {
        return Err(Error::DecodeError(format!(
            "Field header has {} lines, expected {HEADER_LINES}",
            lines.len()
        )));
    }

    let version: i32 = lines[0]
        .strip_prefix("Field Version ")
        .ok_or_else(|| Error::DecodeError("Field version line not found".into()))?
        .trim()
        .parse()
        .map_err(|e| Error::DecodeError(format!("failed to parse Field version: {e}")))?;
    if version != FIELD_VERSION {
        return Err(Error::DecodeError(format!(
            "invalid Field version: {version}"
        )));
    }

    let ndim: usize = parse_scalar(lines[1], "ndim")?;
    let dims: Vec<usize> = parse_list(lines[2], "dims")?;
    let spacing: Vec<f64> = parse_list(lines[3], "spacing")?;
    let nbytes: u64 = parse_scalar(lines[4], "nbytes")?;

    if ndim == 0 || dims.len() != ndim || spacing.len() != ndim {
        return Err(Error::DecodeError(format!(
            "inconsistent Field header: ndim = {ndim}, dims = {dims:?}, spacing = {spacing:?}"
        )));
    }

    Ok(Header {
        dims,
        spacing,
        nbytes,
        end,
    })
}

/// Find the byte offset where binary data begins by counting header lines.
fn find_header_end_by_lines(data: &[u8]) -> Result<usize> {
    let scan_limit = data.len().min(1024);
    let mut content_lines_found = 0;
    let mut pos = 0;

    while pos < scan_limit {
        let Some(offset) = data[pos..scan_limit].iter().position(|&b| b == b'\n') else {
            break;
        };
        let line_end = pos + offset;
        if data[pos..line_end]
            .iter()
            .any(|b| !b.is_ascii_whitespace())
        {
            content_lines_found += 1;
            if content_lines_found == HEADER_LINES {
                return Ok(line_end + 1);
            }
        }
        pos = line_end + 1;
    }
    Err(Error::DecodeError(format!(
        "could not find end of text header (expected {HEADER_LINES} header lines)"
    )))
}

fn value_of<'a>(line: &'a str, key: &str) -> Result<&'a str> {
    let (k, v) = line
        .split_once('=')
        .ok_or_else(|| Error::DecodeError(format!("missing '=' in {key} line")))?;
    if k.trim() != key {
        return Err(Error::DecodeError(format!(
            "expected {key} line, found '{line}'"
        )));
    }
    Ok(v.trim())
}

fn parse_scalar<T: std::str::FromStr>(line: &str, key: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value_of(line, key)?
        .parse()
        .map_err(|e| Error::DecodeError(format!("failed to parse {key}: {e}")))
}

fn parse_list<T: std::str::FromStr>(line: &str, key: &str) -> Result<Vec<T>>
where
    T::Err: std::fmt::Display,
{
    value_of(line, key)?
        .split_whitespace()
        .map(|s| {
            s.parse()
                .map_err(|e| Error::DecodeError(format!("failed to parse {key}: {e}")))
        })
        .collect()
}
