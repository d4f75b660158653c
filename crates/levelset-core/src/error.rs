//! Error types for levelset-core
//!
//! Provides a unified error type for all operations in the core crate.
//! Each variant captures enough context for diagnostics without exposing
//! internal implementation details.

use thiserror::Error;

/// Levelset core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid grid dimensions (empty shape or a zero extent)
    #[error("invalid grid dimensions: {dims:?}")]
    InvalidDimension { dims: Vec<usize> },

    /// Invalid grid spacing (non-positive or non-finite)
    #[error("invalid grid spacing: {spacing:?}")]
    InvalidSpacing { spacing: Vec<f64> },

    /// Index out of bounds
    #[error("index out of bounds: {index} >= {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Coordinate does not lie inside the grid
    #[error("coordinate {coord:?} outside grid {dims:?}")]
    CoordinateOutOfBounds { coord: Vec<usize>, dims: Vec<usize> },

    /// Two fields or grids differ in shape
    #[error("dimension mismatch: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// Invalid parameter value
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Field decode error
    #[error("decode error: {0}")]
    DecodeError(String),

    /// Field encode error
    #[error("encode error: {0}")]
    EncodeError(String),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;
