//! Error types for levelset-segment
//!
//! Divergence of a run is not an error: it is reported through
//! [`RunStatus::Diverged`](crate::RunStatus::Diverged) together with the
//! last good field.

use thiserror::Error;

/// Errors that can occur before or while setting up a segmentation run
#[derive(Debug, Error)]
pub enum SegmentError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] levelset_core::Error),

    /// Filter error from a preprocessing stage or feature model
    #[error("filter error: {0}")]
    Filter(#[from] levelset_filter::FilterError),

    /// Input fields differ in shape
    #[error("dimension mismatch: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        /// Shape of the initial level set
        expected: Vec<usize>,
        /// Shape of the offending input
        actual: Vec<usize>,
    },

    /// A parameter lies outside its valid domain
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type for segmentation operations
pub type SegmentResult<T> = Result<T, SegmentError>;
