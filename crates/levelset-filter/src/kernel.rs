//! Convolution kernels
//!
//! Separable filters in this crate are built from one-dimensional kernels
//! applied along each grid axis in turn.

use crate::{FilterError, FilterResult};

/// Largest kernel half-width generated from a variance
const MAX_RADIUS: usize = 64;

/// A symmetric one-dimensional kernel
///
/// Holds `2 * radius + 1` taps, centered on index `radius`.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    radius: usize,
    data: Vec<f32>,
}

impl Kernel {
    /// Create a kernel from its taps
    ///
    /// # Errors
    ///
    /// Returns `FilterError::InvalidKernel` unless `data` has odd length.
    pub fn from_slice(data: &[f32]) -> FilterResult<Self> {
        if data.len() % 2 == 0 {
            return Err(FilterError::InvalidKernel(format!(
                "kernel length must be odd, got {}",
                data.len()
            )));
        }
        Ok(Kernel {
            radius: data.len() / 2,
            data: data.to_vec(),
        })
    }

    /// The identity kernel, `[1.0]`
    pub fn identity() -> Self {
        Kernel {
            radius: 0,
            data: vec![1.0],
        }
    }

    /// Normalized sampled Gaussian
    ///
    /// `variance` is in physical units and `spacing` is the node spacing
    /// along the axis the kernel will be applied to. The half-width covers
    /// three standard deviations. A zero variance gives the identity.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::InvalidParameters` for a negative or non-finite
    /// variance, or a non-positive spacing.
    pub fn gaussian(variance: f64, spacing: f64) -> FilterResult<Self> {
        if !(variance.is_finite() && variance >= 0.0) {
            return Err(FilterError::InvalidParameters(format!(
                "variance must be non-negative, got {variance}"
            )));
        }
        if !(spacing.is_finite() && spacing > 0.0) {
            return Err(FilterError::InvalidParameters(format!(
                "spacing must be positive, got {spacing}"
            )));
        }
        if variance == 0.0 {
            return Ok(Self::identity());
        }

        let sigma = variance.sqrt() / spacing;
        let radius = ((3.0 * sigma).ceil() as usize).clamp(1, MAX_RADIUS);
        let denom = 2.0 * sigma * sigma;
        let mut data: Vec<f32> = (0..=2 * radius)
            .map(|i| {
                let x = i as f64 - radius as f64;
                (-(x * x) / denom).exp() as f32
            })
            .collect();
        let sum: f32 = data.iter().sum();
        for v in &mut data {
            *v /= sum;
        }
        Ok(Kernel { radius, data })
    }

    /// Half-width of the kernel
    #[inline]
    pub fn radius(&self) -> usize {
        self.radius
    }

    /// Number of taps
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Kernels always hold at least one tap
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Kernel taps
    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Sum of all taps
    pub fn sum(&self) -> f32 {
        self.data.iter().sum()
    }
}
