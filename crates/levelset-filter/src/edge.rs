//! Canny edge detection on N-dimensional fields
//!
//! The detector smooths the field with a Gaussian, computes the gradient,
//! keeps only nodes whose gradient magnitude is a local maximum along the
//! gradient direction, and discards maxima weaker than a threshold.

use crate::convolve::gaussian_smooth;
use crate::gradient::gradient;
use crate::{FilterError, FilterResult};
use levelset_core::Field;

/// Options for [`canny_edges`]
#[derive(Debug, Clone, PartialEq)]
pub struct CannyOptions {
    /// Gaussian variance applied before differentiation (physical units)
    pub variance: f64,
    /// Minimum gradient magnitude of an edge
    pub threshold: f64,
}

impl Default for CannyOptions {
    fn default() -> Self {
        Self {
            variance: 0.0,
            threshold: 0.0,
        }
    }
}

impl CannyOptions {
    /// Create options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the smoothing variance
    pub fn with_variance(mut self, variance: f64) -> Self {
        self.variance = variance;
        self
    }

    /// Set the edge strength threshold
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }
}

/// Detect edges, returning 1.0 on edge nodes and 0.0 elsewhere
///
/// Flat regions never produce edges, even with a zero threshold.
///
/// # Errors
///
/// Returns `FilterError::InvalidParameters` for a negative variance or
/// threshold.
pub fn canny_edges(field: &Field, options: &CannyOptions) -> FilterResult<Field> {
    if !(options.threshold.is_finite() && options.threshold >= 0.0) {
        return Err(FilterError::InvalidParameters(format!(
            "canny threshold must be non-negative, got {}",
            options.threshold
        )));
    }

    let smoothed = gaussian_smooth(field, options.variance)?;
    let grad = gradient(&smoothed);
    let grid = smoothed.grid();
    let ndim = grid.ndim();

    let magnitude: Vec<f32> = (0..smoothed.len()).map(|o| grad.norm_at(o)).collect();
    let threshold = options.threshold as f32;

    let mut edges = smoothed.create_template();
    let mut count = 0usize;
    for (offset, out) in edges.data_mut().iter_mut().enumerate() {
        let mag = magnitude[offset];
        if mag <= 0.0 || mag < threshold {
            continue;
        }

        // Step to the nearest lattice neighbor along the gradient direction
        let g = grad.get(offset);
        let mut forward = offset;
        let mut backward = offset;
        for axis in 0..ndim {
            let step = (g[axis] / mag).round() as isize;
            if step != 0 {
                forward = grid.neighbor(forward, axis, step);
                backward = grid.neighbor(backward, axis, -step);
            }
        }

        // Ties along a plateau go to the node on the low side
        if mag >= magnitude[forward] && mag > magnitude[backward] {
            *out = 1.0;
            count += 1;
        }
    }

    log::debug!("canny: {} edge nodes of {}", count, smoothed.len());
    Ok(edges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use levelset_core::Grid;

    #[test]
    fn test_flat_has_no_edges() {
        let field = Field::new_with_value(&[8, 8], 5.0).unwrap();
        let edges = canny_edges(&field, &CannyOptions::default()).unwrap();
        assert!(edges.data().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_step_edge_is_thin() {
        let grid = Grid::new(&[20, 6]).unwrap();
        let field = Field::from_fn(grid, |c| if c[0] < 10 { 0.0 } else { 100.0 });
        let opts = CannyOptions::new().with_variance(1.0).with_threshold(5.0);
        let edges = canny_edges(&field, &opts).unwrap();
        for y in 0..6 {
            let row: Vec<usize> = (0..20)
                .filter(|&x| edges.get(&[x, y]).unwrap() > 0.0)
                .collect();
            assert_eq!(row.len(), 1, "row {y}: {row:?}");
            assert!(row[0] == 9 || row[0] == 10);
        }
    }

    #[test]
    fn test_threshold_removes_weak_edges() {
        let grid = Grid::new(&[20, 4]).unwrap();
        let field = Field::from_fn(grid, |c| if c[0] < 10 { 0.0 } else { 2.0 });
        let opts = CannyOptions::new().with_variance(1.0).with_threshold(50.0);
        let edges = canny_edges(&field, &opts).unwrap();
        assert!(edges.data().iter().all(|&v| v == 0.0));
    }
}
