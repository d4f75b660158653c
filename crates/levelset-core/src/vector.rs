//! VectorField - one vector per grid node
//!
//! Stores `ndim` interleaved `f32` components per node. The component order
//! matches the grid axes, so a 2D vector field stores `[vx, vy]` pairs.

use crate::error::{Error, Result};
use crate::grid::Grid;

/// Dense vector field over a grid
#[derive(Debug, Clone, PartialEq)]
pub struct VectorField {
    grid: Grid,
    data: Vec<f32>,
}

impl VectorField {
    /// Create a zero vector field over a grid
    pub fn new(grid: Grid) -> Self {
        let data = vec![0.0f32; grid.len() * grid.ndim()];
        VectorField { grid, data }
    }

    /// Create a vector field from interleaved component data
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidParameter` if `data.len() != grid.len() * grid.ndim()`.
    pub fn from_data(grid: Grid, data: Vec<f32>) -> Result<Self> {
        let expected = grid.len() * grid.ndim();
        if data.len() != expected {
            return Err(Error::InvalidParameter(format!(
                "vector data length {} doesn't match {} nodes x {} components",
                data.len(),
                grid.len(),
                grid.ndim()
            )));
        }
        Ok(VectorField { grid, data })
    }

    /// The grid this field is sampled on
    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Number of components per node
    #[inline]
    pub fn components(&self) -> usize {
        self.grid.ndim()
    }

    /// Vector at a linear offset
    #[inline]
    pub fn get(&self, offset: usize) -> &[f32] {
        let n = self.grid.ndim();
        &self.data[offset * n..(offset + 1) * n]
    }

    /// Overwrite the vector at a linear offset
    ///
    /// # Panics
    ///
    /// Panics if `value.len()` differs from the number of components.
    #[inline]
    pub fn set(&mut self, offset: usize, value: &[f32]) {
        let n = self.grid.ndim();
        self.data[offset * n..(offset + 1) * n].copy_from_slice(value);
    }

    /// Get raw access to the interleaved data
    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Multiply every component by a constant (in-place)
    pub fn scale(&mut self, factor: f32) {
        for v in &mut self.data {
            *v *= factor;
        }
    }

    /// Euclidean norm of the vector at a linear offset
    pub fn norm_at(&self, offset: usize) -> f32 {
        self.get(offset).iter().map(|c| c * c).sum::<f32>().sqrt()
    }
}
