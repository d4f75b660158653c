//! Field - Dense floating-point scalar field
//!
//! `Field` is an N-dimensional array of `f32` values over a [`Grid`]. It is
//! used for feature images, speed images and the level-set function itself.
//!
//! See [`serial`] for serialization support.
//!
//! # Examples
//!
//! ```
//! use levelset_core::Field;
//!
//! // Create a 100x100 field
//! let mut field = Field::new(&[100, 100]).unwrap();
//!
//! // Set and get values
//! field.set(&[10, 20], 0.5).unwrap();
//! assert_eq!(field.get(&[10, 20]).unwrap(), 0.5);
//!
//! // Get statistics
//! let (max_val, max_offset) = field.max();
//! assert_eq!(max_val, 0.5);
//! assert_eq!(field.grid().coord(max_offset), vec![10, 20]);
//! ```

pub mod serial;

use crate::error::{Error, Result};
use crate::grid::Grid;

/// Floating-point scalar field
///
/// Data is stored in the grid's row-major order (axis 0 fastest) with no
/// padding; `data.len()` always equals `grid.len()`.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Shape and spacing
    grid: Grid,
    /// Node values
    data: Vec<f32>,
}

impl Field {
    /// Create a field with unit spacing and all values set to zero
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDimension` if `dims` is empty or has a zero extent.
    pub fn new(dims: &[usize]) -> Result<Self> {
        Ok(Self::from_grid(Grid::new(dims)?))
    }

    /// Create a field with unit spacing and every value set to `value`
    pub fn new_with_value(dims: &[usize], value: f32) -> Result<Self> {
        let grid = Grid::new(dims)?;
        let data = vec![value; grid.len()];
        Ok(Field { grid, data })
    }

    /// Create a zero-valued field over an existing grid
    pub fn from_grid(grid: Grid) -> Self {
        let data = vec![0.0f32; grid.len()];
        Field { grid, data }
    }

    /// Create a field from raw data in row-major order
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidParameter` if the data length doesn't match the grid.
    pub fn from_data(grid: Grid, data: Vec<f32>) -> Result<Self> {
        if data.len() != grid.len() {
            return Err(Error::InvalidParameter(format!(
                "data length {} doesn't match grid {:?} = {}",
                data.len(),
                grid.dims(),
                grid.len()
            )));
        }
        Ok(Field { grid, data })
    }

    /// Create a field by evaluating `f` at every node coordinate
    pub fn from_fn<F>(grid: Grid, mut f: F) -> Self
    where
        F: FnMut(&[usize]) -> f32,
    {
        let mut coord = vec![0usize; grid.ndim()];
        let mut data = Vec::with_capacity(grid.len());
        for offset in 0..grid.len() {
            grid.coord_into(offset, &mut coord);
            data.push(f(&coord));
        }
        Field { grid, data }
    }

    /// Same field with a different spacing
    pub fn with_spacing(mut self, spacing: &[f64]) -> Result<Self> {
        self.grid.set_spacing(spacing)?;
        Ok(self)
    }

    /// Create a zero-valued field with the same grid
    pub fn create_template(&self) -> Field {
        Field::from_grid(self.grid.clone())
    }

    /// The grid this field is sampled on
    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Number of nodes along each axis
    #[inline]
    pub fn dims(&self) -> &[usize] {
        self.grid.dims()
    }

    /// Spacing along each axis
    #[inline]
    pub fn spacing(&self) -> &[f64] {
        self.grid.spacing()
    }

    /// Number of axes
    #[inline]
    pub fn ndim(&self) -> usize {
        self.grid.ndim()
    }

    /// Total number of nodes
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false: a valid field holds at least one node
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the value at a coordinate
    ///
    /// # Errors
    ///
    /// Returns `Error::CoordinateOutOfBounds` if the coordinate is outside the grid.
    pub fn get(&self, coord: &[usize]) -> Result<f32> {
        let offset = self.checked_offset(coord)?;
        Ok(self.data[offset])
    }

    /// Set the value at a coordinate
    ///
    /// # Errors
    ///
    /// Returns `Error::CoordinateOutOfBounds` if the coordinate is outside the grid.
    pub fn set(&mut self, coord: &[usize], value: f32) -> Result<()> {
        let offset = self.checked_offset(coord)?;
        self.data[offset] = value;
        Ok(())
    }

    /// Get the value at a linear offset
    ///
    /// # Panics
    ///
    /// Panics if `offset >= len()`.
    #[inline]
    pub fn get_at(&self, offset: usize) -> f32 {
        self.data[offset]
    }

    /// Set the value at a linear offset
    ///
    /// # Panics
    ///
    /// Panics if `offset >= len()`.
    #[inline]
    pub fn set_at(&mut self, offset: usize, value: f32) {
        self.data[offset] = value;
    }

    /// Get raw access to the node data
    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Get mutable access to the node data
    #[inline]
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Consume the field and return its data
    pub fn into_data(self) -> Vec<f32> {
        self.data
    }

    /// Set all nodes to the specified value
    pub fn fill(&mut self, value: f32) {
        self.data.fill(value);
    }

    /// Apply `f` to every value, producing a new field on the same grid
    pub fn map<F>(&self, f: F) -> Field
    where
        F: Fn(f32) -> f32,
    {
        Field {
            grid: self.grid.clone(),
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    // ========================================================================
    // Arithmetic
    // ========================================================================

    /// Subtract other field from this one element-wise
    ///
    /// # Errors
    ///
    /// Returns `Error::DimensionMismatch` if the shapes differ.
    pub fn sub(&self, other: &Field) -> Result<Field> {
        self.check_same_shape(other)?;
        let data = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(&a, &b)| a - b)
            .collect();
        Ok(Field {
            grid: self.grid.clone(),
            data,
        })
    }

    /// Add a constant to all nodes (in-place)
    pub fn add_constant(&mut self, value: f32) {
        for v in &mut self.data {
            *v += value;
        }
    }

    /// Multiply all nodes by a constant (in-place)
    pub fn mul_constant(&mut self, value: f32) {
        for v in &mut self.data {
            *v *= value;
        }
    }

    // ========================================================================
    // Statistics
    // ========================================================================

    /// Minimum value and the offset of its first occurrence
    pub fn min(&self) -> (f32, usize) {
        let mut best = (self.data[0], 0);
        for (i, &v) in self.data.iter().enumerate().skip(1) {
            if v < best.0 {
                best = (v, i);
            }
        }
        best
    }

    /// Maximum value and the offset of its first occurrence
    pub fn max(&self) -> (f32, usize) {
        let mut best = (self.data[0], 0);
        for (i, &v) in self.data.iter().enumerate().skip(1) {
            if v > best.0 {
                best = (v, i);
            }
        }
        best
    }

    /// Number of nodes whose value is strictly below `threshold`
    pub fn count_below(&self, threshold: f32) -> usize {
        self.data.iter().filter(|&&v| v < threshold).count()
    }

    /// Check whether any value is NaN or infinite
    pub fn has_non_finite(&self) -> bool {
        self.data.iter().any(|v| !v.is_finite())
    }

    /// Fail with `DimensionMismatch` unless both fields share a shape
    pub fn check_same_shape(&self, other: &Field) -> Result<()> {
        self.grid.check_same_shape(&other.grid)
    }

    fn checked_offset(&self, coord: &[usize]) -> Result<usize> {
        self.grid
            .offset(coord)
            .ok_or_else(|| Error::CoordinateOutOfBounds {
                coord: coord.to_vec(),
                dims: self.grid.dims().to_vec(),
            })
    }
}
