//! Grid - N-dimensional sampling lattice
//!
//! A [`Grid`] describes the shape of a field: the number of nodes along each
//! axis and the physical distance between neighboring nodes (spacing).
//!
//! # Memory Layout
//!
//! Nodes are addressed by a linear offset in row-major order with axis 0
//! varying fastest. For a 2D grid with dims `[w, h]` the node at `(x, y)`
//! lives at offset `y * w + x`.

use crate::error::{Error, Result};

/// Shape and spacing of a regular N-dimensional grid
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    /// Number of nodes along each axis
    dims: Vec<usize>,
    /// Physical distance between neighboring nodes along each axis
    spacing: Vec<f64>,
    /// Linear offset step along each axis
    strides: Vec<usize>,
    /// Total number of nodes
    len: usize,
}

impl Grid {
    /// Create a grid with unit spacing
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDimension` if `dims` is empty or any extent is 0.
    pub fn new(dims: &[usize]) -> Result<Self> {
        Self::with_spacing(dims, &vec![1.0; dims.len()])
    }

    /// Create a grid with explicit per-axis spacing
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDimension` for an empty shape or a zero extent,
    /// `Error::InvalidSpacing` if the spacing has the wrong arity or holds a
    /// non-positive / non-finite value.
    pub fn with_spacing(dims: &[usize], spacing: &[f64]) -> Result<Self> {
        if dims.is_empty() || dims.contains(&0) {
            return Err(Error::InvalidDimension {
                dims: dims.to_vec(),
            });
        }
        if spacing.len() != dims.len() || spacing.iter().any(|&s| !(s.is_finite() && s > 0.0)) {
            return Err(Error::InvalidSpacing {
                spacing: spacing.to_vec(),
            });
        }

        let mut strides = Vec::with_capacity(dims.len());
        let mut len = 1usize;
        for &d in dims {
            strides.push(len);
            len = len.checked_mul(d).ok_or_else(|| Error::InvalidDimension {
                dims: dims.to_vec(),
            })?;
        }

        Ok(Grid {
            dims: dims.to_vec(),
            spacing: spacing.to_vec(),
            strides,
            len,
        })
    }

    /// Number of axes
    #[inline]
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    /// Number of nodes along each axis
    #[inline]
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Spacing along each axis
    #[inline]
    pub fn spacing(&self) -> &[f64] {
        &self.spacing
    }

    /// Offset step along each axis
    #[inline]
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Total number of nodes
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false: a valid grid holds at least one node
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Smallest spacing over all axes
    pub fn min_spacing(&self) -> f64 {
        self.spacing.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Physical volume (area in 2D) of one grid cell
    pub fn voxel_volume(&self) -> f64 {
        self.spacing.iter().product()
    }

    /// Replace the spacing, keeping the shape
    pub fn set_spacing(&mut self, spacing: &[f64]) -> Result<()> {
        let checked = Grid::with_spacing(&self.dims, spacing)?;
        self.spacing = checked.spacing;
        Ok(())
    }

    /// Linear offset of a coordinate, `None` if it lies outside the grid
    pub fn offset(&self, coord: &[usize]) -> Option<usize> {
        if coord.len() != self.dims.len() {
            return None;
        }
        let mut offset = 0;
        for ((&c, &d), &s) in coord.iter().zip(&self.dims).zip(&self.strides) {
            if c >= d {
                return None;
            }
            offset += c * s;
        }
        Some(offset)
    }

    /// Coordinate of a linear offset
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `offset >= len()`.
    pub fn coord(&self, offset: usize) -> Vec<usize> {
        let mut coord = vec![0; self.dims.len()];
        self.coord_into(offset, &mut coord);
        coord
    }

    /// Write the coordinate of a linear offset into `out`
    pub fn coord_into(&self, offset: usize, out: &mut [usize]) {
        debug_assert!(offset < self.len);
        let mut rest = offset;
        for (axis, &d) in self.dims.iter().enumerate() {
            out[axis] = rest % d;
            rest /= d;
        }
    }

    /// Coordinate of `offset` along a single axis
    #[inline]
    pub fn axis_index(&self, offset: usize, axis: usize) -> usize {
        (offset / self.strides[axis]) % self.dims[axis]
    }

    /// Offset of the neighbor `step` nodes away along `axis`
    ///
    /// Coordinates outside the grid are clamped to the border (replicate
    /// boundary), so a node on the edge is its own outer neighbor.
    #[inline]
    pub fn neighbor(&self, offset: usize, axis: usize, step: isize) -> usize {
        let i = self.axis_index(offset, axis) as isize;
        let j = (i + step).clamp(0, self.dims[axis] as isize - 1);
        (offset as isize + (j - i) * self.strides[axis] as isize) as usize
    }

    /// Offset of the neighbor along `axis`, or `None` past the border
    #[inline]
    pub fn neighbor_checked(&self, offset: usize, axis: usize, step: isize) -> Option<usize> {
        let i = self.axis_index(offset, axis) as isize;
        let j = i + step;
        if j < 0 || j >= self.dims[axis] as isize {
            return None;
        }
        Some((offset as isize + step * self.strides[axis] as isize) as usize)
    }

    /// Check whether two grids have the same number of nodes per axis
    pub fn same_shape(&self, other: &Grid) -> bool {
        self.dims == other.dims
    }

    /// Fail with `DimensionMismatch` unless both grids have the same shape
    pub fn check_same_shape(&self, other: &Grid) -> Result<()> {
        if !self.same_shape(other) {
            return Err(Error::DimensionMismatch {
                expected: self.dims.clone(),
                actual: other.dims.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strides_row_major() {
        let grid = Grid::new(&[4, 3, 2]).unwrap();
        assert_eq!(grid.strides(), &[1, 4, 12]);
        assert_eq!(grid.len(), 24);
        assert_eq!(grid.offset(&[1, 2, 1]), Some(1 + 8 + 12));
        assert_eq!(grid.coord(21), vec![1, 2, 1]);
    }

    #[test]
    fn test_invalid_dims() {
        assert!(Grid::new(&[]).is_err());
        assert!(Grid::new(&[3, 0]).is_err());
        assert!(Grid::with_spacing(&[3, 3], &[1.0]).is_err());
        assert!(Grid::with_spacing(&[3, 3], &[1.0, -2.0]).is_err());
        assert!(Grid::with_spacing(&[3, 3], &[1.0, f64::NAN]).is_err());
    }

    #[test]
    fn test_neighbor_replicates_border() {
        let grid = Grid::new(&[3, 3]).unwrap();
        // (0, 1) -> left neighbor is itself
        let off = grid.offset(&[0, 1]).unwrap();
        assert_eq!(grid.neighbor(off, 0, -1), off);
        assert_eq!(grid.neighbor(off, 0, 1), grid.offset(&[1, 1]).unwrap());
        assert_eq!(grid.neighbor(off, 1, 1), grid.offset(&[0, 2]).unwrap());
        assert_eq!(grid.neighbor_checked(off, 0, -1), None);
    }

    #[test]
    fn test_offset_out_of_bounds() {
        let grid = Grid::new(&[3, 3]).unwrap();
        assert_eq!(grid.offset(&[3, 0]), None);
        assert_eq!(grid.offset(&[0]), None);
    }

    #[test]
    fn test_check_same_shape() {
        let a = Grid::new(&[3, 4]).unwrap();
        let b = Grid::with_spacing(&[3, 4], &[0.5, 0.5]).unwrap();
        let c = Grid::new(&[4, 3]).unwrap();
        assert!(a.check_same_shape(&b).is_ok());
        assert!(matches!(
            a.check_same_shape(&c),
            Err(Error::DimensionMismatch { .. })
        ));
    }
}
